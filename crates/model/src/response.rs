use serde_json::Value;

use crate::TokenUsage;

/// A complete response from the LLM engine.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EngineResponse {
    /// The provider's identifier of this response, used as the
    /// `previous_response_id` of the next request in stateful sessions.
    pub id: Option<String>,
    /// The raw, dialect-specific output.
    ///
    /// The agent never inspects this value outside the parser of the
    /// matching dialect. `None` means the engine produced nothing at all.
    pub output: Option<Value>,
    /// Token accounting of this call.
    pub usage: TokenUsage,
}

impl EngineResponse {
    /// Creates a response that carries the given output.
    #[inline]
    pub fn with_output(output: Value) -> Self {
        Self {
            output: Some(output),
            ..Default::default()
        }
    }
}
