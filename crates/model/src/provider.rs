use std::error::Error;

use crate::error::EngineErrorKind;
use crate::request::EngineRequest;
use crate::response::EngineResponse;

/// The error type for an LLM engine.
pub trait LlmEngineError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> EngineErrorKind;
}

/// A type that represents an LLM engine, which turns a prompt into a raw
/// model output.
///
/// Once the engine is created, it should behave like a stateless object.
/// It can still have internal state, but callers should not rely on it,
/// and the engine should be prepared for being dropped anytime. State that
/// spans calls, like the previous response id of a stateful session, is
/// passed in the request.
pub trait LlmEngine: Send + Sync {
    /// The error type that may be returned by the engine.
    type Error: LlmEngineError;

    /// Sends a request to the model and waits for the complete output.
    fn call(
        &self,
        req: &EngineRequest,
    ) -> impl Future<Output = Result<EngineResponse, Self::Error>> + Send + 'static;
}
