use reagent_model::{CanonicalAction, ModelMessage, ParseError};
use reagent_openai_model::{chat, responses};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The wire format of the model output, chosen when the agent is built.
///
/// This is the only place where the two formats are told apart, the rest of
/// the agent works on [`CanonicalAction`]s and [`ModelMessage`]s.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum OutputDialect {
    /// A chat completion assistant message with `tool_calls`.
    #[default]
    Chat,
    /// The output blocks of a stateful responses session.
    Responses,
}

impl OutputDialect {
    /// Parses a raw model output.
    #[inline]
    pub fn parse(
        self,
        output: Option<&Value>,
    ) -> Result<CanonicalAction, ParseError> {
        match self {
            OutputDialect::Chat => chat::parse_output(output),
            OutputDialect::Responses => responses::parse_output(output),
        }
    }

    /// Returns `true` if the output carries nothing actionable and the
    /// call should be retried.
    #[inline]
    pub fn is_empty_output(self, output: &Value) -> bool {
        match self {
            OutputDialect::Chat => chat::is_empty_output(output),
            OutputDialect::Responses => responses::is_empty_output(output),
        }
    }

    /// Renders prompt messages into the input list of a request.
    ///
    /// Engines call this to put [`reagent_model::EngineRequest::messages`]
    /// on the wire.
    #[inline]
    pub fn render_input(self, messages: &[ModelMessage]) -> Vec<Value> {
        match self {
            OutputDialect::Chat => chat::render_input(messages),
            OutputDialect::Responses => responses::render_input(messages),
        }
    }
}
