use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Attachment;

/// A request to be sent to the LLM engine.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineRequest {
    /// The input messages.
    pub messages: Vec<ModelMessage>,
    /// Tools that are available to the model.
    pub tools: Vec<ModelTool>,
    /// Sequences that stop generation.
    pub stop_sequences: Vec<String>,
    /// Whether the model must call a tool.
    pub tool_choice: ToolChoice,
    /// The response id of the previous turn, for stateful sessions where
    /// the provider keeps prior turns server-side.
    pub previous_response_id: Option<String>,
}

/// A message of the prompt.
#[derive(Clone, Debug, PartialEq)]
pub enum ModelMessage {
    /// The system instructions.
    System(String),
    /// A user turn.
    User {
        /// The text of the turn.
        content: String,
        /// Attachments sent as separate parts.
        attachments: Vec<Attachment>,
    },
    /// A tool call result.
    ToolResult(ToolCallResult),
    /// A provider-native fragment (e.g. the tool call or reasoning blocks
    /// returned by the model), forwarded verbatim.
    Native(Value),
}

impl ModelMessage {
    /// Creates a text-only user message.
    #[inline]
    pub fn user<S: Into<String>>(content: S) -> Self {
        ModelMessage::User {
            content: content.into(),
            attachments: vec![],
        }
    }
}

/// The result of calling a tool.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolCallResult {
    /// The unique identifier for the tool call request.
    pub call_id: String,
    /// The rendered result of the tool call.
    pub content: String,
    /// Attachments produced by the tool.
    pub attachments: Vec<Attachment>,
    /// Calls of the same turn that were not executed.
    pub skipped_call_ids: Vec<String>,
}

/// Describes a tool that can be used by the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelTool {
    /// Name of the tool.
    pub name: String,
    /// Description of the tool.
    pub description: String,
    /// Parameters definition of the tool.
    ///
    /// For most model providers, the parameters should typically be
    /// defined by a [JSON schema](https://json-schema.org/).
    pub parameters: Value,
}

/// How the model may choose tools.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    /// The model picks whether to call a tool.
    Auto,
    /// The model must call a tool.
    #[default]
    Required,
}
