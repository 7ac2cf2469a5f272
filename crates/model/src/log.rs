use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Attachment, ErrorKind, ModelMessage, ToolArguments};

/// The type tag of a log entry.
///
/// This is used to filter entries out of the history and to look up the
/// message template of an entry.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LogType {
    /// See [`LogKind::Task`].
    Task,
    /// See [`LogKind::SystemPrompt`].
    SystemPrompt,
    /// See [`LogKind::Rationale`].
    Rationale,
    /// See [`LogKind::Thought`].
    Thought,
    /// See [`LogKind::ToolCall`].
    ToolCall,
    /// See [`LogKind::Observation`].
    Observation,
    /// See [`LogKind::Error`].
    Error,
    /// See [`LogKind::LlmInput`].
    LlmInput,
    /// See [`LogKind::LlmOutputThoughtAction`].
    LlmOutput,
    /// See [`LogKind::FinalAnswer`].
    FinalAnswer,
}

/// An entry in the agent log.
#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    /// Seconds since the Unix epoch when the entry was created.
    pub timestamp: f64,
    /// The agent that produced this entry.
    pub agent_id: String,
    /// The payload.
    pub kind: LogKind,
}

impl LogEntry {
    /// Creates a new entry.
    #[inline]
    pub fn new<S: Into<String>>(
        timestamp: f64,
        agent_id: S,
        kind: LogKind,
    ) -> Self {
        Self {
            timestamp,
            agent_id: agent_id.into(),
            kind,
        }
    }

    /// Returns the type tag of this entry.
    #[inline]
    pub fn log_type(&self) -> LogType {
        self.kind.log_type()
    }
}

/// The payload of a log entry.
#[derive(Clone, Debug, PartialEq)]
pub enum LogKind {
    /// The task given to the agent.
    Task(TaskLog),
    /// The system prompt.
    SystemPrompt(String),
    /// The reasoning accompanying a tool call.
    Rationale(RationaleLog),
    /// A scratch copy of the reasoning, never sent back to the model.
    Thought(String),
    /// A tool call issued by the agent.
    ToolCall(ToolCallLog),
    /// The result of a tool call.
    Observation(ObservationLog),
    /// An error surfaced during the run.
    Error(ErrorLog),
    /// The prompt sent to the model.
    LlmInput(Vec<ModelMessage>),
    /// A human-readable trace of the model's thought and action.
    LlmOutputThoughtAction(LlmOutputLog),
    /// The final answer of the run.
    FinalAnswer(String),
}

impl LogKind {
    /// Returns the type tag of this payload.
    pub fn log_type(&self) -> LogType {
        match self {
            LogKind::Task(_) => LogType::Task,
            LogKind::SystemPrompt(_) => LogType::SystemPrompt,
            LogKind::Rationale(_) => LogType::Rationale,
            LogKind::Thought(_) => LogType::Thought,
            LogKind::ToolCall(_) => LogType::ToolCall,
            LogKind::Observation(_) => LogType::Observation,
            LogKind::Error(_) => LogType::Error,
            LogKind::LlmInput(_) => LogType::LlmInput,
            LogKind::LlmOutputThoughtAction(_) => LogType::LlmOutput,
            LogKind::FinalAnswer(_) => LogType::FinalAnswer,
        }
    }
}

/// Payload of [`LogKind::Task`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskLog {
    /// The task text.
    pub content: String,
    /// Attachments sent along with the task.
    pub attachments: Vec<Attachment>,
}

/// Payload of [`LogKind::Rationale`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RationaleLog {
    /// The reasoning text.
    pub content: String,
    /// Provider-native reasoning blocks.
    pub raw_reasoning: Vec<Value>,
}

/// Payload of [`LogKind::ToolCall`].
#[derive(Clone, Debug, PartialEq)]
pub struct ToolCallLog {
    /// Name of the called tool.
    pub tool_name: String,
    /// Arguments passed to the tool.
    pub arguments: ToolArguments,
    /// Identifier of the call.
    pub call_id: String,
    /// The provider-native tool call.
    pub raw_tool_call: Value,
}

/// Payload of [`LogKind::Observation`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObservationLog {
    /// The textual result.
    pub content: String,
    /// Attachments produced by the tool.
    pub attachments: Vec<Attachment>,
    /// Identifier of the call this observation answers.
    pub call_id: String,
    /// Calls proposed in the same turn that were not executed.
    pub skipped_call_ids: Vec<String>,
}

/// Payload of [`LogKind::Error`].
#[derive(Clone, Debug, PartialEq)]
pub struct ErrorLog {
    /// What went wrong.
    pub kind: ErrorKind,
    /// The error message.
    pub message: String,
}

impl ErrorLog {
    /// Creates a new error payload.
    #[inline]
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Renders this error with `message` in place of the logged one.
    pub fn content_with_message(&self, message: &str) -> String {
        format!(
            "Error: {}\nException: {}\nCategory: {}",
            self.kind.name(),
            message,
            self.kind.category()
        )
    }

    /// Renders this error the way it is presented to the model.
    #[inline]
    pub fn content(&self) -> String {
        self.content_with_message(&self.message)
    }
}

/// Token accounting reported by the engine.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct TokenUsage {
    /// Tokens in the prompt.
    pub prompt_tokens: u64,
    /// Tokens in the completion.
    pub completion_tokens: u64,
    /// Total tokens.
    pub total_tokens: u64,
    /// Tokens spent on reasoning, included in `completion_tokens`.
    pub reasoning_tokens: u64,
}

/// Payload of [`LogKind::LlmOutputThoughtAction`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LlmOutputLog {
    /// The `Thought: ... Action: ...` trace.
    pub content: String,
    /// Token usage of the call.
    pub usage: TokenUsage,
    /// Wall-clock duration of the model call, in seconds.
    pub completion_duration: f64,
}

/// A destination for log entries.
pub trait LogSink: Send {
    /// Appends an entry. Entries are never mutated or removed afterwards.
    fn append(&mut self, entry: LogEntry);
}

/// An append-only, in-memory agent log.
#[derive(Clone, Debug, Default)]
pub struct AgentLog {
    entries: Vec<LogEntry>,
}

impl AgentLog {
    /// Creates an empty log.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all entries in append order.
    #[inline]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been logged yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LogSink for AgentLog {
    #[inline]
    fn append(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_only() {
        let mut log = AgentLog::new();
        log.append(LogEntry::new(
            1.0,
            "agent",
            LogKind::SystemPrompt("Be nice.".to_owned()),
        ));
        log.append(LogEntry::new(
            2.0,
            "agent",
            LogKind::Error(ErrorLog::new(ErrorKind::Parsing, "bad output")),
        ));

        let types: Vec<_> = log.entries().iter().map(|e| e.log_type()).collect();
        assert_eq!(types, [LogType::SystemPrompt, LogType::Error]);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_error_content() {
        let error = ErrorLog::new(ErrorKind::UnavailableTool, "unknown tool");
        assert_eq!(
            error.content(),
            "Error: UnavailableToolError\nException: unknown tool\n\
             Category: agent"
        );
    }

    #[test]
    fn test_log_type_names() {
        let name = serde_json::to_value(LogType::LlmOutput).unwrap();
        assert_eq!(name, "llm_output");
        let parsed: LogType = serde_json::from_str(r#""tool_call""#).unwrap();
        assert_eq!(parsed, LogType::ToolCall);
    }
}
