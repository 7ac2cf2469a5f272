use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// The kind of error that an LLM engine reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EngineErrorKind {
    /// The content is moderated.
    Moderated,
    /// The model provider is rate limited.
    RateLimitExceeded,
    /// The prompt does not fit in the model's context window.
    PromptTooLong,
    /// Any other errors.
    Other,
}

/// The model output could not be turned into an action.
///
/// Parsers return this instead of a partial result. The step loop treats it
/// as recoverable: the message is fed back to the model on the next turn.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    message: String,
}

impl ParseError {
    /// Creates a new parse error with the given message.
    #[inline]
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The kind of an error recorded in the agent log.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed, absent or unexpected model output.
    Parsing,
    /// The model asked for a tool that is not registered.
    UnavailableTool,
    /// A tool raised while executing.
    Execution,
    /// A tool raised an error that it has already reported.
    Logged,
    /// The model kept returning unusable output.
    InvalidAction,
    /// The prompt exceeded the model's context window.
    PromptTooLong,
    /// The run hit its iteration limit.
    MaxIterations,
    /// The engine failed for any other reason.
    Engine,
}

impl ErrorKind {
    /// Returns the stable name shown to the model.
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Parsing => "ParsingError",
            ErrorKind::UnavailableTool => "UnavailableToolError",
            ErrorKind::Execution => "ExecutionError",
            ErrorKind::Logged => "LoggedError",
            ErrorKind::InvalidAction => "InvalidActionError",
            ErrorKind::PromptTooLong => "PromptTooLongError",
            ErrorKind::MaxIterations => "MaxIterationsError",
            ErrorKind::Engine => "EngineError",
        }
    }

    /// Returns the coarse category of this error.
    pub fn category(self) -> &'static str {
        match self {
            ErrorKind::Parsing
            | ErrorKind::UnavailableTool
            | ErrorKind::InvalidAction
            | ErrorKind::MaxIterations => "agent",
            ErrorKind::Execution | ErrorKind::Logged => "tool",
            ErrorKind::PromptTooLong | ErrorKind::Engine => "model",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
