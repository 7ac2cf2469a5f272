use reagent_model::{EngineErrorKind, ErrorKind, ParseError};

/// An error surfaced by a step of the agent.
///
/// Apart from [`Error::InvalidAction`] and [`Error::Config`], every variant
/// is recoverable: the run loop records it in the log, so the model sees it
/// on the next turn.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The model output could not be turned into an action.
    #[error("{0}")]
    Parsing(#[from] ParseError),
    /// The model called a tool that is not registered.
    #[error("{0}")]
    UnavailableTool(String),
    /// The tool failed, the message describes the tool for the model.
    #[error("{0}")]
    Execution(String),
    /// The tool failed and has already reported the failure.
    #[error("{0}")]
    Logged(String),
    /// The model kept returning empty output.
    #[error("{0}")]
    InvalidAction(String),
    /// The engine failed.
    #[error("{message}")]
    Engine {
        /// What went wrong.
        kind: EngineErrorKind,
        /// The engine's error message.
        message: String,
    },
    /// The agent is misconfigured.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Returns the kind under which this error is recorded in the log.
    ///
    /// Configuration errors are never recorded.
    pub fn kind(&self) -> Option<ErrorKind> {
        let kind = match self {
            Error::Parsing(_) => ErrorKind::Parsing,
            Error::UnavailableTool(_) => ErrorKind::UnavailableTool,
            Error::Execution(_) => ErrorKind::Execution,
            Error::Logged(_) => ErrorKind::Logged,
            Error::InvalidAction(_) => ErrorKind::InvalidAction,
            Error::Engine {
                kind: EngineErrorKind::PromptTooLong,
                ..
            } => ErrorKind::PromptTooLong,
            Error::Engine { .. } => ErrorKind::Engine,
            Error::Config(_) => return None,
        };
        Some(kind)
    }

    /// Returns `true` if the run can't continue after this error.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::InvalidAction(_) | Error::Config(_))
    }
}
