use std::fmt::{self, Display};

/// How a tool call failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The arguments could not be turned into the tool's input.
    InvalidInput,
    /// The tool ran and failed.
    ExecutionError,
    /// The tool has already reported this error on its own, so it must
    /// reach the model unchanged.
    Logged,
}

impl ErrorKind {
    fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid tool input",
            ErrorKind::ExecutionError => "tool execution failed",
            ErrorKind::Logged => "tool reported an error",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error returned by a tool.
///
/// The reason is what the model eventually reads, so it should tell the
/// model how to call the tool correctly next time.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Error {
    kind: ErrorKind,
    reason: Option<String>,
}

impl Error {
    /// Creates an error of the given kind without a reason.
    #[inline]
    pub const fn new(kind: ErrorKind) -> Self {
        Self { kind, reason: None }
    }

    /// Shorthand for `Error::new(ErrorKind::InvalidInput)`.
    #[inline]
    pub const fn invalid_input() -> Self {
        Self::new(ErrorKind::InvalidInput)
    }

    /// Shorthand for `Error::new(ErrorKind::ExecutionError)`.
    #[inline]
    pub const fn execution_error() -> Self {
        Self::new(ErrorKind::ExecutionError)
    }

    /// Shorthand for `Error::new(ErrorKind::Logged)`.
    #[inline]
    pub const fn logged() -> Self {
        Self::new(ErrorKind::Logged)
    }

    /// Sets the reason of the error, replacing any previous one.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Returns the kind of the error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns `true` if the tool has already reported the error.
    #[inline]
    pub fn is_logged(&self) -> bool {
        self.kind == ErrorKind::Logged
    }

    /// Consumes the error and returns its reason, falling back to the
    /// description of its kind.
    pub fn into_reason(self) -> String {
        self.reason
            .unwrap_or_else(|| self.kind.as_str().to_owned())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "{}: {reason}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for Error {}
