//! Error types shared by the toolkit crates.

use thiserror::Error;

/// Errors raised by the toolkit core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ToolkitError {
    /// Bundle information could not be fetched, or it carried no download URL.
    #[error("bundle metadata unavailable: {0}")]
    MetadataUnavailable(String),

    /// The download or its byte stream failed.
    #[error("transfer failed: {0}")]
    TransferFailed(String),

    /// The search index could not answer a query.
    #[error("index unavailable: {0}")]
    IndexUnavailable(String),

    /// An operation of the same kind is already in flight.
    #[error("an operation is already in progress")]
    Busy,

    /// Retry was requested but no failed request is on record.
    #[error("there is no failed download to retry")]
    NothingToRetry,

    /// The session task has shut down and no longer accepts commands.
    #[error("the toolkit session has closed")]
    SessionClosed,

    /// Local file I/O failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// Content or configuration could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
}

impl ToolkitError {
    /// Returns a user-friendly message suitable for an alert.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::MetadataUnavailable(_) | Self::TransferFailed(_) => {
                "We're having some trouble retrieving the app content. \
                 Please check your internet connection and try again."
            }
            Self::IndexUnavailable(_) => "Search is not available right now.",
            Self::Busy => "Content is already being downloaded.",
            Self::NothingToRetry => "There is nothing to retry.",
            Self::SessionClosed => "The toolkit view has closed.",
            Self::Io(_) | Self::Parse(_) => "An unexpected error occurred.",
        }
    }

    /// Returns whether a user-initiated retry could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::MetadataUnavailable(_)
                | Self::TransferFailed(_)
                | Self::IndexUnavailable(_)
                | Self::Io(_)
        )
    }
}

impl From<std::io::Error> for ToolkitError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ToolkitError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Result type alias for toolkit operations.
pub type Result<T> = std::result::Result<T, ToolkitError>;
