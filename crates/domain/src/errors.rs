//! Error types used throughout IndexPoll

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Boxed error produced by an underlying transport implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Application-level failure reported by the remote service.
///
/// Carries the HTTP status code and the raw response body text so tests can
/// assert on the exact rejection returned by the cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusError {
    pub status_code: u16,
    pub message: String,
}

impl StatusError {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self { status_code, message: message.into() }
    }
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status_code, self.message)
    }
}

impl std::error::Error for StatusError {}

/// Main error type for IndexPoll
///
/// Every variant is terminal: the executor only retries when a request
/// succeeded but its condition did not hold yet.
#[derive(Error, Debug)]
pub enum PollError {
    /// Buffering the outgoing request body failed.
    #[error("failed to buffer request body: {0}")]
    BodyCapture(#[source] std::io::Error),

    /// The underlying client failed before a response was received.
    #[error(transparent)]
    Transport(BoxError),

    /// The remote service rejected the request.
    #[error(transparent)]
    Status(#[from] StatusError),

    /// Reading the response body stream failed.
    #[error("failed to read response body: {0}")]
    ResponseBody(#[source] std::io::Error),

    /// The response body does not match the requested output shape.
    #[error(transparent)]
    Decode(#[from] serde_json::Error),

    /// The condition did not hold before the polling deadline.
    #[error("deadline exceeded after {attempts} attempts ({timeout:?})")]
    DeadlineExceeded { timeout: Duration, attempts: u32 },

    /// The caller's cancellation token fired.
    #[error("operation cancelled")]
    Cancelled,

    /// Invalid options or configuration, detected before anything is sent.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PollError {
    /// Wrap any transport-side error without altering it.
    pub fn transport<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Transport(error.into())
    }

    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, Self::DeadlineExceeded { .. })
    }

    /// Status code of an application error, if this is one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status(err) => Some(err.status_code),
            _ => None,
        }
    }

    /// Stable label suitable for structured logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::BodyCapture(_) => "body_capture",
            Self::Transport(_) => "transport",
            Self::Status(_) => "status",
            Self::ResponseBody(_) => "response_body",
            Self::Decode(_) => "decode",
            Self::DeadlineExceeded { .. } => "deadline_exceeded",
            Self::Cancelled => "cancelled",
            Self::Config(_) => "config",
        }
    }
}

/// Result type alias for IndexPoll operations
pub type Result<T> = std::result::Result<T, PollError>;
