//! Error types for the completion node.
//!
//! Every failure a backend call or request cycle can produce is a
//! [`CompletionError`] variant, so callers branch on the error kind instead
//! of matching message strings. [`CompletionError::status_code`] gives the
//! HTTP status the serving layer reports for the variant.

use thiserror::Error;

/// Unified error type for backend calls, configuration, and request handling.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Missing or invalid configuration: absent credential, out-of-range
    /// sampling parameter, or a model identifier the aggregator cannot route.
    /// Fatal at startup, never produced per request.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The backend could not be reached: connection refused, DNS failure, or
    /// the bounded client-side timeout elapsed.
    #[error("backend unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    /// The backend answered with an error status or error envelope other
    /// than a billing rejection.
    #[error("backend error {status}: {message}")]
    Api { status: u16, message: String },

    /// The backend responded but generation did not terminate normally
    /// (length limit, stop-sequence match, refusal, ...). Never returned as
    /// if it were a usable answer.
    #[error("Could not generate an answer. Stop reason {stop_reason}")]
    Incomplete { stop_reason: String },

    /// The aggregator rejected the call for billing reasons. Kept distinct
    /// so callers can tell billing failures from other faults.
    #[error("Insufficient credits")]
    InsufficientCredits,

    /// The backend body could not be decoded or was missing a required part.
    #[error("malformed backend response: {0}")]
    MalformedResponse(String),

    /// The caller's request was rejected before any backend call was made.
    #[error("invalid request: {0}")]
    InvalidInput(String),
}

impl CompletionError {
    /// HTTP status code the serving layer uses for this error.
    ///
    /// Backend envelope errors carry their own status; billing rejections
    /// map to 402 and caller mistakes to 400. Everything else is a generic
    /// 500 so no internal detail leaks beyond the message text.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Api { status, .. } => *status,
            Self::InsufficientCredits => 402,
            Self::InvalidInput(_) => 400,
            Self::Configuration(_)
            | Self::Unreachable(_)
            | Self::Incomplete { .. }
            | Self::MalformedResponse(_) => 500,
        }
    }

    /// Whether this error was produced without the backend ever completing
    /// a generation (as opposed to a completed-but-rejected one).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }
}
