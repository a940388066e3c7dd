//! Error Types
//!
//! Submission rejections are local and leave no trace in the conversation.
//! Transport errors are recovered by the controller and reported on the error
//! channel. Nothing here is fatal to a session.

use thiserror::Error;

/// Why a submission was rejected by the input gate
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// Input is empty or only whitespace
    #[error("Nothing to send: input is empty")]
    EmptyInput,

    /// An exchange is already pending
    #[error("Still waiting on the previous answer")]
    ConcurrentSubmission,

    /// Input failed local validation
    #[error("Invalid message: {0}")]
    InvalidInput(String),

    /// The controller has been shut down
    #[error("Chat is shutting down")]
    Closed,
}

/// Failure talking to the answer service
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection or I/O failure
    #[error("Network error: {0}")]
    Network(String),

    /// No response within the configured timeout
    #[error("Answer service timed out after {0}s")]
    Timeout(u64),

    /// Service answered with a non-success status
    #[error("Answer service returned {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Service-provided error text, or the raw body
        message: String,
    },

    /// Response body was not `{ "answer": string }`
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl TransportError {
    /// Classify a reqwest error
    pub(crate) fn from_reqwest(error: &reqwest::Error, timeout_secs: u64) -> Self {
        if error.is_timeout() {
            Self::Timeout(timeout_secs)
        } else if error.is_decode() {
            Self::Malformed(error.to_string())
        } else {
            Self::Network(error.to_string())
        }
    }
}
