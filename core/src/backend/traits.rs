//! Answer Backend Traits
//!
//! One question in, one complete answer out. The service is opaque: no
//! streaming, no partial results, no cancellation. Whatever the transport,
//! a backend reports failures as [`TransportError`] so the controller can
//! recover from every one of them the same way.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::conversation::Conversation;
use crate::error::TransportError;

/// Payload of one question
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AskRequest {
    /// The question being asked
    pub question: String,
    /// Conversation at submission time, ending with the question itself
    pub history: Conversation,
}

impl AskRequest {
    /// Create a request
    pub fn new(question: impl Into<String>, history: Conversation) -> Self {
        Self {
            question: question.into(),
            history,
        }
    }
}

/// Successful response body
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AskResponse {
    /// Full answer text
    pub answer: String,
}

/// Answer backend trait
///
/// Implement this trait to put a different transport behind the controller.
#[async_trait]
pub trait AnswerBackend: Send + Sync {
    /// Get the backend name (e.g., "HTTP")
    fn name(&self) -> &str;

    /// Ask one question and wait for the complete answer
    ///
    /// Called exactly once per accepted submission; implementations must not
    /// retry on their own.
    async fn ask(&self, request: &AskRequest) -> Result<String, TransportError>;
}
