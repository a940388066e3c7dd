//! Chat Messages
//!
//! The conversation data model and the messages the [`Chat`](crate::Chat)
//! controller sends to a rendering surface.
//!
//! # Design Philosophy
//!
//! The surface is a pure renderer. Everything it needs to draw the transcript,
//! the typing bubble and the status line arrives as a [`ChatMessage`]; it never
//! reads controller state behind the controller's back.

use serde::{Deserialize, Serialize};

/// Who authored a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The person typing questions
    User,
    /// The answer service
    Assistant,
}

impl Speaker {
    /// Wire name used in the `history` payload
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the transcript
///
/// Immutable once created: there are no mutating methods, and the
/// conversation store only ever hands out shared references.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Author of the message
    pub role: Speaker,
    /// Full text
    pub content: String,
}

impl Message {
    /// Create a message
    pub fn new(role: Speaker, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// A user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Speaker::User, content)
    }

    /// An assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Speaker::Assistant, content)
    }
}

/// Identifies one exchange (question + eventual answer)
///
/// Ids are monotonic per controller, so a background completion tagged with
/// an old id can be recognised and dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExchangeId(pub u64);

impl std::fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "exchange_{}", self.0)
    }
}

/// Session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a new unique session ID
    ///
    /// Uses an atomic counter combined with timestamp to ensure uniqueness
    /// even when multiple sessions are created in the same millisecond.
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        use std::time::{SystemTime, UNIX_EPOCH};

        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let count = COUNTER.fetch_add(1, Ordering::SeqCst);
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        Self(format!("session_{timestamp}_{count}"))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Operational state of the controller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatState {
    /// No exchange pending, input accepted
    Ready,
    /// Question sent, waiting for the answer service
    AwaitingAnswer,
    /// Answer received, reveal in progress
    Revealing,
    /// Torn down, no further work
    ShuttingDown,
}

impl ChatState {
    /// Human-readable description
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::AwaitingAnswer => "Waiting for answer...",
            Self::Revealing => "Typing...",
            Self::ShuttingDown => "Shutting down...",
        }
    }

    /// Whether an exchange is in flight
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::AwaitingAnswer | Self::Revealing)
    }
}

/// Messages from the controller to a rendering surface
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatMessage {
    // ============================================
    // Conversation
    // ============================================
    /// A message was committed to the conversation
    Appended {
        /// Position in the conversation
        index: usize,
        /// The committed message
        message: Message,
    },

    /// The transient partial answer grew by one character
    RevealProgress {
        /// Exchange being revealed
        exchange: ExchangeId,
        /// Everything revealed so far
        partial: String,
    },

    /// Typing indicator changed
    Typing {
        /// Whether the typing bubble should be shown
        active: bool,
    },

    // ============================================
    // System
    // ============================================
    /// An exchange failed; the error channel
    Error {
        /// Exchange that failed
        exchange: ExchangeId,
        /// What went wrong
        error: String,
    },

    /// Controller state change
    State {
        /// The new state
        state: ChatState,
    },

    /// A new, empty session started
    SessionReset {
        /// The new session
        session_id: SessionId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_speaker_wire_names() {
        assert_eq!(serde_json::to_string(&Speaker::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Speaker::Assistant).unwrap(),
            "\"assistant\""
        );
        assert_eq!(Speaker::Assistant.to_string(), "assistant");
    }

    #[test]
    fn test_message_serializes_as_history_entry() {
        let json = serde_json::to_value(Message::user("Who counters Yasuo?")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "role": "user", "content": "Who counters Yasuo?" })
        );
    }

    #[test]
    fn test_session_id_unique() {
        let id1 = SessionId::new();
        let id2 = SessionId::new();
        assert_ne!(id1, id2);
        assert!(id1.0.starts_with("session_"));
    }

    #[test]
    fn test_chat_state_description() {
        assert_eq!(ChatState::Ready.description(), "Ready");
        assert_eq!(ChatState::Revealing.description(), "Typing...");
        assert!(ChatState::AwaitingAnswer.is_busy());
        assert!(!ChatState::Ready.is_busy());
    }
}
