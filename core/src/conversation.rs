//! Conversation Store
//!
//! The ordered log of exchanged messages for one session. It is both the
//! rendering source and the context sent with every new question.
//!
//! The store is append-only: there is no way to remove, replace or reorder an
//! entry. Starting over means starting a new session with a new store.

use std::ops::Deref;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::messages::{Message, SessionId};

/// Immutable snapshot of a conversation
///
/// Cheap to clone; later appends to the store never show up in a snapshot
/// taken before them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conversation(Arc<[Message]>);

impl Conversation {
    /// Messages in insertion order
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.0
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::from(Vec::new())
    }
}

impl Deref for Conversation {
    type Target = [Message];

    fn deref(&self) -> &[Message] {
        &self.0
    }
}

impl From<Vec<Message>> for Conversation {
    fn from(messages: Vec<Message>) -> Self {
        Self(messages.into())
    }
}

impl Serialize for Conversation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.messages().serialize(serializer)
    }
}

/// Append-only message log for a single session
#[derive(Debug)]
pub struct ConversationStore {
    /// Session this log belongs to
    id: SessionId,
    /// Committed messages
    messages: Vec<Message>,
    /// Total content bytes, for diagnostics
    content_bytes: usize,
}

impl ConversationStore {
    /// Create an empty store for a new session
    pub fn new() -> Self {
        Self::with_id(SessionId::new())
    }

    /// Create an empty store for a specific session
    pub fn with_id(id: SessionId) -> Self {
        Self {
            id,
            messages: Vec::new(),
            content_bytes: 0,
        }
    }

    /// Session identifier
    pub fn session_id(&self) -> &SessionId {
        &self.id
    }

    /// Commit a message; returns its index
    pub fn append(&mut self, message: Message) -> usize {
        self.content_bytes += message.content.len();
        self.messages.push(message);

        let index = self.messages.len() - 1;
        tracing::trace!(
            session = %self.id.0,
            index,
            bytes = self.content_bytes,
            "Appended conversation message"
        );
        index
    }

    /// Immutable copy of the conversation as it is now
    pub fn snapshot(&self) -> Conversation {
        Conversation::from(self.messages.clone())
    }

    /// Live view for rendering
    pub fn current(&self) -> &[Message] {
        &self.messages
    }

    /// Number of committed messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether nothing has been committed yet
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Most recent message
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Total content size in bytes
    pub fn content_bytes(&self) -> usize {
        self.content_bytes
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}
