//! Input Gate
//!
//! Owns the editable input buffer and decides whether a submission may start
//! a new exchange. Every check here is local: a rejected submission never
//! touches the conversation, the network, or the buffer.

use crate::error::SubmitError;
use crate::messages::ExchangeId;

/// Default maximum size of a single question (100KB)
pub const DEFAULT_MAX_INPUT_BYTES: usize = 100 * 1024;

/// A submission that passed the gate
///
/// `history_len` is the size of the snapshot sent with the question,
/// including the question itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Accepted {
    /// Exchange started by this submission
    pub exchange: ExchangeId,
    /// Number of history entries sent with the question (including it)
    pub history_len: usize,
}

/// Validates and sequences user submissions
#[derive(Debug)]
pub struct InputGate {
    /// Text being edited
    buffer: String,
    /// Maximum accepted message size in bytes
    max_input_bytes: usize,
}

impl InputGate {
    /// Create a gate with the given size limit
    pub fn new(max_input_bytes: usize) -> Self {
        Self {
            buffer: String::new(),
            max_input_bytes,
        }
    }

    /// Current buffer contents
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Append a typed character
    pub fn insert(&mut self, c: char) {
        self.buffer.push(c);
    }

    /// Append pasted text
    pub fn insert_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    /// Delete the last character
    pub fn backspace(&mut self) -> Option<char> {
        self.buffer.pop()
    }

    /// Replace the buffer contents
    pub fn set(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
    }

    /// Empty the buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Check a submission without side effects
    ///
    /// `pending` is whether an exchange is already in flight. The in-flight
    /// check runs first so an overlapping submission is always reported as
    /// such, whatever its content.
    pub fn check(&self, raw: &str, pending: bool) -> Result<(), SubmitError> {
        if pending {
            return Err(SubmitError::ConcurrentSubmission);
        }

        if raw.trim().is_empty() {
            return Err(SubmitError::EmptyInput);
        }

        if raw.len() > self.max_input_bytes {
            return Err(SubmitError::InvalidInput(format!(
                "message too large: {} bytes (max: {})",
                raw.len(),
                self.max_input_bytes
            )));
        }

        // Control characters other than newline, tab and carriage return
        if raw
            .chars()
            .any(|c| c.is_control() && c != '\n' && c != '\t' && c != '\r')
        {
            return Err(SubmitError::InvalidInput(
                "message contains invalid control characters".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for InputGate {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_INPUT_BYTES)
    }
}
