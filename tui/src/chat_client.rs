//! Chat Client
//!
//! Thin wrapper around the `Chat` controller for TUI integration.
//! This client embeds the controller directly and provides a convenient
//! interface for sending input and receiving messages.
//!
//! # Architecture
//!
//! The TUI is a "thin client" - it doesn't contain any conversation logic.
//! The TUI's job is:
//! 1. Convert terminal events to controller calls
//! 2. Let the controller apply background events (`wait` / `poll`)
//! 3. Receive `ChatMessage`s
//! 4. Render display state based on messages

use tokio::sync::mpsc;

use lolgpt_core::{
    Accepted, AnswerBackend, Chat, ChatConfig, ChatMessage, ChatOptions, ChatState,
    HttpAnswerBackend, InputGate, SubmitError,
};

/// Client for communicating with the embedded controller
pub struct ChatClient<B: AnswerBackend = HttpAnswerBackend> {
    /// The embedded controller
    chat: Chat<B>,
    /// Receiver for messages from the controller
    rx: mpsc::UnboundedReceiver<ChatMessage>,
}

impl ChatClient<HttpAnswerBackend> {
    /// Create a client talking to the configured answer service
    pub fn from_config(config: &ChatConfig) -> Self {
        let backend = HttpAnswerBackend::from_config(config);
        Self::with_backend(backend, ChatOptions::from_config(config))
    }
}

impl<B: AnswerBackend + 'static> ChatClient<B> {
    /// Create a client around any backend
    pub fn with_backend(backend: B, options: ChatOptions) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let chat = Chat::new(backend, options, tx);
        Self { chat, rx }
    }

    /// Input buffer
    pub fn input(&self) -> &InputGate {
        self.chat.input()
    }

    /// Input buffer, for editing
    pub fn input_mut(&mut self) -> &mut InputGate {
        self.chat.input_mut()
    }

    /// Submit the input buffer
    pub fn submit_input(&mut self) -> Result<Accepted, SubmitError> {
        self.chat.submit_input()
    }

    /// Start a new session
    pub fn reset(&mut self) {
        self.chat.reset();
    }

    /// Tear down, cancelling any running reveal
    pub fn shutdown(&mut self) {
        self.chat.shutdown();
    }

    /// Wait for the next background event and apply it
    pub async fn wait(&mut self) {
        self.chat.wait().await;
    }

    /// Apply background events that are already in (non-blocking)
    pub fn poll(&mut self) -> bool {
        self.chat.poll()
    }

    /// Receive all pending messages from the controller (non-blocking)
    pub fn recv_all(&mut self) -> Vec<ChatMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Get the current controller state
    pub fn state(&self) -> ChatState {
        self.chat.state()
    }

    /// Name of the answer backend
    pub fn backend_name(&self) -> &str {
        self.chat.backend_name()
    }
}
