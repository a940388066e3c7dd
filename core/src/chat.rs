//! Chat Controller
//!
//! The `Chat` is the conversation state machine. It owns the input gate, the
//! conversation store, the request coordinator and the single pending
//! exchange, and reports every observable change to the surface as a
//! [`ChatMessage`].
//!
//! # Lifecycle of an exchange
//!
//! ```text
//! submit ──> user append ──> begin ──> Answered ──> reveal ──> RevealDone ──> assistant append
//!                                  └─> Failed ──> error channel
//! ```
//!
//! Background tasks only ever post [`ExchangeEvent`]s. The controller applies
//! them on its own thread in [`Chat::poll`] or [`Chat::wait`], dropping any
//! event whose exchange is no longer the pending one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::backend::{AnswerBackend, AskRequest};
use crate::config::ChatConfig;
use crate::conversation::{Conversation, ConversationStore};
use crate::coordinator::{ExchangeEvent, RequestCoordinator};
use crate::error::{SubmitError, TransportError};
use crate::input::{Accepted, InputGate, DEFAULT_MAX_INPUT_BYTES};
use crate::messages::{ChatMessage, ChatState, ExchangeId, Message, SessionId};
use crate::reveal::{CancelHandle, RevealScheduler, DEFAULT_REVEAL_INTERVAL};

/// Controller options
#[derive(Clone, Debug)]
pub struct ChatOptions {
    /// Delay between revealed characters
    pub reveal_interval: Duration,
    /// Maximum question size in bytes
    pub max_input_bytes: usize,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            reveal_interval: DEFAULT_REVEAL_INTERVAL,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }
}

impl ChatOptions {
    /// Take the controller options out of a loaded configuration
    #[must_use]
    pub fn from_config(config: &ChatConfig) -> Self {
        Self {
            reveal_interval: config.reveal_interval(),
            max_input_bytes: config.max_input_bytes,
        }
    }
}

/// The one exchange allowed in flight
#[derive(Debug)]
pub struct PendingExchange {
    id: ExchangeId,
    question: String,
    history: Conversation,
    answer: Option<String>,
    cursor: usize,
    reveal: Option<CancelHandle>,
}

impl PendingExchange {
    /// Exchange identifier
    pub fn id(&self) -> ExchangeId {
        self.id
    }

    /// The question as submitted
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Conversation sent with the question, ending with it
    pub fn history(&self) -> &Conversation {
        &self.history
    }

    /// Full answer, once the service has responded
    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    /// Characters revealed so far
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn cancel_reveal(&self) {
        if let Some(ref reveal) = self.reveal {
            if reveal.cancel() {
                tracing::debug!(exchange = %self.id, cursor = self.cursor, "Reveal cancelled");
            }
        }
    }
}

/// The conversation controller
pub struct Chat<B: AnswerBackend> {
    /// Input buffer and submission checks
    gate: InputGate,
    /// Committed conversation
    store: ConversationStore,
    /// Background call and reveal driver
    coordinator: RequestCoordinator<B>,
    /// At most one exchange in flight
    pending: Option<PendingExchange>,
    /// Next exchange identifier
    next_exchange: u64,
    /// Current operational state
    state: ChatState,
    /// Whether the typing bubble is shown
    typing: bool,
    /// Most recent transport failure
    last_error: Option<String>,
    /// Channel to the surface
    tx: mpsc::UnboundedSender<ChatMessage>,
    /// Events from background tasks
    events_rx: mpsc::UnboundedReceiver<ExchangeEvent>,
}

impl<B: AnswerBackend + 'static> Chat<B> {
    /// Create a controller with the given backend
    pub fn new(backend: B, options: ChatOptions, tx: mpsc::UnboundedSender<ChatMessage>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let coordinator = RequestCoordinator::new(
            Arc::new(backend),
            RevealScheduler::new(options.reveal_interval),
            events_tx,
        );

        Self {
            gate: InputGate::new(options.max_input_bytes),
            store: ConversationStore::new(),
            coordinator,
            pending: None,
            next_exchange: 1,
            state: ChatState::Ready,
            typing: false,
            last_error: None,
            tx,
            events_rx,
        }
    }

    // ============================================
    // Observable state
    // ============================================

    /// Get the session ID
    pub fn session_id(&self) -> &SessionId {
        self.store.session_id()
    }

    /// Get current state
    pub fn state(&self) -> ChatState {
        self.state
    }

    /// Whether an exchange is in flight
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The pending exchange, if any
    pub fn pending(&self) -> Option<&PendingExchange> {
        self.pending.as_ref()
    }

    /// Whether the typing bubble should be shown
    pub fn typing(&self) -> bool {
        self.typing
    }

    /// Committed conversation, for rendering
    pub fn conversation(&self) -> &[Message] {
        self.store.current()
    }

    /// Immutable copy of the committed conversation
    pub fn snapshot(&self) -> Conversation {
        self.store.snapshot()
    }

    /// Most recent transport failure, if any
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Input buffer
    pub fn input(&self) -> &InputGate {
        &self.gate
    }

    /// Input buffer, for editing
    pub fn input_mut(&mut self) -> &mut InputGate {
        &mut self.gate
    }

    /// Name of the answer backend
    pub fn backend_name(&self) -> &str {
        self.coordinator.backend_name()
    }

    /// Delay between revealed characters
    pub fn reveal_interval(&self) -> Duration {
        self.coordinator.scheduler().interval()
    }

    // ============================================
    // Submission
    // ============================================

    /// Submit the contents of the input buffer
    ///
    /// # Errors
    ///
    /// Same as [`Chat::submit`]; a rejected submission leaves the buffer as
    /// it was.
    pub fn submit_input(&mut self) -> Result<Accepted, SubmitError> {
        let raw = self.gate.buffer().to_string();
        let accepted = self.submit(&raw)?;
        self.gate.clear();
        Ok(accepted)
    }

    /// Submit a question
    ///
    /// On acceptance the question is committed to the conversation and sent
    /// with the conversation so far. The input buffer is left alone.
    ///
    /// # Errors
    ///
    /// Rejects without any observable side effect when the controller is
    /// shut down, an exchange is already pending, the text is empty or
    /// whitespace, or it fails local validation.
    pub fn submit(&mut self, raw: &str) -> Result<Accepted, SubmitError> {
        if self.state == ChatState::ShuttingDown {
            return Err(SubmitError::Closed);
        }

        if let Err(reason) = self.gate.check(raw, self.pending.is_some()) {
            tracing::debug!(reason = %reason, "Rejected submission");
            return Err(reason);
        }

        let exchange = ExchangeId(self.next_exchange);
        self.next_exchange += 1;

        let message = Message::user(raw);
        let index = self.store.append(message.clone());
        self.send(ChatMessage::Appended { index, message });

        let history = self.store.snapshot();
        let history_len = history.len();

        self.coordinator
            .begin(exchange, AskRequest::new(raw, history.clone()));

        self.pending = Some(PendingExchange {
            id: exchange,
            question: raw.to_string(),
            history,
            answer: None,
            cursor: 0,
            reveal: None,
        });
        self.last_error = None;
        self.set_typing(true);
        self.set_state(ChatState::AwaitingAnswer);

        tracing::info!(%exchange, history = history_len, "Submission accepted");

        Ok(Accepted {
            exchange,
            history_len,
        })
    }

    // ============================================
    // Background events
    // ============================================

    /// Apply every event already reported by background tasks
    ///
    /// Call this regularly. Returns true if there was activity.
    pub fn poll(&mut self) -> bool {
        let mut active = false;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            active = true;
        }
        active
    }

    /// Wait for the next background event and apply it
    ///
    /// Never completes while nothing is in flight. Cancel safe: dropping the
    /// future loses no event.
    pub async fn wait(&mut self) {
        if let Some(event) = self.events_rx.recv().await {
            self.handle_event(event);
        }
    }

    fn is_current(&self, exchange: ExchangeId) -> bool {
        self.pending.as_ref().is_some_and(|p| p.id == exchange)
    }

    fn handle_event(&mut self, event: ExchangeEvent) {
        let exchange = event.exchange();
        if !self.is_current(exchange) {
            tracing::debug!(%exchange, "Dropping stale exchange event");
            return;
        }

        match event {
            ExchangeEvent::Answered { answer, .. } => self.on_answered(exchange, answer),
            ExchangeEvent::Failed { error, .. } => self.on_failed(exchange, &error),
            ExchangeEvent::RevealTick { partial, .. } => self.on_reveal_tick(exchange, partial),
            ExchangeEvent::RevealDone { answer, .. } => self.on_reveal_done(exchange, answer),
        }
    }

    fn on_answered(&mut self, exchange: ExchangeId, answer: String) {
        let reveal = self.coordinator.start_reveal(exchange, answer.clone());
        if let Some(ref mut pending) = self.pending {
            pending.answer = Some(answer);
            pending.reveal = Some(reveal);
        }
        self.set_state(ChatState::Revealing);
    }

    fn on_failed(&mut self, exchange: ExchangeId, error: &TransportError) {
        // Clearing here is the only way out of a failed exchange
        self.pending = None;

        let text = error.to_string();
        self.last_error = Some(text.clone());
        self.send(ChatMessage::Error {
            exchange,
            error: text,
        });
        self.set_typing(false);
        self.set_state(ChatState::Ready);
    }

    fn on_reveal_tick(&mut self, exchange: ExchangeId, partial: String) {
        if let Some(ref mut pending) = self.pending {
            // One tick per revealed character
            pending.cursor += 1;
        }
        self.send(ChatMessage::RevealProgress { exchange, partial });
    }

    fn on_reveal_done(&mut self, exchange: ExchangeId, answer: String) {
        let Some(pending) = self.pending.take() else {
            return;
        };

        // The store must still be exactly what was sent with the question
        if self.store.len() != pending.history.len() {
            tracing::warn!(
                %exchange,
                store = self.store.len(),
                history = pending.history.len(),
                "Conversation changed while an exchange was pending"
            );
        }

        let message = Message::assistant(answer);
        let index = self.store.append(message.clone());
        self.send(ChatMessage::Appended { index, message });
        self.set_typing(false);
        self.set_state(ChatState::Ready);

        tracing::info!(%exchange, index, "Exchange complete");
    }

    // ============================================
    // Session control
    // ============================================

    /// Start over with an empty conversation
    ///
    /// A running reveal is cancelled. A request still in flight is not, but
    /// its result will be ignored.
    pub fn reset(&mut self) {
        if self.state == ChatState::ShuttingDown {
            tracing::debug!("Reset ignored after shutdown");
            return;
        }

        if let Some(pending) = self.pending.take() {
            pending.cancel_reveal();
        }

        self.store = ConversationStore::new();
        self.last_error = None;
        self.set_typing(false);
        self.set_state(ChatState::Ready);

        let session_id = self.store.session_id().clone();
        tracing::info!(session = %session_id.0, "Session reset");
        self.send(ChatMessage::SessionReset { session_id });
    }

    /// Shut down the controller
    ///
    /// Cancels any running reveal; no further submissions are accepted.
    pub fn shutdown(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.cancel_reveal();
        }
        self.set_typing(false);
        self.set_state(ChatState::ShuttingDown);
    }

    // ============================================
    // Surface notifications
    // ============================================

    /// Set state and notify the surface on change
    fn set_state(&mut self, state: ChatState) {
        if self.state != state {
            self.state = state;
            self.send(ChatMessage::State { state });
        }
    }

    /// Set the typing indicator and notify the surface on change
    fn set_typing(&mut self, active: bool) {
        if self.typing != active {
            self.typing = active;
            self.send(ChatMessage::Typing { active });
        }
    }

    /// Send a message to the surface
    fn send(&self, msg: ChatMessage) {
        if let Err(e) = self.tx.send(msg) {
            tracing::warn!("Failed to send message to surface: {}", e);
        }
    }
}
