//! Request Coordinator
//!
//! Runs the background half of an exchange: one call to the answer service,
//! then the reveal of whatever came back. Neither half touches controller
//! state. Everything is reported as an [`ExchangeEvent`] on a channel the
//! [`Chat`](crate::Chat) controller drains, tagged with the exchange it
//! belongs to.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::backend::{AnswerBackend, AskRequest};
use crate::error::TransportError;
use crate::messages::ExchangeId;
use crate::reveal::{CancelHandle, RevealScheduler};

/// Progress of an exchange, reported from background tasks
#[derive(Debug)]
pub enum ExchangeEvent {
    /// The service answered
    Answered {
        /// Exchange the answer belongs to
        exchange: ExchangeId,
        /// Full answer text
        answer: String,
    },

    /// The call failed; no answer will follow
    Failed {
        /// Exchange that failed
        exchange: ExchangeId,
        /// What went wrong
        error: TransportError,
    },

    /// One more character of the answer is visible
    RevealTick {
        /// Exchange being revealed
        exchange: ExchangeId,
        /// Revealed prefix
        partial: String,
    },

    /// The whole answer is visible
    RevealDone {
        /// Exchange being revealed
        exchange: ExchangeId,
        /// Full answer text
        answer: String,
    },
}

impl ExchangeEvent {
    /// Exchange this event belongs to
    pub fn exchange(&self) -> ExchangeId {
        match self {
            Self::Answered { exchange, .. }
            | Self::Failed { exchange, .. }
            | Self::RevealTick { exchange, .. }
            | Self::RevealDone { exchange, .. } => *exchange,
        }
    }
}

/// Issues questions and reveals answers off the controller's thread
pub struct RequestCoordinator<B: AnswerBackend> {
    /// Answer service
    backend: Arc<B>,
    /// Drives answer reveals
    scheduler: RevealScheduler,
    /// Where background work reports back
    events: mpsc::UnboundedSender<ExchangeEvent>,
}

impl<B: AnswerBackend + 'static> RequestCoordinator<B> {
    /// Create a coordinator reporting on `events`
    pub fn new(
        backend: Arc<B>,
        scheduler: RevealScheduler,
        events: mpsc::UnboundedSender<ExchangeEvent>,
    ) -> Self {
        Self {
            backend,
            scheduler,
            events,
        }
    }

    /// Backend name, for diagnostics
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Reveal scheduler in use
    pub fn scheduler(&self) -> &RevealScheduler {
        &self.scheduler
    }

    /// Ask one question in the background
    ///
    /// Makes exactly one call and reports exactly one of
    /// [`ExchangeEvent::Answered`] or [`ExchangeEvent::Failed`]. There is no
    /// cancellation; a caller no longer interested in the result ignores it.
    pub fn begin(&self, exchange: ExchangeId, request: AskRequest) -> JoinHandle<()> {
        let backend = self.backend.clone();
        let events = self.events.clone();

        tokio::spawn(async move {
            let start = Instant::now();
            tracing::info!(
                %exchange,
                backend = backend.name(),
                history = request.history.len(),
                "Asking answer service"
            );

            let event = match backend.ask(&request).await {
                Ok(answer) => {
                    tracing::info!(
                        %exchange,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        answer_chars = answer.chars().count(),
                        "Answer received"
                    );
                    ExchangeEvent::Answered { exchange, answer }
                }
                Err(error) => {
                    tracing::warn!(
                        %exchange,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        error = %error,
                        "Answer request failed"
                    );
                    ExchangeEvent::Failed { exchange, error }
                }
            };

            if events.send(event).is_err() {
                tracing::debug!(%exchange, "Controller gone, dropping exchange result");
            }
        })
    }

    /// Reveal an answer, reporting ticks and completion as events
    pub fn start_reveal(&self, exchange: ExchangeId, answer: String) -> CancelHandle {
        let tick_events = self.events.clone();
        let done_events = self.events.clone();

        tracing::debug!(
            %exchange,
            chars = answer.chars().count(),
            interval_ms = self.scheduler.interval().as_millis() as u64,
            "Starting reveal"
        );

        self.scheduler.reveal(
            answer,
            move |partial| {
                let _ = tick_events.send(ExchangeEvent::RevealTick {
                    exchange,
                    partial: partial.to_string(),
                });
            },
            move |answer| {
                let _ = done_events.send(ExchangeEvent::RevealDone { exchange, answer });
            },
        )
    }
}
