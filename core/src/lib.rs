//! lolGPT Core - Headless Conversation Engine
//!
//! This crate holds everything the lolGPT chat client knows about a
//! conversation, completely independent of any UI framework. A terminal
//! surface drives it today; a test harness drives it just as well.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Surface (TUI)                         │
//! │        key events ──> Chat calls    ChatMessage ──> render   │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │
//! ┌──────────────────────────────┼───────────────────────────────┐
//! │                         LOLGPT CORE                          │
//! │  ┌───────────────────────────┴────────────────────────────┐  │
//! │  │                          Chat                          │  │
//! │  │  ┌────────────┐  ┌──────────────┐  ┌────────────────┐  │  │
//! │  │  │ InputGate  │  │ Conversation │  │    Request     │  │  │
//! │  │  │            │  │    Store     │  │  Coordinator   │  │  │
//! │  │  └────────────┘  └──────────────┘  └───┬────────┬───┘  │  │
//! │  └─────────────────────────────────────────┼────────┼──────┘  │
//! │                          ┌─────────────────┘        │         │
//! │                   AnswerBackend            RevealScheduler    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Chat`]: The controller that owns the conversation and the pending exchange
//! - [`ChatMessage`]: Messages sent from the controller to a surface
//! - [`ConversationStore`]: Append-only message log
//! - [`RevealScheduler`]: Per-character reveal of a finished answer
//! - [`AnswerBackend`]: The remote answer service seam
//!
//! # Quick Start
//!
//! ```ignore
//! use lolgpt_core::{Chat, ChatOptions, HttpAnswerBackend, load_config, ConfigOverrides};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config(&ConfigOverrides::new())?;
//!     let (tx, mut rx) = mpsc::unbounded_channel();
//!
//!     let backend = HttpAnswerBackend::from_config(&config);
//!     let mut chat = Chat::new(backend, ChatOptions::from_config(&config), tx);
//!
//!     chat.submit("Who counters Yasuo?")?;
//!     while chat.is_pending() {
//!         chat.wait().await;
//!         while let Ok(msg) = rx.try_recv() {
//!             // Render message
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod chat;
pub mod config;
pub mod conversation;
pub mod coordinator;
pub mod error;
pub mod input;
pub mod messages;
pub mod reveal;

// Re-exports for convenience
pub use backend::{AnswerBackend, AskRequest, AskResponse, HttpAnswerBackend};
pub use chat::{Chat, ChatOptions, PendingExchange};
pub use conversation::{Conversation, ConversationStore};
pub use coordinator::{ExchangeEvent, RequestCoordinator};
pub use error::{SubmitError, TransportError};
pub use input::{Accepted, InputGate, DEFAULT_MAX_INPUT_BYTES};
pub use messages::{ChatMessage, ChatState, ExchangeId, Message, SessionId, Speaker};
pub use reveal::{CancelHandle, Reveal, RevealScheduler, RevealStep, DEFAULT_REVEAL_INTERVAL};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_with, ChatConfig, ConfigError,
    ConfigOverrides, ConfigSource, ConfigSources, ConfigToml,
};
