//! lolGPT TUI - Terminal chat client
//!
//! A full-screen terminal surface for the lolGPT answer service. It is a
//! thin client: every conversation decision is made by `lolgpt-core`, and
//! this crate only turns key presses into calls and `ChatMessage`s into
//! pixels.
//!
//! # Architecture
//!
//! - **App**: Event loop, key handling and rendering
//! - **ChatClient**: Owns the embedded `Chat` controller and its message channel
//! - **Display**: Render state derived from `ChatMessage`s
//! - **Theme**: Colors

pub mod app;
pub mod chat_client;
pub mod display;
pub mod theme;

pub use app::App;
pub use chat_client::ChatClient;
pub use display::{DisplayLine, DisplayMessage, DisplayRole, DisplayState, LineKind};
