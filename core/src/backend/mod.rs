//! Answer Service Integration
//!
//! The remote answer-generation service sits behind the [`AnswerBackend`]
//! trait so the controller can be driven by an in-memory backend in tests.
//!
//! # Available Backends
//!
//! - **HTTP**: `POST <base-url>/ask/` with JSON in and out (default)
//!
//! # Usage
//!
//! ```ignore
//! use lolgpt_core::backend::{AnswerBackend, AskRequest, HttpAnswerBackend};
//!
//! let backend = HttpAnswerBackend::new("http://localhost:8000", Duration::from_secs(120));
//! let answer = backend.ask(&AskRequest::new("Who counters Yasuo?", history)).await?;
//! ```

mod http;
mod traits;

pub use http::HttpAnswerBackend;
pub use traits::{AnswerBackend, AskRequest, AskResponse};
