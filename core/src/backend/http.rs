//! HTTP Backend Implementation
//!
//! Talks to the answer service over plain HTTP.
//!
//! # Wire format
//!
//! ```text
//! POST <base-url>/ask/
//! Content-Type: application/json
//!
//! { "question": "...", "history": [{ "role": "user", "content": "..." }] }
//! ```
//!
//! A success is `{ "answer": "..." }`. The service reports its own failures
//! as a non-success status with `{ "error": "..." }`; that text is kept in
//! the resulting [`TransportError::Status`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;

use super::traits::{AnswerBackend, AskRequest, AskResponse};
use crate::config::ChatConfig;
use crate::error::TransportError;

/// Error body returned by the service
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP answer service client
#[derive(Clone, Debug)]
pub struct HttpAnswerBackend {
    /// Base URL without trailing slash
    base_url: String,
    /// Per-request timeout
    timeout: Duration,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpAnswerBackend {
    /// Create a new HTTP backend
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            timeout,
            http_client: reqwest::Client::new(),
        }
    }

    /// Create from loaded configuration
    #[must_use]
    pub fn from_config(config: &ChatConfig) -> Self {
        Self::new(config.api_url.clone(), config.request_timeout())
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the ask endpoint URL
    fn ask_url(&self) -> String {
        format!("{}/ask/", self.base_url)
    }

    /// Pull the most useful message out of an error response body
    fn error_message(status: reqwest::StatusCode, body: &str) -> String {
        if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
            return parsed.error;
        }

        let body = body.trim();
        if body.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("no response body")
                .to_string()
        } else {
            body.to_string()
        }
    }
}

#[async_trait]
impl AnswerBackend for HttpAnswerBackend {
    fn name(&self) -> &'static str {
        "HTTP"
    }

    async fn ask(&self, request: &AskRequest) -> Result<String, TransportError> {
        let start = Instant::now();
        let url = self.ask_url();
        let timeout_secs = self.timeout.as_secs();

        tracing::debug!(
            url = %url,
            history = request.history.len(),
            "Sending question to answer service"
        );

        let response = self
            .http_client
            .post(&url)
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(&e, timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = Self::error_message(status, &body);
            tracing::warn!(
                status = status.as_u16(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                message = %message,
                "Answer service returned an error"
            );
            return Err(TransportError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::from_reqwest(&e, timeout_secs))?;
        let parsed: AskResponse =
            serde_json::from_str(&body).map_err(|e| TransportError::Malformed(e.to_string()))?;

        tracing::debug!(
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            answer_chars = parsed.answer.chars().count(),
            "Answer received"
        );

        Ok(parsed.answer)
    }
}
