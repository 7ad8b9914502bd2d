//! Core `InterviewBackend` trait and `HttpBackend` implementation.
//!
//! `HttpBackend` talks to the interview service over HTTP.  All connection
//! details (`base_url`, `timeout_secs`) come from [`BackendConfig`]; nothing
//! is hardcoded.

use async_trait::async_trait;
use reqwest::multipart;
use thiserror::Error;

use crate::backend::types::{StartReply, StartRequest, SubmitReply};
use crate::config::BackendConfig;

// ---------------------------------------------------------------------------
// BackendError
// ---------------------------------------------------------------------------

/// Errors that can occur while talking to the interview service.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("interview server request timed out")]
    Timeout,

    /// The server answered with a non-2xx status.  The response body is
    /// captured for diagnostics.
    #[error("interview server returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse interview server response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            BackendError::Timeout
        } else {
            BackendError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// InterviewBackend trait
// ---------------------------------------------------------------------------

/// Async trait for the interview service.
///
/// Implementors must be `Send + Sync` so they can be shared across threads
/// (e.g. wrapped in `Arc<dyn InterviewBackend>`).  The session controller
/// tests use a mock implementation of this trait.
#[async_trait]
pub trait InterviewBackend: Send + Sync {
    /// Create a server-side interview session for `candidate_name` and
    /// return the session id together with the first question.
    async fn start_interview(&self, candidate_name: &str) -> Result<StartReply, BackendError>;

    /// Upload one recorded answer for `session_id` and return the backend's
    /// verdict: the next question, an optional score, or the completion
    /// message.
    async fn submit_response(
        &self,
        session_id: &str,
        wav_bytes: Vec<u8>,
    ) -> Result<SubmitReply, BackendError>;
}

// ---------------------------------------------------------------------------
// HttpBackend
// ---------------------------------------------------------------------------

/// reqwest client for the real interview service.
pub struct HttpBackend {
    client: reqwest::Client,
    config: BackendConfig,
}

impl HttpBackend {
    /// Build an `HttpBackend` from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default (no-timeout) client is used as a
    /// last-resort fallback if the builder fails (should never happen in
    /// practice).
    pub fn from_config(config: &BackendConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    /// Turn a non-2xx response into [`BackendError::Status`], draining the
    /// body text for the log.
    async fn status_error(response: reqwest::Response) -> BackendError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        log::error!("backend: HTTP {status}, body: {body}");
        BackendError::Status { status, body }
    }
}

#[async_trait]
impl InterviewBackend for HttpBackend {
    async fn start_interview(&self, candidate_name: &str) -> Result<StartReply, BackendError> {
        let url = format!("{}/start_interview", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .json(&StartRequest {
                candidate_name: candidate_name.to_string(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let reply: StartReply = response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        log::info!("backend: session {} started", reply.session_id);
        Ok(reply)
    }

    async fn submit_response(
        &self,
        session_id: &str,
        wav_bytes: Vec<u8>,
    ) -> Result<SubmitReply, BackendError> {
        let url = format!("{}/submit_response", self.config.base_url);

        // Payload diagnostics go to the log, never to the user.
        log::debug!(
            "backend: submitting audio payload ({} bytes, audio/wav) for session {session_id}",
            wav_bytes.len()
        );

        let file_part = multipart::Part::bytes(wav_bytes)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| BackendError::Request(e.to_string()))?;

        let form = multipart::Form::new()
            .text("session_id", session_id.to_string())
            .part("audio_file", file_part);

        let response = self.client.post(&url).multipart(form).send().await?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let reply: SubmitReply = response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        log::debug!("backend: submit reply = {reply:?}");
        Ok(reply)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config() -> BackendConfig {
        BackendConfig {
            base_url: "http://localhost:8000".into(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn from_config_builds_without_panic() {
        let _backend = HttpBackend::from_config(&make_config());
    }

    /// Verify that `HttpBackend` is object-safe (usable as `dyn InterviewBackend`).
    #[test]
    fn backend_is_object_safe() {
        let backend: Box<dyn InterviewBackend> = Box::new(HttpBackend::from_config(&make_config()));
        drop(backend);
    }

    /// reqwest errors cannot be constructed directly in tests, so only the
    /// Display formats the log relies on are pinned here.
    #[test]
    fn error_display_formats() {
        let err = BackendError::Status {
            status: 500,
            body: "boom".into(),
        };
        assert_eq!(
            err.to_string(),
            "interview server returned status 500: boom"
        );
        assert_eq!(
            BackendError::Timeout.to_string(),
            "interview server request timed out"
        );
    }
}
