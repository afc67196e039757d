//! Chat backend client.
//!
//! The backend is an external collaborator reached through a single
//! exchange: `POST {"input": ...}` answered by `{"response": ...}`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

/// Errors from one backend exchange.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-2xx status.
    #[error("Unexpected status: {0}")]
    Status(u16),

    /// The body was not the expected JSON.
    #[error("Malformed response: {0}")]
    Decode(String),
}

/// Request body sent to the backend.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    input: &'a str,
}

/// Response body expected from the backend.
#[derive(Debug, Deserialize)]
struct ChatReply {
    response: String,
}

/// Something that answers user text with reply text.
#[async_trait]
pub trait ChatBackend: Send + Sync + std::fmt::Debug {
    /// Send trimmed user text and return the raw reply text.
    async fn send(&self, input: &str) -> Result<String, BackendError>;
}

/// [`ChatBackend`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpChatBackend {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpChatBackend {
    /// Create a client for `endpoint`.
    ///
    /// No timeout is applied unless `timeout` is given.
    pub fn new(endpoint: Url, timeout: Option<Duration>) -> Result<Self, BackendError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn send(&self, input: &str) -> Result<String, BackendError> {
        tracing::debug!(endpoint = %self.endpoint, input_length = input.len(), "Posting to chat backend");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&ChatRequest { input })
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        let reply: ChatReply =
            serde_json::from_slice(&body).map_err(|e| BackendError::Decode(e.to_string()))?;

        Ok(reply.response)
    }
}
