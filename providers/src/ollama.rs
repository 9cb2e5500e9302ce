//! Ollama chat client.
//!
//! Request:
//!
//! ```json
//! { "model": "...", "messages": [{"role": "user", "content": "..."}],
//!   "stream": false, "options": { "temperature": 1.3 } }
//! ```
//!
//! Response: `{ "message": { "content": "..." }, ... }`. Everything else in the
//! response body is ignored.

use serde::{Deserialize, Serialize};
use yuri_types::{EphemeralTranscript, Temperature};

use crate::{
    BackendError, ChatBackend, ChatRequest, http_client_with_timeout, read_capped_error_body,
};

const CHAT_PATH: &str = "/api/chat";

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a EphemeralTranscript,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: Temperature,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

#[derive(Debug, Clone)]
pub struct OllamaBackend {
    chat_url: String,
    client: reqwest::Client,
}

impl OllamaBackend {
    /// `base_url` is the server root, e.g. `http://localhost:11434`.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(base_url, http_client_with_timeout(timeout_secs)?))
    }

    #[must_use]
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            chat_url: format!("{}{CHAT_PATH}", base_url.trim_end_matches('/')),
            client,
        }
    }

    #[must_use]
    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }
}

impl ChatBackend for OllamaBackend {
    async fn chat(&self, request: ChatRequest<'_>) -> Result<String, BackendError> {
        let body = OllamaChatRequest {
            model: request.model,
            messages: request.transcript,
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
            },
        };

        tracing::debug!(
            url = %self.chat_url,
            model = request.model,
            turns = request.transcript.len(),
            temperature = request.temperature.get(),
            "Sending chat request"
        );

        let response = self
            .client
            .post(&self.chat_url)
            .json(&body)
            .send()
            .await
            .map_err(|source| BackendError::Transport {
                url: self.chat_url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = read_capped_error_body(response).await;
            tracing::warn!(status = status.as_u16(), "Ollama returned an error status");
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|source| BackendError::Transport {
                url: self.chat_url.clone(),
                source,
            })?;
        let parsed: OllamaChatResponse = serde_json::from_str(&text)
            .map_err(|e| BackendError::Malformed(format!("expected message.content: {e}")))?;

        tracing::debug!(chars = parsed.message.content.len(), "Received chat reply");
        Ok(parsed.message.content)
    }
}
