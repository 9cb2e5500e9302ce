//! Inference backend clients.
//!
//! # Architecture
//!
//! - [`ChatBackend`] - the seam the session engine calls through; one request in,
//!   one complete reply out
//! - [`ollama`] - Ollama `/api/chat` client (non-streaming)
//!
//! A backend receives the full [`EphemeralTranscript`] by shared reference and
//! returns the raw completion text. Backends never retry; a failure is reported
//! once as a [`BackendError`] and the caller decides what to do next.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use yuri_types::{EphemeralTranscript, Temperature};

pub use yuri_types;

pub mod ollama;

pub use ollama::OllamaBackend;

const CONNECT_TIMEOUT_SECS: u64 = 10;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

/// One backend call: the full message context plus sampling settings.
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub transcript: &'a EphemeralTranscript,
    pub temperature: Temperature,
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed backend response: {0}")]
    Malformed(String),
}

pub trait ChatBackend {
    /// Send `request` and return the completion text, unmodified.
    fn chat(
        &self,
        request: ChatRequest<'_>,
    ) -> impl Future<Output = Result<String, BackendError>> + Send;
}

fn base_client_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
}

/// Client with a whole-request timeout. Local models can take minutes per reply.
pub fn http_client_with_timeout(timeout_secs: u64) -> Result<reqwest::Client, reqwest::Error> {
    base_client_builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
}

pub async fn read_capped_error_body(response: reqwest::Response) -> String {
    use futures_util::StreamExt;
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}
