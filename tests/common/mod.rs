//! Shared test utilities and fixtures
//!
//! A wiremock server stands in for Ollama's `/api/chat`.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use yuri_engine::{NonEmptyString, OllamaBackend, SessionOptions};

pub const MODEL: &str = "deepseek-r1:32b";

/// Start a mock server that simulates the Ollama API
pub async fn start_ollama_mock() -> MockServer {
    MockServer::start().await
}

/// Mount a non-streaming chat reply, answered `times` times
pub async fn mount_ollama_reply(server: &MockServer, content: &str, times: u64) {
    let body = serde_json::json!({
        "model": MODEL,
        "created_at": "2025-02-01T00:00:00Z",
        "message": {"role": "assistant", "content": content},
        "done": true
    });

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .up_to_n_times(times)
        .mount(server)
        .await;
}

/// Mount an error status
pub async fn mount_ollama_status(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// JSON bodies of every request the server received, in order
pub async fn received_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .collect()
}

pub fn backend(server: &MockServer) -> OllamaBackend {
    OllamaBackend::new(&server.uri(), 5).unwrap()
}

/// Write `inject_prompt.yaml` into `dir` and return options pointed at it
pub fn options_with_prompts(dir: &Path, yaml: &str, category: &str) -> SessionOptions {
    let prompt_path = dir.join("inject_prompt.yaml");
    fs::write(&prompt_path, yaml).unwrap();

    SessionOptions::new(NonEmptyString::new(MODEL).unwrap(), prompt_path)
        .with_category(NonEmptyString::new(category).unwrap())
        .with_history_dir(history_dir(dir))
}

pub fn history_dir(dir: &Path) -> PathBuf {
    dir.join("tests")
}
