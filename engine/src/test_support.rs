use std::collections::VecDeque;
use std::sync::Mutex;

use yuri_providers::{BackendError, ChatBackend, ChatRequest};
use yuri_types::EphemeralTranscript;

/// Backend double that replays a fixed script and records every request.
#[derive(Debug, Default)]
pub(crate) struct ScriptedBackend {
    script: Mutex<VecDeque<Result<String, BackendError>>>,
    seen: Mutex<Vec<EphemeralTranscript>>,
    settings: Mutex<Vec<(String, f64)>>,
}

impl ScriptedBackend {
    pub(crate) fn scripted(script: Vec<Result<String, BackendError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        }
    }

    pub(crate) fn replying<'a>(replies: impl IntoIterator<Item = &'a str>) -> Self {
        Self::scripted(replies.into_iter().map(|r| Ok(r.to_string())).collect())
    }

    pub(crate) fn failing(err: BackendError) -> Self {
        Self::scripted(vec![Err(err)])
    }

    pub(crate) fn seen(&self) -> Vec<EphemeralTranscript> {
        self.seen.lock().unwrap().clone()
    }

    pub(crate) fn settings(&self) -> Vec<(String, f64)> {
        self.settings.lock().unwrap().clone()
    }
}

impl ChatBackend for ScriptedBackend {
    async fn chat(&self, request: ChatRequest<'_>) -> Result<String, BackendError> {
        self.seen.lock().unwrap().push(request.transcript.clone());
        self.settings
            .lock()
            .unwrap()
            .push((request.model.to_string(), request.temperature.get()));
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::Malformed("script exhausted".into())))
    }
}
