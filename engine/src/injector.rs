//! The sliding-injection step.
//!
//! Per call:
//!
//! 1. Append the user turn to persisted history (kept even if the backend fails).
//! 2. Build an [`EphemeralTranscript`]: a full copy of history plus a trailing
//!    assistant turn carrying the injection.
//! 3. Send the transcript to the backend.
//! 4. Prefix the reply with [`THINK_MARKER`].
//! 5. Append the marked reply as an assistant turn.
//! 6. Save the full history if persistence is enabled.
//! 7. Return the marked reply.
//!
//! History grows by exactly two turns per successful call. The injection only
//! ever lives in the transcript, which is dropped when the call returns.

use std::path::{Path, PathBuf};

use yuri_context::{HistoryStore, PersistenceError};
use yuri_providers::{ChatBackend, ChatRequest};
use yuri_types::{
    EphemeralTranscript, InjectionValue, NonEmptyString, PersistedHistory, THINK_MARKER,
    Temperature, Turn,
};

use crate::ChatError;

/// Where a session writes its history after each exchange.
#[derive(Debug, Clone)]
pub struct Persistence {
    store: HistoryStore,
    locator: PathBuf,
}

impl Persistence {
    #[must_use]
    pub fn new(store: HistoryStore, locator: PathBuf) -> Self {
        Self { store, locator }
    }

    #[must_use]
    pub fn locator(&self) -> &Path {
        &self.locator
    }

    pub(crate) fn save(
        &self,
        history: &PersistedHistory,
    ) -> Result<(), PersistenceError> {
        self.store.save(&self.locator, history)
    }
}

#[derive(Debug)]
pub struct SlidingInjector<B> {
    backend: B,
    model: NonEmptyString,
    temperature: Temperature,
}

impl<B: ChatBackend> SlidingInjector<B> {
    #[must_use]
    pub fn new(backend: B, model: NonEmptyString, temperature: Temperature) -> Self {
        Self {
            backend,
            model,
            temperature,
        }
    }

    #[must_use]
    pub fn model(&self) -> &NonEmptyString {
        &self.model
    }

    #[must_use]
    pub fn temperature(&self) -> Temperature {
        self.temperature
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn step(
        &self,
        history: &mut PersistedHistory,
        injection: &InjectionValue,
        persistence: Option<&Persistence>,
        user_input: &str,
    ) -> Result<String, ChatError> {
        history.push(Turn::user(user_input));

        let transcript = EphemeralTranscript::sliding(history, injection);
        tracing::debug!(
            turns = transcript.len(),
            injection_len = injection.len(),
            "Built sliding transcript"
        );

        let request = ChatRequest {
            model: self.model.as_str(),
            transcript: &transcript,
            temperature: self.temperature,
        };
        let reply = match self.backend.chat(request).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(
                    turns = history.len(),
                    "Backend call failed; user turn kept in history: {err}"
                );
                return Err(err.into());
            }
        };
        drop(transcript);

        let marked = mark_reply(&reply);
        history.push(Turn::assistant(marked.as_str()));

        if let Some(persistence) = persistence {
            persistence.save(history)?;
        }

        Ok(marked)
    }
}

fn mark_reply(reply: &str) -> String {
    let mut marked = String::with_capacity(THINK_MARKER.len() + reply.len());
    marked.push_str(THINK_MARKER);
    marked.push_str(reply);
    marked
}
