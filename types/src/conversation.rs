//! The two views of a conversation.
//!
//! [`PersistedHistory`] is the durable, user-visible record. [`EphemeralTranscript`]
//! is the per-request copy sent to the backend, carrying one synthetic trailing
//! assistant turn built from the [`InjectionValue`].
//!
//! The copy boundary is structural: a transcript owns its own `Vec<Turn>`, there
//! is no conversion from a transcript back into a history, and no history method
//! accepts an [`InjectionValue`].

use serde::{Deserialize, Serialize};

use crate::Turn;

/// Steering text resolved once per session. May be empty (no injection).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectionValue(String);

impl InjectionValue {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Ordered conversation record; insertion order is conversation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersistedHistory {
    turns: Vec<Turn>,
}

impl PersistedHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_turns(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }
}

impl<'a> IntoIterator for &'a PersistedHistory {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}

/// Disposable request context: a full copy of the history plus the injection turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EphemeralTranscript {
    turns: Vec<Turn>,
}

impl EphemeralTranscript {
    /// Copy `history` and append `Turn { role: assistant, content: injection }`.
    ///
    /// The trailing turn is appended even when the injection is empty, so the
    /// request shape does not depend on whether a category resolved.
    #[must_use]
    pub fn sliding(history: &PersistedHistory, injection: &InjectionValue) -> Self {
        let mut turns = Vec::with_capacity(history.len() + 1);
        turns.extend(history.turns.iter().cloned());
        turns.push(Turn::assistant(injection.as_str()));
        Self { turns }
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
