//! Core conversation types for Yuri.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

mod conversation;
mod proofs;
mod sampling;
mod turn;

pub use conversation::{EphemeralTranscript, InjectionValue, PersistedHistory};
pub use proofs::{EmptyStringError, NonEmptyStaticStr, NonEmptyString};
pub use sampling::{Temperature, TemperatureError};
pub use turn::{Role, Turn};

/// Prefix stored in front of every backend reply before it enters persisted history.
///
/// Replayed in later turns, it makes the reply read as a model-native reasoning block.
pub const THINK_MARKER: &str = "<think>\n";
