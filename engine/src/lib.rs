//! Sliding-injection session engine.
//!
//! # Architecture
//!
//! ```text
//! caller -> Session::chat -> SlidingInjector::step
//!                              |  history (persisted) + injection
//!                              v
//!                        EphemeralTranscript -> ChatBackend
//!                              |
//!                              v
//!                "<think>\n" + reply -> history -> HistoryStore::save
//! ```
//!
//! [`Session`] is the composition root: it resolves the injection from a
//! [`PromptCatalog`](yuri_config::PromptCatalog) once, optionally hydrates
//! history, and allocates a save locator. [`SlidingInjector`] runs one exchange.

mod error;
mod injector;
mod session;
#[cfg(test)]
mod test_support;

pub use error::{ChatError, SessionError};
pub use injector::{Persistence, SlidingInjector};
pub use session::{Session, SessionOptions};

pub use yuri_config::{ConfigError, ConfigLoadError, PromptCatalog, YuriConfig, config_path};
pub use yuri_context::{
    HistoryLoadError, HistoryStore, LocatorError, LocatorScheme, PersistenceError,
};
pub use yuri_providers::{BackendError, ChatBackend, ChatRequest, OllamaBackend};
pub use yuri_types::{
    EphemeralTranscript, InjectionValue, NonEmptyString, PersistedHistory, Role, THINK_MARKER,
    Temperature, Turn,
};
