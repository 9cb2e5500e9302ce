use thiserror::Error;
use yuri_config::ConfigLoadError;
use yuri_context::{HistoryLoadError, LocatorError, PersistenceError};
use yuri_providers::BackendError;

/// Failure while building a [`Session`](crate::Session). Fatal at construction.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigLoadError),
    #[error(transparent)]
    HistoryLoad(#[from] HistoryLoadError),
    #[error(transparent)]
    Locator(#[from] LocatorError),
}

/// Failure of a single `chat` call.
///
/// Neither variant rolls back in-memory history: after `Backend` the user turn
/// is recorded, after `Persistence` both turns are recorded.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
