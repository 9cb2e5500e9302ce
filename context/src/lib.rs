//! Conversation history persistence for Yuri.
//!
//! See [`HistoryStore`] for the on-disk record format and locator allocation.

mod history_store;

pub use history_store::{
    HistoryLoadError, HistoryStore, LocatorError, LocatorScheme, PersistenceError,
};
