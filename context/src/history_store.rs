//! Durable storage for [`PersistedHistory`].
//!
//! A history file is a self-describing JSON record:
//!
//! ```json
//! {
//!     "conversation": [
//!         { "role": "user", "content": "hello" },
//!         { "role": "assistant", "content": "<think>\n..." }
//!     ]
//! }
//! ```
//!
//! Saves always rewrite the whole record. Locators are allocated from a
//! namespace directory as `test1.json`, `test2.json`, ... by probing for the
//! first name that does not exist yet. Allocation creates nothing and holds no
//! lock, so two processes allocating at once can pick the same name; the
//! session engine is single-process by contract.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use thiserror::Error;
use yuri_types::PersistedHistory;
use yuri_utils::{AtomicWriteOptions, atomic_write_with_options, recover_bak_file};

const CONVERSATION_KEY: &str = "conversation";
const INDENT: &[u8] = b"    ";

#[derive(Debug, Error)]
pub enum HistoryLoadError {
    #[error("failed to read history {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse history {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("history {} is not a JSON object", path.display())]
    NotAnObject { path: PathBuf },
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to create history directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("failed to serialize history: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to write history {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// The namespace could not be scanned, so no locator is known to be free.
#[derive(Debug, Error)]
#[error("failed to probe history locator {}: {source}", path.display())]
pub struct LocatorError {
    path: PathBuf,
    source: io::Error,
}

impl LocatorError {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Serialize)]
struct HistoryRecordRef<'a> {
    conversation: &'a PersistedHistory,
}

#[derive(Deserialize)]
struct HistoryRecord {
    #[serde(default)]
    conversation: PersistedHistory,
}

/// Naming scheme for allocated locators: `prefix + N + suffix`, N starting at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorScheme {
    prefix: String,
    suffix: String,
}

impl LocatorScheme {
    #[must_use]
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    fn file_name(&self, index: u64) -> String {
        format!("{}{index}{}", self.prefix, self.suffix)
    }
}

impl Default for LocatorScheme {
    fn default() -> Self {
        Self::new("test", ".json")
    }
}

#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    scheme: LocatorScheme,
}

impl HistoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_scheme(mut self, scheme: LocatorScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Load the history stored at `locator`.
    ///
    /// A record without a `conversation` field yields an empty history.
    pub fn load(&self, locator: impl AsRef<Path>) -> Result<PersistedHistory, HistoryLoadError> {
        let path = locator.as_ref();
        recover_bak_file(path);

        let json = fs::read_to_string(path).map_err(|source| HistoryLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let document: Value =
            serde_json::from_str(&json).map_err(|source| HistoryLoadError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        if !document.is_object() {
            return Err(HistoryLoadError::NotAnObject {
                path: path.to_path_buf(),
            });
        }

        let record: HistoryRecord =
            serde_json::from_value(document).map_err(|source| HistoryLoadError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::info!(
            path = %path.display(),
            turns = record.conversation.len(),
            "Loaded history"
        );
        Ok(record.conversation)
    }

    /// First `prefix{N}suffix` in `namespace_dir` (N = 1, 2, ...) with no directory entry.
    ///
    /// Entries are probed with `symlink_metadata`, so a dangling symlink still
    /// occupies its name. Only `NotFound` counts as free; any other probe error
    /// fails the allocation. Repeated calls without creating files return the
    /// same locator.
    pub fn allocate_locator(
        &self,
        namespace_dir: impl AsRef<Path>,
    ) -> Result<PathBuf, LocatorError> {
        let dir = namespace_dir.as_ref();
        let mut index: u64 = 1;
        loop {
            let candidate = dir.join(self.scheme.file_name(index));
            match fs::symlink_metadata(&candidate) {
                Ok(_) => index += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    tracing::debug!(locator = %candidate.display(), "Allocated history locator");
                    return Ok(candidate);
                }
                Err(source) => {
                    return Err(LocatorError {
                        path: candidate,
                        source,
                    });
                }
            }
        }
    }

    /// Overwrite `locator` with the full `history`.
    ///
    /// The parent directory is created if missing. The write is atomic
    /// (temp file + rename), so a crash leaves the last complete save.
    pub fn save(
        &self,
        locator: impl AsRef<Path>,
        history: &PersistedHistory,
    ) -> Result<(), PersistenceError> {
        let path = locator.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| PersistenceError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let bytes = encode_record(history).map_err(PersistenceError::Serialize)?;
        atomic_write_with_options(path, &bytes, AtomicWriteOptions::default()).map_err(|source| {
            PersistenceError::Write {
                path: path.to_path_buf(),
                source,
            }
        })?;

        tracing::debug!(path = %path.display(), turns = history.len(), "Saved history");
        Ok(())
    }
}

fn encode_record(history: &PersistedHistory) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(INDENT));
    HistoryRecordRef {
        conversation: history,
    }
    .serialize(&mut serializer)?;
    Ok(out)
}
