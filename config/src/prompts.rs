//! Injection prompt catalog.
//!
//! The catalog is a YAML document of the form:
//!
//! ```yaml
//! prompts:
//!   test_prompts: "..."
//!   r18_prompts: |
//!     ...
//! ```
//!
//! Only `prompts.<category>` is read. A missing category resolves to an empty
//! [`InjectionValue`] rather than an error.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use thiserror::Error;
use yuri_types::{InjectionValue, NonEmptyString};

const PROMPTS_KEY: &str = "prompts";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read prompt file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse prompt file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("prompt file {}: `{field}` must be a mapping", path.display())]
    NotAMapping { path: PathBuf, field: &'static str },
}

impl ConfigLoadError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigLoadError::Read { path, .. }
            | ConfigLoadError::Parse { path, .. }
            | ConfigLoadError::NotAMapping { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PromptCatalog {
    source: PathBuf,
    prompts: BTreeMap<String, String>,
}

impl PromptCatalog {
    /// Read and parse the catalog at `path`. This is the only IO the catalog performs.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| {
            tracing::warn!("Failed to read prompt file at {:?}: {}", path, source);
            ConfigLoadError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::parse(&content, path)
    }

    /// Parse catalog text; `source` is only used for error reporting.
    pub fn parse(content: &str, source: impl Into<PathBuf>) -> Result<Self, ConfigLoadError> {
        let source = source.into();
        let document: Value = match serde_yaml::from_str(content) {
            Ok(value) => value,
            Err(err) => return Err(ConfigLoadError::Parse { path: source, source: err }),
        };

        let Value::Mapping(mut root) = document else {
            return Err(ConfigLoadError::NotAMapping {
                path: source,
                field: "<root>",
            });
        };

        let prompts = match root.remove(PROMPTS_KEY) {
            None => BTreeMap::new(),
            Some(value @ Value::Mapping(_)) => match serde_yaml::from_value(value) {
                Ok(prompts) => prompts,
                Err(err) => return Err(ConfigLoadError::Parse { path: source, source: err }),
            },
            Some(_) => {
                return Err(ConfigLoadError::NotAMapping {
                    path: source,
                    field: PROMPTS_KEY,
                });
            }
        };

        tracing::debug!(
            path = %source.display(),
            categories = prompts.len(),
            "Loaded prompt catalog"
        );
        Ok(Self { source, prompts })
    }

    /// Text bound to `category`, or an empty injection if the category is absent.
    #[must_use]
    pub fn resolve(&self, category: &NonEmptyString) -> InjectionValue {
        match self.prompts.get(category.as_str()) {
            Some(text) => InjectionValue::new(text.as_str()),
            None => {
                tracing::warn!(
                    category = %category,
                    path = %self.source.display(),
                    "Prompt category not found; continuing without injection"
                );
                InjectionValue::default()
            }
        }
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.prompts.keys().map(String::as_str)
    }

    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }
}
