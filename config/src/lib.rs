//! Configuration for Yuri.
//!
//! Two sources are read:
//!
//! - The application config, TOML at `~/.yuri/config.toml` (or `$YURI_CONFIG`).
//!   Every section is optional; unset values fall back to the defaults below.
//! - The injection prompt catalog, YAML, see [`PromptCatalog`].
//!
//! ```toml
//! [app]
//! model = "deepseek-r1:32b"
//! temperature = 1.3
//!
//! [prompts]
//! path = "inject_prompt.yaml"
//! category = "r18_prompts"
//!
//! [history]
//! load = "tests/test1.json"
//! save = true
//! dir = "tests"
//!
//! [ollama]
//! base_url = "http://localhost:11434"
//! timeout_secs = 300
//! ```
//!
//! String values support `${VAR}` environment expansion.

mod prompts;

pub use prompts::{ConfigLoadError, PromptCatalog};

use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use yuri_types::{NonEmptyString, Temperature};

pub const DEFAULT_MODEL: &str = "deepseek-r1:32b";
pub const DEFAULT_TEMPERATURE: f64 = Temperature::DEFAULT.get();
pub const DEFAULT_PROMPT_PATH: &str = "inject_prompt.yaml";
pub const DEFAULT_CATEGORY: &str = "r18_prompts";
pub const DEFAULT_HISTORY_DIR: &str = "tests";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

const CONFIG_ENV_VAR: &str = "YURI_CONFIG";
const OLLAMA_HOST_ENV_VAR: &str = "OLLAMA_HOST";

#[derive(Debug, Default, Deserialize)]
pub struct YuriConfig {
    pub app: Option<AppConfig>,
    pub prompts: Option<PromptsConfig>,
    pub history: Option<HistoryConfig>,
    pub ollama: Option<OllamaConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Backend model identifier.
    pub model: Option<String>,
    /// Sampling temperature sent with every request.
    pub temperature: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PromptsConfig {
    /// Path to the YAML injection prompt catalog.
    pub path: Option<String>,
    /// Category selected from `prompts.<category>`.
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryConfig {
    /// Prior history file to hydrate the session from.
    pub load: Option<String>,
    /// Write history after every exchange. Default: false.
    #[serde(default)]
    pub save: bool,
    /// Directory new history files are allocated in.
    pub dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OllamaConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl YuriConfig {
    /// Load the config from its default location. `Ok(None)` if no file exists.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(config),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    pub fn model(&self) -> Result<NonEmptyString, ConfigError> {
        let raw = self
            .app
            .as_ref()
            .and_then(|app| app.model.as_deref())
            .map_or_else(|| DEFAULT_MODEL.to_string(), expand_env_vars);
        NonEmptyString::new(raw).map_err(|e| ConfigError::Invalid {
            field: "app.model",
            reason: e.to_string(),
        })
    }

    pub fn temperature(&self) -> Result<Temperature, ConfigError> {
        let raw = self
            .app
            .as_ref()
            .and_then(|app| app.temperature)
            .unwrap_or(DEFAULT_TEMPERATURE);
        Temperature::new(raw).map_err(|e| ConfigError::Invalid {
            field: "app.temperature",
            reason: e.to_string(),
        })
    }

    #[must_use]
    pub fn prompt_path(&self) -> PathBuf {
        self.prompts
            .as_ref()
            .and_then(|p| p.path.as_deref())
            .map_or_else(|| PathBuf::from(DEFAULT_PROMPT_PATH), expand_path)
    }

    pub fn category(&self) -> Result<NonEmptyString, ConfigError> {
        let raw = self
            .prompts
            .as_ref()
            .and_then(|p| p.category.as_deref())
            .map_or_else(|| DEFAULT_CATEGORY.to_string(), expand_env_vars);
        NonEmptyString::new(raw).map_err(|e| ConfigError::Invalid {
            field: "prompts.category",
            reason: e.to_string(),
        })
    }

    #[must_use]
    pub fn history_load(&self) -> Option<PathBuf> {
        self.history
            .as_ref()
            .and_then(|h| h.load.as_deref())
            .map(expand_path)
            .filter(|path| !path.as_os_str().is_empty())
    }

    #[must_use]
    pub fn save_history(&self) -> bool {
        self.history.as_ref().is_some_and(|h| h.save)
    }

    #[must_use]
    pub fn history_dir(&self) -> PathBuf {
        self.history
            .as_ref()
            .and_then(|h| h.dir.as_deref())
            .map_or_else(|| PathBuf::from(DEFAULT_HISTORY_DIR), expand_path)
    }

    /// Resolution order: `$OLLAMA_HOST`, then `[ollama] base_url`, then the local default.
    #[must_use]
    pub fn ollama_base_url(&self) -> String {
        let from_env = env::var(OLLAMA_HOST_ENV_VAR)
            .ok()
            .filter(|value| !value.trim().is_empty());
        let from_config = self
            .ollama
            .as_ref()
            .and_then(|o| o.base_url.as_deref())
            .map(expand_env_vars);
        let raw = from_env
            .or(from_config)
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
        normalize_base_url(&raw)
    }

    #[must_use]
    pub fn ollama_timeout_secs(&self) -> u64 {
        self.ollama
            .as_ref()
            .and_then(|o| o.timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
    }
}

/// `OLLAMA_HOST` is commonly set without a scheme (`127.0.0.1:11434`).
fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(expand_env_vars(raw))
}

/// Substitute `${VAR}` references in config strings.
///
/// Used for the prompt catalog path, history paths, model and category, so one
/// config file can follow `YURI_*` variables across machines. Unset variables
/// expand to nothing. An unterminated `${` is kept as written.
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(open) = rest.find("${") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let name = &after[..close];
        if !name.is_empty() {
            out.push_str(&env::var(name).unwrap_or_default());
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    if let Ok(explicit) = env::var(CONFIG_ENV_VAR)
        && !explicit.trim().is_empty()
    {
        return Some(PathBuf::from(explicit));
    }
    dirs::home_dir().map(|home| home.join(".yuri").join("config.toml"))
}
