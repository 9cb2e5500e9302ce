//! Session composition root.

use std::path::{Path, PathBuf};

use yuri_config::{
    ConfigError, DEFAULT_CATEGORY, DEFAULT_HISTORY_DIR, PromptCatalog, YuriConfig,
};
use yuri_context::{HistoryStore, PersistenceError};
use yuri_providers::ChatBackend;
use yuri_types::{InjectionValue, NonEmptyStaticStr, NonEmptyString, PersistedHistory, Temperature};

use crate::injector::{Persistence, SlidingInjector};
use crate::{ChatError, SessionError};

const DEFAULT_CATEGORY_STR: NonEmptyStaticStr = NonEmptyStaticStr::new(DEFAULT_CATEGORY);

/// Everything needed to build a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    model: NonEmptyString,
    prompt_path: PathBuf,
    category: NonEmptyString,
    history_file: Option<PathBuf>,
    save_history: bool,
    history_dir: PathBuf,
    temperature: Temperature,
    store: HistoryStore,
}

impl SessionOptions {
    /// Defaults: category `r18_prompts`, no hydration, saving off, namespace `tests/`,
    /// temperature [`Temperature::DEFAULT`].
    #[must_use]
    pub fn new(model: NonEmptyString, prompt_path: impl Into<PathBuf>) -> Self {
        Self {
            model,
            prompt_path: prompt_path.into(),
            category: DEFAULT_CATEGORY_STR.into(),
            history_file: None,
            save_history: false,
            history_dir: PathBuf::from(DEFAULT_HISTORY_DIR),
            temperature: Temperature::DEFAULT,
            store: HistoryStore::new(),
        }
    }

    pub fn from_config(config: &YuriConfig) -> Result<Self, ConfigError> {
        let mut options = Self::new(config.model()?, config.prompt_path())
            .with_category(config.category()?)
            .with_save_history(config.save_history())
            .with_history_dir(config.history_dir())
            .with_temperature(config.temperature()?);
        options.history_file = config.history_load();
        Ok(options)
    }

    #[must_use]
    pub fn with_category(mut self, category: NonEmptyString) -> Self {
        self.category = category;
        self
    }

    /// Hydrate the session from a prior history file.
    #[must_use]
    pub fn with_history_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.history_file = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_save_history(mut self, save: bool) -> Self {
        self.save_history = save;
        self
    }

    /// Directory new history locators are allocated in.
    #[must_use]
    pub fn with_history_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.history_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: Temperature) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub fn with_store(mut self, store: HistoryStore) -> Self {
        self.store = store;
        self
    }
}

/// One conversation with one backend.
///
/// # Single writer
///
/// A session owns its [`PersistedHistory`] and is its only writer. `chat`
/// takes `&mut self`, so at most one call can be in flight per session. Sharing
/// a session across tasks requires an exclusive lock around `chat`.
///
/// Persisted history is rewritten after every successful exchange, so nothing
/// needs to happen on drop.
#[derive(Debug)]
pub struct Session<B> {
    injector: SlidingInjector<B>,
    history: PersistedHistory,
    injection: InjectionValue,
    category: NonEmptyString,
    persistence: Option<Persistence>,
}

impl<B: ChatBackend> Session<B> {
    /// Resolve the injection, optionally hydrate history, optionally allocate a locator.
    ///
    /// When both hydration and saving are enabled, the hydrated history is
    /// written to a freshly allocated locator; the source file is never modified.
    pub fn new(options: SessionOptions, backend: B) -> Result<Self, SessionError> {
        let SessionOptions {
            model,
            prompt_path,
            category,
            history_file,
            save_history,
            history_dir,
            temperature,
            store,
        } = options;

        let catalog = PromptCatalog::load(&prompt_path)?;
        let injection = catalog.resolve(&category);

        let history = match history_file {
            Some(path) => store.load(&path)?,
            None => PersistedHistory::new(),
        };

        let persistence = if save_history {
            let locator = store.allocate_locator(&history_dir)?;
            Some(Persistence::new(store, locator))
        } else {
            None
        };

        tracing::info!(
            model = %model,
            category = %category,
            injection_len = injection.len(),
            hydrated_turns = history.len(),
            locator = ?persistence.as_ref().map(Persistence::locator),
            "Session created"
        );

        Ok(Self {
            injector: SlidingInjector::new(backend, model, temperature),
            history,
            injection,
            category,
            persistence,
        })
    }

    /// Send `input` and return the marked assistant reply.
    pub async fn chat(&mut self, input: &str) -> Result<String, ChatError> {
        self.injector
            .step(
                &mut self.history,
                &self.injection,
                self.persistence.as_ref(),
                input,
            )
            .await
    }

    /// Write the current history again, e.g. after a [`ChatError::Persistence`].
    ///
    /// No-op when saving is disabled.
    pub fn save(&self) -> Result<(), PersistenceError> {
        match &self.persistence {
            Some(persistence) => persistence.save(&self.history),
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn history(&self) -> &PersistedHistory {
        &self.history
    }

    #[must_use]
    pub fn injection(&self) -> &InjectionValue {
        &self.injection
    }

    #[must_use]
    pub fn category(&self) -> &NonEmptyString {
        &self.category
    }

    #[must_use]
    pub fn model(&self) -> &NonEmptyString {
        self.injector.model()
    }

    #[must_use]
    pub fn locator(&self) -> Option<&Path> {
        self.persistence.as_ref().map(Persistence::locator)
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        self.injector.backend()
    }
}
