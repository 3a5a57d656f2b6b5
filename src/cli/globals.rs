use crate::{
    cli::commands::client::{ARG_API_URL, ARG_STORE, ARG_TIMEOUT_MS},
    config::{apply_runtime_overrides, AppConfig, RuntimeConfig},
    errors::AppError,
    features::auth::AuthContext,
    storage::FileStorage,
};
use std::sync::Arc;
use tracing::debug;

/// Connection settings shared by every command.
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub api_url: Option<String>,
    pub store: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl GlobalArgs {
    #[must_use]
    pub fn parse(matches: &clap::ArgMatches) -> Self {
        Self {
            api_url: matches.get_one::<String>(ARG_API_URL).cloned(),
            store: matches.get_one::<String>(ARG_STORE).cloned(),
            timeout_ms: matches.get_one::<u64>(ARG_TIMEOUT_MS).copied(),
        }
    }

    /// Compiled defaults with the flags applied on top.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the resulting API URL is not usable.
    pub fn config(&self) -> Result<AppConfig, AppError> {
        let mut config = AppConfig::load();
        apply_runtime_overrides(
            &mut config,
            RuntimeConfig::new(
                self.api_url.as_deref(),
                self.store.as_deref(),
                self.timeout_ms,
            ),
        );
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns `AppError::Storage` if the store file cannot be opened.
    pub fn open_storage(&self, config: &AppConfig) -> Result<Arc<FileStorage>, AppError> {
        debug!("opening store at {}", config.storage_path.display());
        Ok(Arc::new(FileStorage::open(&config.storage_path)?))
    }

    /// # Errors
    /// Returns an error if the configuration, the store, or the HTTP client is unusable.
    pub fn auth_context(&self) -> Result<AuthContext, AppError> {
        let config = self.config()?;
        let storage = self.open_storage(&config)?;
        AuthContext::from_config(config, storage)
    }
}
