//! Cached repository configuration lookup.

use crate::host::CodeHost;
use crate::pipeline::UpdateError;
use crate::repository::{ModuleConfig, Repository, RepositoryConfig, RepositoryError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Reads repository configuration files, caching them per repository.
pub struct ConfigResolver {
    host: Arc<dyn CodeHost>,
    config_file: String,
    cache: Mutex<HashMap<String, RepositoryConfig>>,
}

impl ConfigResolver {
    /// Creates a resolver reading `config_file` from the default branch.
    pub fn new(host: Arc<dyn CodeHost>, config_file: impl Into<String>) -> Self {
        Self {
            host,
            config_file: config_file.into(),
            cache: Mutex::default(),
        }
    }

    /// Returns the configuration of `repository`, `None` if it has no
    /// configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError`] if the file cannot be fetched or parsed.
    pub async fn resolve(&self, repository: &Repository) -> Result<Option<RepositoryConfig>, UpdateError> {
        if let Some(config) = self.lock().get(&repository.id) {
            return Ok(Some(config.clone()));
        }

        let Some(raw) = self
            .host
            .fetch_file(repository, &self.config_file, Some(&repository.default_branch))
            .await?
        else {
            debug!(repo = %repository.full_name, file = %self.config_file, "No configuration file");
            return Ok(None);
        };

        let config = RepositoryConfig::parse(&repository.full_name, &raw)?;
        self.lock().insert(repository.id.clone(), config.clone());
        Ok(Some(config))
    }

    /// Returns the modules configured for `plugin`.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::ConfigurationMissing`] if the file or the plugin
    /// entry is absent.
    pub async fn modules(&self, repository: &Repository, plugin: &str) -> Result<Vec<ModuleConfig>, UpdateError> {
        let missing = || RepositoryError::ConfigurationMissing {
            repository: repository.full_name.clone(),
            plugin: plugin.to_string(),
        };

        let config = self.resolve(repository).await?.ok_or_else(missing)?;
        Ok(config.modules(&repository.full_name, plugin)?.to_vec())
    }

    /// Drops the cached configuration of a repository.
    pub fn invalidate(&self, repository_id: &str) {
        if self.lock().remove(repository_id).is_some() {
            debug!(repository_id, "Invalidated cached configuration");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, RepositoryConfig>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
