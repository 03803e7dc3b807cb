//! Per-repository plugin configuration file.

use super::{ModuleConfig, RepositoryError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Path of the configuration file on the repository's default branch.
pub const DEFAULT_CONFIG_FILE: &str = ".sisyphus";

/// Plugin name of the dependency update pipeline.
pub const DEFAULT_PLUGIN: &str = "greenkeep";

/// Parsed repository configuration: plugin name to ordered module list.
///
/// ```text
/// { "greenkeep": [ { "Path": ".", "Language": "javascript" } ] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryConfig {
    plugins: BTreeMap<String, Vec<ModuleConfig>>,
}

impl RepositoryConfig {
    /// Parses the configuration file content of `repository`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::InvalidConfig`] if the content is not a JSON
    /// object of module lists.
    pub fn parse(repository: &str, raw: &str) -> Result<Self, RepositoryError> {
        serde_json::from_str(raw).map_err(|source| RepositoryError::InvalidConfig {
            repository: repository.to_string(),
            source,
        })
    }

    /// Returns the modules configured for `plugin`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::ConfigurationMissing`] if the plugin has no
    /// entry or an empty module list.
    pub fn modules(&self, repository: &str, plugin: &str) -> Result<&[ModuleConfig], RepositoryError> {
        match self.plugins.get(plugin) {
            Some(modules) if !modules.is_empty() => Ok(modules),
            _ => Err(RepositoryError::ConfigurationMissing {
                repository: repository.to_string(),
                plugin: plugin.to_string(),
            }),
        }
    }
}
