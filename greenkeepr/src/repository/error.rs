//! Repository error types.

use thiserror::Error;

/// Errors that can occur while reading repositories and their configuration.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Full name is not in `owner/name` form.
    #[error("Invalid repository name '{full_name}': expected 'owner/name'")]
    InvalidFullName { full_name: String },

    /// No module configuration exists for the plugin.
    #[error("No '{plugin}' configuration found for repository {repository}")]
    ConfigurationMissing { repository: String, plugin: String },

    /// The repository configuration file is not valid JSON.
    #[error("Invalid configuration file in {repository}: {source}")]
    InvalidConfig {
        repository: String,
        #[source]
        source: serde_json::Error,
    },

    /// No repository with this ID is stored.
    #[error("Unknown repository '{id}'")]
    NotFound { id: String },

    /// Failed to read from the store.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
