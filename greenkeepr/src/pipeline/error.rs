//! Module job error types.

use crate::build_cache::BuildCacheError;
use crate::checker::CheckerError;
use crate::host::HostError;
use crate::manifest::ManifestError;
use crate::publisher::PublishError;
use crate::report::ReportError;
use crate::repository::RepositoryError;
use crate::source_control::GitError;
use thiserror::Error;

/// Errors that end a module job.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// The module names a language without a handler or settings.
    #[error("Unsupported language '{language}'")]
    UnsupportedLanguage { language: String },

    /// The repository has no configuration for the plugin.
    #[error("No '{plugin}' configuration in {repository}")]
    ConfigurationMissing { repository: String, plugin: String },

    /// The repository is not in the store.
    #[error("Unknown repository '{id}'")]
    UnknownRepository { id: String },

    /// A located manifest file is missing from the working copy.
    #[error("Manifest file '{file}' not found")]
    ManifestMissing { file: String },

    /// The build cache directory could not be prepared.
    #[error(transparent)]
    BuildCache(BuildCacheError),

    /// The checker could not be run or its report not be read.
    #[error("Checker failed: {0}")]
    CheckerFailure(#[from] CheckerError),

    /// The checker report is malformed.
    #[error("Failed to parse checker report: {0}")]
    ParseError(#[from] ReportError),

    /// The manifest could not be decoded or patched.
    #[error("Failed to patch manifest: {0}")]
    Patch(ManifestError),

    /// The working copy could not be synced before the check.
    #[error("Failed to sync working copy: {0}")]
    SourceControl(#[from] GitError),

    /// Open pull requests could not be listed.
    #[error("Failed to list pull requests: {0}")]
    Host(#[from] HostError),

    /// Branch, commit, push or pull request creation failed.
    #[error("Failed to publish update: {0}")]
    PublishFailure(#[from] PublishError),

    /// The repository data is unusable.
    #[error(transparent)]
    Repository(RepositoryError),
}

impl UpdateError {
    /// Returns true for failures that only mean "nothing to do here".
    #[must_use]
    pub fn is_silent(&self) -> bool {
        matches!(self, UpdateError::ConfigurationMissing { .. })
    }
}

impl From<BuildCacheError> for UpdateError {
    fn from(error: BuildCacheError) -> Self {
        match error {
            BuildCacheError::ManifestMissing { file } => UpdateError::ManifestMissing { file },
            other => UpdateError::BuildCache(other),
        }
    }
}

impl From<ManifestError> for UpdateError {
    fn from(error: ManifestError) -> Self {
        match error {
            ManifestError::UnsupportedLanguage { language } => {
                UpdateError::UnsupportedLanguage { language }
            }
            other => UpdateError::Patch(other),
        }
    }
}

impl From<RepositoryError> for UpdateError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::ConfigurationMissing { repository, plugin } => {
                UpdateError::ConfigurationMissing { repository, plugin }
            }
            RepositoryError::NotFound { id } => UpdateError::UnknownRepository { id },
            other => UpdateError::Repository(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_manifest_is_lifted() {
        let error = UpdateError::from(BuildCacheError::ManifestMissing {
            file: "Gemfile".to_string(),
        });
        assert!(matches!(error, UpdateError::ManifestMissing { file } if file == "Gemfile"));
    }

    #[test]
    fn only_missing_configuration_is_silent() {
        let missing = UpdateError::from(RepositoryError::ConfigurationMissing {
            repository: "acme/app".to_string(),
            plugin: "greenkeep".to_string(),
        });
        let unknown = UpdateError::from(RepositoryError::NotFound { id: "1".to_string() });

        assert!(missing.is_silent());
        assert!(!unknown.is_silent());
        assert!(matches!(unknown, UpdateError::UnknownRepository { .. }));
    }
}
