//! Read access to stored repositories.

use super::{Repository, RepositoryError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Source of the repositories the scheduler walks.
#[async_trait]
pub trait RepositoryStore: Send + Sync {
    /// Loads every stored repository.
    async fn load(&self) -> Result<Vec<Repository>, RepositoryError>;

    /// Loads a single repository by ID.
    async fn find(&self, id: &str) -> Result<Repository, RepositoryError> {
        self.load()
            .await?
            .into_iter()
            .find(|repository| repository.id == id)
            .ok_or_else(|| RepositoryError::NotFound { id: id.to_string() })
    }
}

/// Directory of `<ID>.json` files, one per repository.
#[derive(Debug, Clone)]
pub struct FileRepositoryStore {
    data_dir: PathBuf,
}

impl FileRepositoryStore {
    /// Creates a store reading from `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Returns the data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[async_trait]
impl RepositoryStore for FileRepositoryStore {
    async fn load(&self) -> Result<Vec<Repository>, RepositoryError> {
        let io_error = |source| RepositoryError::Io {
            path: self.data_dir.display().to_string(),
            source,
        };

        let mut entries = tokio::fs::read_dir(&self.data_dir).await.map_err(io_error)?;
        let mut repositories = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") || !path.is_file() {
                continue;
            }

            let raw = match tokio::fs::read_to_string(&path).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to read repository");
                    continue;
                }
            };

            match serde_json::from_str::<Repository>(&raw) {
                Ok(repository) => repositories.push(repository),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping invalid repository file");
                }
            }
        }

        repositories.sort_by(|a, b| a.id.cmp(&b.id));
        debug!(count = repositories.len(), "Loaded repositories");
        Ok(repositories)
    }
}
