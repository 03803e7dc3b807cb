//! Per-module build cache directories.
//!
//! Layout: `<base>/<repositoryID>/<sha256(path, language)>/`, holding the
//! extracted manifests, the checker report and `<manifest>.new` before it is
//! published.

mod error;
mod key;

pub use error::BuildCacheError;
pub use key::BuildCacheKey;

use crate::repository::ModuleConfig;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Root of all module cache directories.
#[derive(Debug, Clone)]
pub struct BuildCache {
    base: PathBuf,
}

impl BuildCache {
    /// Creates a cache rooted at `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Returns the cache base directory.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Returns the directory of `key` without creating it.
    pub fn path_for(&self, key: &BuildCacheKey) -> PathBuf {
        self.base.join(key.relative_path())
    }

    /// Creates the directory of a module if absent and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`BuildCacheError`] for unsafe repository IDs or I/O failures.
    pub async fn prepare(&self, repository_id: &str, module: &ModuleConfig) -> Result<PathBuf, BuildCacheError> {
        let key = BuildCacheKey::new(repository_id, module)?;
        let path = self.path_for(&key);

        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|source| io_error(&path, source))?;

        debug!(path = %path.display(), "Prepared build cache");
        Ok(path)
    }

    /// Copies each located file from `source` into `cache`, by file name.
    ///
    /// Existing copies are overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`BuildCacheError::ManifestMissing`] if a file does not exist
    /// and [`BuildCacheError::UnsafePath`] if it would escape `source`.
    pub async fn extract(&self, source: &Path, files: &[String], cache: &Path) -> Result<(), BuildCacheError> {
        for file in files {
            let relative = Path::new(file);
            let file_name = match relative.file_name() {
                Some(name) if is_contained(relative) => name,
                _ => {
                    return Err(BuildCacheError::UnsafePath { path: file.clone() });
                }
            };

            let from = source.join(relative);
            if !tokio::fs::try_exists(&from).await.unwrap_or(false) {
                return Err(BuildCacheError::ManifestMissing { file: file.clone() });
            }

            let to = cache.join(file_name);
            tokio::fs::copy(&from, &to)
                .await
                .map_err(|source| io_error(&to, source))?;
            debug!(file, "Extracted manifest");
        }

        Ok(())
    }

    /// Creates or truncates the report file in `cache` and returns its path.
    ///
    /// # Errors
    ///
    /// Returns [`BuildCacheError::Io`] if the file cannot be written.
    pub async fn reset_report(&self, cache: &Path, file: &str) -> Result<PathBuf, BuildCacheError> {
        let path = cache.join(file);
        tokio::fs::write(&path, b"")
            .await
            .map_err(|source| io_error(&path, source))?;
        Ok(path)
    }
}

fn is_contained(path: &Path) -> bool {
    path.components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

fn io_error(path: &Path, source: std::io::Error) -> BuildCacheError {
    BuildCacheError::Io {
        path: path.display().to_string(),
        source,
    }
}
