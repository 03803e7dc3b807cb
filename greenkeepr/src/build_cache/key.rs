//! Deterministic cache keys.

use super::BuildCacheError;
use crate::repository::ModuleConfig;
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Cache key of one module: repository ID plus a SHA-256 of path and language.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildCacheKey {
    repository_id: String,
    digest: String,
}

impl BuildCacheKey {
    /// Computes the key of `module` in repository `repository_id`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildCacheError::InvalidRepositoryId`] unless the ID is a
    /// single, non-special path segment.
    pub fn new(repository_id: &str, module: &ModuleConfig) -> Result<Self, BuildCacheError> {
        if !is_safe_segment(repository_id) {
            return Err(BuildCacheError::InvalidRepositoryId {
                id: repository_id.to_string(),
            });
        }

        let mut hasher = Sha256::new();
        // Length prefixes keep ("a/b", "c") and ("a", "b/c") apart.
        for field in [module.path.as_bytes(), module.language.as_bytes()] {
            hasher.update((field.len() as u64).to_be_bytes());
            hasher.update(field);
        }

        Ok(Self {
            repository_id: repository_id.to_string(),
            digest: format!("{:x}", hasher.finalize()),
        })
    }

    /// Hex digest of path and language.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// `<repositoryID>/<digest>`, relative to the cache base.
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(&self.repository_id).join(&self.digest)
    }
}

fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\', '\0'])
}
