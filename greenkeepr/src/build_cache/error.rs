//! Build cache error types.

use thiserror::Error;

/// Errors that can occur while preparing a build cache directory.
#[derive(Debug, Error)]
pub enum BuildCacheError {
    /// The repository ID cannot be used as a directory name.
    #[error("Repository ID '{id}' is not a valid directory name")]
    InvalidRepositoryId { id: String },

    /// A manifest path escapes the repository.
    #[error("Manifest path '{path}' must be relative and stay inside the repository")]
    UnsafePath { path: String },

    /// A located manifest file does not exist in the working copy.
    #[error("Manifest file '{file}' not found")]
    ManifestMissing { file: String },

    /// File system operation failed.
    #[error("Build cache I/O on '{path}' failed: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
