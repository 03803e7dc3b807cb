//! Source control error types.

use thiserror::Error;

/// Errors that can occur while operating on a working copy.
#[derive(Debug, Error)]
pub enum GitError {
    /// The git binary could not be started.
    #[error("Failed to execute git {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// git exited with a failure status.
    #[error("git {command} failed: {stderr}")]
    Failed { command: String, stderr: String },

    /// The remote URL cannot carry credentials.
    #[error("Invalid remote URL '{url}'")]
    InvalidRemote { url: String },

    /// Preparing the working copy directory failed.
    #[error("Failed to prepare '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
