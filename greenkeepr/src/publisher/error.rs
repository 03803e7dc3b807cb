//! Publication error types.

use crate::host::HostError;
use crate::source_control::GitError;
use crate::templates::TemplateError;
use thiserror::Error;

/// Errors that abort the publication of an update.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Title, body or commit message could not be rendered.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The marker block could not be rendered.
    #[error("Failed to render marker: {0}")]
    Marker(#[source] serde_json::Error),

    /// A working copy operation failed.
    #[error(transparent)]
    Git(#[from] GitError),

    /// The pull request could not be opened.
    #[error(transparent)]
    Host(#[from] HostError),

    /// A patched file could not be moved into the working copy.
    #[error("Failed to move '{source_path}' to '{destination}': {error}")]
    MoveFile {
        source_path: String,
        destination: String,
        #[source]
        error: std::io::Error,
    },
}
