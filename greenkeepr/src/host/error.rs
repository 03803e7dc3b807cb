//! Code host error types.

use crate::repository::RepositoryError;
use thiserror::Error;

/// Errors that can occur while talking to the code host.
#[derive(Debug, Error)]
pub enum HostError {
    /// GitHub API error.
    #[error("GitHub API error: {0}")]
    GitHub(#[from] octocrab::Error),

    /// The repository cannot be addressed on the host.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
