//! Working copy operations used to publish updates.

mod error;
mod git;

pub use error::GitError;
pub use git::GitCli;

use crate::repository::Repository;
use async_trait::async_trait;
use std::path::Path;

/// Version control operations on a local working copy.
#[async_trait]
pub trait SourceControl: Send + Sync {
    /// Clones or fetches `repository` into `checkout` and resets it to a
    /// clean default branch.
    async fn sync(&self, repository: &Repository, checkout: &Path) -> Result<(), GitError>;

    /// Creates and checks out `branch` from the current head.
    async fn create_branch(&self, checkout: &Path, branch: &str) -> Result<(), GitError>;

    /// Stages `files` (relative to `checkout`) and commits them.
    async fn stage_and_commit(&self, checkout: &Path, files: &[String], message: &str) -> Result<(), GitError>;

    /// Force-pushes the current head to `branch` on the remote.
    async fn force_push(&self, repository: &Repository, checkout: &Path, branch: &str) -> Result<(), GitError>;

    /// Checks out the default branch again.
    async fn restore_default_branch(&self, repository: &Repository, checkout: &Path) -> Result<(), GitError>;
}
