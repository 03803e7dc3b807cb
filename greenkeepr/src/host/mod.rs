//! Code host access: pull requests and file contents.

mod error;
mod github;
mod rate_limit;

pub use error::HostError;
pub use github::GitHubHost;
pub use rate_limit::RateLimitInfo;

use crate::repository::Repository;
use async_trait::async_trait;

/// An open pull request as needed for deduplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenPullRequest {
    pub number: u64,
    pub title: String,
    pub body: String,
}

/// A pull request to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    pub title: String,
    /// Branch with the changes.
    pub head: String,
    /// Branch to merge into.
    pub base: String,
    pub body: String,
}

/// A pull request that was opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPullRequest {
    pub number: u64,
    pub url: String,
}

/// Operations on the hosting service of a repository.
#[async_trait]
pub trait CodeHost: Send + Sync {
    /// Lists every open pull request of `repository`.
    async fn open_pull_requests(&self, repository: &Repository) -> Result<Vec<OpenPullRequest>, HostError>;

    /// Opens a pull request.
    async fn create_pull_request(
        &self,
        repository: &Repository,
        pull_request: &NewPullRequest,
    ) -> Result<CreatedPullRequest, HostError>;

    /// Fetches a file, `None` if it does not exist. `reference` defaults to
    /// the default branch.
    async fn fetch_file(
        &self,
        repository: &Repository,
        path: &str,
        reference: Option<&str>,
    ) -> Result<Option<String>, HostError>;
}
