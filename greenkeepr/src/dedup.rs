//! Duplicate update detection.
//!
//! Open pull requests are the only shared state: an update is a duplicate if
//! an open pull request carries a marker for the same module naming any of
//! the changed dependencies.

use crate::host::{CodeHost, HostError};
use crate::marker::PullRequestMarker;
use crate::repository::{ModuleConfig, Repository};
use std::sync::Arc;
use tracing::debug;

/// Checks open pull requests for an equivalent update.
#[derive(Clone)]
pub struct DeduplicationGate {
    host: Arc<dyn CodeHost>,
}

impl DeduplicationGate {
    /// Creates a gate reading pull requests from `host`.
    pub fn new(host: Arc<dyn CodeHost>) -> Self {
        Self { host }
    }

    /// Returns true if an open pull request already updates any of `changed`
    /// in `module`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the pull requests cannot be listed.
    pub async fn has_open_update(
        &self,
        repository: &Repository,
        module: &ModuleConfig,
        changed: &[String],
    ) -> Result<bool, HostError> {
        let open = self.host.open_pull_requests(repository).await?;

        let duplicate = open
            .iter()
            .find(|pr| find_overlap(&pr.body, module, changed).is_some());

        if let Some(pr) = duplicate {
            debug!(
                repo = %repository.full_name,
                pr_number = pr.number,
                "Found open pull request for the same dependencies"
            );
        }

        Ok(duplicate.is_some())
    }
}

/// Returns the first marker in `body` for `module` that names any of `changed`.
pub fn find_overlap(body: &str, module: &ModuleConfig, changed: &[String]) -> Option<PullRequestMarker> {
    PullRequestMarker::parse_all(body)
        .into_iter()
        .find(|marker| marker.is_for(module) && marker.overlaps(changed))
}
