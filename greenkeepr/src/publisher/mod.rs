//! Branch, commit and pull request creation for a patched module.
//!
//! A publication syncs the working copy, commits the patched files on a fresh
//! `greenkeep/<md5>` branch, force-pushes it, switches back to the default
//! branch and opens a pull request whose body carries the marker block.
//! Nothing is rolled back: a failure after the push leaves the branch behind.

mod error;

pub use error::PublishError;

use crate::config::LanguageSettings;
use crate::host::{CodeHost, NewPullRequest};
use crate::marker::PullRequestMarker;
use crate::repository::{ModuleConfig, Repository};
use crate::source_control::SourceControl;
use crate::templates::{fresh_branch_name, TemplateRenderer, UpdateContext};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};

/// A file produced in the build cache and its place in the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchedFile {
    /// Absolute path of the patched file.
    pub source: PathBuf,

    /// Destination relative to the repository root.
    pub destination: String,
}

/// Everything needed to publish one module update.
#[derive(Debug, Clone)]
pub struct PublishRequest<'a> {
    pub repository: &'a Repository,
    pub module: &'a ModuleConfig,
    pub settings: &'a LanguageSettings,
    pub files: Vec<PatchedFile>,
    /// Updated dependency names, as listed in the marker.
    pub dependencies: Vec<String>,
}

/// A published update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedUpdate {
    pub branch: String,
    pub number: u64,
    pub url: String,
    pub title: String,
    pub dependencies: Vec<String>,
}

/// Publishes patched manifests as pull requests.
#[derive(Clone)]
pub struct Publisher {
    source_control: Arc<dyn SourceControl>,
    host: Arc<dyn CodeHost>,
    renderer: Arc<TemplateRenderer>,
    checkout_root: PathBuf,
}

impl Publisher {
    /// Creates a publisher keeping working copies below `checkout_root`.
    pub fn new(
        source_control: Arc<dyn SourceControl>,
        host: Arc<dyn CodeHost>,
        renderer: Arc<TemplateRenderer>,
        checkout_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_control,
            host,
            renderer,
            checkout_root: checkout_root.into(),
        }
    }

    /// Working copy directory of `repository`.
    pub fn checkout_path(&self, repository: &Repository) -> PathBuf {
        self.checkout_root.join(&repository.id)
    }

    /// Publishes `request` as a new pull request.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] for the first failing step.
    pub async fn publish(&self, request: &PublishRequest<'_>) -> Result<PublishedUpdate, PublishError> {
        let span = info_span!(
            "publish",
            repo = %request.repository.full_name,
            language = %request.module.language,
            path = %request.module.path
        );

        async {
            let marker = PullRequestMarker::for_module(request.module, request.dependencies.clone())
                .render()
                .map_err(PublishError::Marker)?;
            let context = UpdateContext {
                language: &request.module.language,
                path: &request.module.path,
                dependencies: &request.dependencies,
                marker: &marker,
                repository: &request.repository.full_name,
            };
            let title = self.renderer.render_pr_title(request.settings, &context)?;
            let body = self.renderer.render_pr_body(request.settings, &context)?;
            let message = self.renderer.render_commit_message(request.settings, &context)?;

            let checkout = self.checkout_path(request.repository);
            self.source_control.sync(request.repository, &checkout).await?;

            let branch = fresh_branch_name();
            let pushed = self.push_branch(request, &checkout, &branch, &message).await;

            if let Err(e) = self
                .source_control
                .restore_default_branch(request.repository, &checkout)
                .await
            {
                warn!(error = %e, "Failed to restore default branch");
            }
            pushed?;

            let created = self
                .host
                .create_pull_request(
                    request.repository,
                    &NewPullRequest {
                        title: title.clone(),
                        head: branch.clone(),
                        base: request.repository.default_branch.clone(),
                        body,
                    },
                )
                .await?;

            info!(pr_number = created.number, branch = %branch, "Pull request created");

            Ok(PublishedUpdate {
                branch,
                number: created.number,
                url: created.url,
                title,
                dependencies: request.dependencies.clone(),
            })
        }
        .instrument(span)
        .await
    }

    async fn push_branch(
        &self,
        request: &PublishRequest<'_>,
        checkout: &Path,
        branch: &str,
        message: &str,
    ) -> Result<(), PublishError> {
        self.source_control.create_branch(checkout, branch).await?;

        let mut staged = Vec::with_capacity(request.files.len());
        for file in &request.files {
            move_file(&file.source, &checkout.join(&file.destination)).await?;
            staged.push(file.destination.clone());
        }

        self.source_control
            .stage_and_commit(checkout, &staged, message)
            .await?;
        self.source_control
            .force_push(request.repository, checkout, branch)
            .await?;
        debug!(branch, "Pushed update branch");
        Ok(())
    }
}

/// Moves `source` to `destination`, copying across file systems.
async fn move_file(source: &Path, destination: &Path) -> Result<(), PublishError> {
    let error = |error| PublishError::MoveFile {
        source_path: source.display().to_string(),
        destination: destination.display().to_string(),
        error,
    };

    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(error)?;
    }

    if tokio::fs::rename(source, destination).await.is_ok() {
        return Ok(());
    }

    tokio::fs::copy(source, destination).await.map_err(error)?;
    tokio::fs::remove_file(source).await.map_err(error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn move_file_replaces_destination() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("cache/Gemfile.new");
        let destination = temp.path().join("checkout/api/Gemfile");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::create_dir_all(destination.parent().unwrap()).unwrap();
        fs::write(&source, "new").unwrap();
        fs::write(&destination, "old").unwrap();

        move_file(&source, &destination).await.unwrap();

        assert_eq!(fs::read_to_string(&destination).unwrap(), "new");
        assert!(!source.exists());
    }

    #[tokio::test]
    async fn move_file_reports_missing_source() {
        let temp = TempDir::new().unwrap();
        let result = move_file(&temp.path().join("missing"), &temp.path().join("out")).await;
        assert!(matches!(result, Err(PublishError::MoveFile { .. })));
    }
}
