//! Isolated outdated-dependency checks.
//!
//! A checker reads the manifests from the build cache, writes its report into
//! the same directory and exits. Its exit code is informational only: the
//! report file decides the outcome, and a missing or empty report means there
//! is nothing to update.

mod docker;
mod error;
mod request;

pub use docker::DockerChecker;
pub use error::CheckerError;
pub use request::{CheckRequest, Mount};

use async_trait::async_trait;
use std::path::Path;

/// How a checker run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckerExit {
    /// Exit code, `None` if the process was killed by a signal.
    pub code: Option<i32>,
}

/// Runs checker images.
#[async_trait]
pub trait Checker: Send + Sync {
    /// Runs `request` to completion.
    async fn run(&self, request: &CheckRequest) -> Result<CheckerExit, CheckerError>;
}

/// Reads the report written by a checker.
///
/// Returns `None` if the file is missing or blank.
///
/// # Errors
///
/// Returns [`CheckerError::ReadReport`] if the file exists but cannot be read.
pub async fn read_report(path: &Path) -> Result<Option<String>, CheckerError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) if content.trim().is_empty() => Ok(None),
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CheckerError::ReadReport {
            path: path.display().to_string(),
            source: e,
        }),
    }
}
