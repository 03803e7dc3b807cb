//! Processing result types.

use crate::pipeline::{ModuleOutcome, UpdateError};
use crate::repository::ModuleConfig;
use tracing::{debug, error, info};

/// Result of processing a single repository or module.
#[derive(Debug, Clone)]
pub enum ProcessingResult {
    /// The module job ran to an outcome.
    Completed {
        /// Repository full name.
        repository: String,
        /// The checked module.
        module: ModuleConfig,
        /// How the job ended.
        outcome: ModuleOutcome,
    },

    /// Processing was skipped.
    Skipped {
        /// Repository full name.
        repository: String,
        /// The module, if the skip concerns a single module.
        module: Option<ModuleConfig>,
        /// Reason for skipping.
        reason: String,
    },

    /// Processing failed.
    Failed {
        /// Repository full name.
        repository: String,
        /// The module, if the failure concerns a single module.
        module: Option<ModuleConfig>,
        /// Error message.
        error: String,
    },
}

impl ProcessingResult {
    /// Maps a job result; silent errors become skips.
    pub fn from_job(
        repository: &str,
        module: &ModuleConfig,
        result: Result<ModuleOutcome, UpdateError>,
    ) -> Self {
        match result {
            Ok(outcome) => ProcessingResult::Completed {
                repository: repository.to_string(),
                module: module.clone(),
                outcome,
            },
            Err(e) if e.is_silent() => ProcessingResult::Skipped {
                repository: repository.to_string(),
                module: Some(module.clone()),
                reason: e.to_string(),
            },
            Err(e) => ProcessingResult::Failed {
                repository: repository.to_string(),
                module: Some(module.clone()),
                error: e.to_string(),
            },
        }
    }

    /// Logs the result at a level matching its severity.
    pub fn log(&self) {
        match self {
            ProcessingResult::Completed {
                repository,
                module,
                outcome,
            } => {
                info!(
                    repo = %repository,
                    language = %module.language,
                    path = %module.path,
                    outcome = outcome.as_str(),
                    "Module processed"
                );
            }
            ProcessingResult::Skipped {
                repository, reason, ..
            } => {
                debug!(repo = %repository, reason = %reason, "Skipped");
            }
            ProcessingResult::Failed {
                repository,
                module,
                error,
            } => {
                error!(
                    repo = %repository,
                    language = module.as_ref().map(|m| m.language.as_str()),
                    path = module.as_ref().map(|m| m.path.as_str()),
                    error = %error,
                    "Processing failed"
                );
            }
        }
    }
}
