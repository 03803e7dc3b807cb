//! Run summary types.

use super::result::ProcessingResult;
use crate::pipeline::ModuleOutcome;

/// Summary of a one-shot run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Number of repositories with the plugin enabled.
    pub repositories_scanned: usize,

    /// Number of module jobs that ran to an outcome.
    pub modules_checked: usize,

    /// Number of pull requests opened.
    pub pull_requests_created: usize,

    /// Number of patched modules not published because of dry-run mode.
    pub would_publish: usize,

    /// Number of modules whose update is already proposed.
    pub already_proposed: usize,

    /// Number of modules without outdated dependencies.
    pub up_to_date: usize,

    /// Number of modules with outdated but undeclared dependencies.
    pub nothing_patched: usize,

    /// Number of repositories or modules skipped.
    pub skipped: usize,

    /// Number of repositories or modules that failed.
    pub failed: usize,

    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Updates the summary with a processing result.
    pub fn record_result(&mut self, result: &ProcessingResult) {
        match result {
            ProcessingResult::Completed { outcome, .. } => {
                self.modules_checked += 1;
                match outcome {
                    ModuleOutcome::UpToDate => self.up_to_date += 1,
                    ModuleOutcome::NothingPatched { .. } => self.nothing_patched += 1,
                    ModuleOutcome::AlreadyProposed { .. } => self.already_proposed += 1,
                    ModuleOutcome::DryRun { .. } => self.would_publish += 1,
                    ModuleOutcome::Published(_) => self.pull_requests_created += 1,
                }
            }
            ProcessingResult::Skipped { .. } => self.skipped += 1,
            ProcessingResult::Failed { .. } => self.failed += 1,
        }
    }

    /// Returns true if any failures occurred.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Returns true if all operations were successful.
    #[must_use]
    pub fn all_success(&self) -> bool {
        self.failed == 0
    }
}
