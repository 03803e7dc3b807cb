//! Runner configuration.

use super::RunnerError;
use crate::config::ServiceConfig;
use std::path::{Path, PathBuf};

/// Service configuration plus the overrides of one invocation.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Loaded service configuration.
    service: ServiceConfig,
    /// Whether to stop every module before publication.
    dry_run: bool,
}

impl RunnerConfig {
    /// Creates a new configuration for a run.
    pub fn new(service: ServiceConfig) -> Self {
        Self {
            service,
            dry_run: false,
        }
    }

    /// Loads the service configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Config`] if the file is missing or invalid.
    pub fn from_file(path: &Path) -> Result<Self, RunnerError> {
        Ok(Self::new(ServiceConfig::load(path)?))
    }

    /// Enables or disables dry-run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Overrides the repository data directory.
    pub fn with_data_path(mut self, data_path: PathBuf) -> Self {
        self.service.data_path = data_path;
        self
    }

    /// Overrides the number of concurrent module jobs. Zero is raised to one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.service.concurrency = concurrency.max(1);
        self
    }

    /// Returns the service configuration.
    pub fn service(&self) -> &ServiceConfig {
        &self.service
    }

    /// Returns whether dry-run mode is enabled.
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns the max concurrent module jobs.
    pub fn concurrency(&self) -> usize {
        self.service.concurrency
    }
}
