//! Wires the stages together, either for a single pass or as a service.

mod config;
mod error;

pub use config::RunnerConfig;
pub use error::RunnerError;

use crate::broker::Broker;
use crate::build_cache::BuildCache;
use crate::checker::DockerChecker;
use crate::host::GitHubHost;
use crate::pipeline::{PipelineContext, UpdatePipeline};
use crate::repository::{FileRepositoryStore, ModuleConfig, Repository};
use crate::scheduler::{CheckWorker, ConfigResolver, FanOut, Scheduler};
use crate::source_control::GitCli;
use crate::summary::{ProcessingResult, RunSummary};
use crate::templates::TemplateRenderer;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Runs the update pipeline over every enabled repository.
pub struct Runner {
    config: RunnerConfig,
    ctx: PipelineContext,
}

impl Runner {
    /// Builds a runner talking to GitHub, `git` and `docker`.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Config`] if the overridden configuration is
    /// invalid, or [`RunnerError::Path`] if the cache or checkout directory
    /// cannot be resolved.
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        let service = config.service();
        service.validate(Path::new("<command line>"))?;

        // Bind mounts and clones run in other working directories.
        let cache_dir = absolute(&service.cache_dir)?;
        let checkout_root = absolute(&service.checkout_dir)?;

        let ctx = PipelineContext {
            store: Arc::new(FileRepositoryStore::new(&service.data_path)),
            host: Arc::new(GitHubHost::new()),
            source_control: Arc::new(GitCli::new(&service.committer_name, &service.committer_email)),
            checker: Arc::new(DockerChecker::default()),
            build_cache: BuildCache::new(cache_dir),
            languages: Arc::new(service.languages.clone()),
            checkout_root,
            renderer: Arc::new(TemplateRenderer::new()),
            dry_run: config.dry_run(),
        };

        Ok(Self::with_context(config, ctx))
    }

    /// Builds a runner over prepared collaborators.
    pub fn with_context(config: RunnerConfig, ctx: PipelineContext) -> Self {
        Self { config, ctx }
    }

    /// Checks every configured module once and returns the tally.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Repository`] if the repository store cannot be
    /// read. Failures of single repositories or modules only end up in the
    /// summary.
    pub async fn run_once(&self) -> Result<RunSummary, RunnerError> {
        let service = self.config.service();
        let mut summary = RunSummary::new(self.config.dry_run());

        info!(path = %service.data_path.display(), "Loading repositories");
        let repositories: Vec<Repository> = self
            .ctx
            .store
            .load()
            .await?
            .into_iter()
            .filter(|r| r.has_plugin(&service.plugin))
            .collect();

        if repositories.is_empty() {
            warn!(plugin = %service.plugin, "No repositories with the plugin enabled");
            return Ok(summary);
        }

        info!(count = repositories.len(), "Found repositories");
        summary.repositories_scanned = repositories.len();

        let resolver = ConfigResolver::new(Arc::clone(&self.ctx.host), &service.config_file);
        let mut jobs: Vec<(Repository, ModuleConfig)> = Vec::new();

        for repository in repositories {
            match resolver.modules(&repository, &service.plugin).await {
                Ok(modules) => {
                    debug!(repo = %repository.full_name, count = modules.len(), "Resolved modules");
                    jobs.extend(modules.into_iter().map(|module| (repository.clone(), module)));
                }
                Err(e) => {
                    let result = if e.is_silent() {
                        ProcessingResult::Skipped {
                            repository: repository.full_name.clone(),
                            module: None,
                            reason: e.to_string(),
                        }
                    } else {
                        ProcessingResult::Failed {
                            repository: repository.full_name.clone(),
                            module: None,
                            error: e.to_string(),
                        }
                    };
                    result.log();
                    summary.record_result(&result);
                }
            }
        }

        let pipeline = UpdatePipeline::new(self.ctx.clone());
        let results: Vec<ProcessingResult> = stream::iter(jobs)
            .map(|(repository, module)| {
                let pipeline = &pipeline;
                async move {
                    let result = pipeline.run(&repository, &module).await;
                    ProcessingResult::from_job(&repository.full_name, &module, result)
                }
            })
            .buffer_unordered(self.config.concurrency())
            .collect()
            .await;

        for result in &results {
            result.log();
            summary.record_result(result);
        }

        Ok(summary)
    }

    /// Runs the scheduler, fan-out and one worker per language until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Signal`] if the shutdown signal cannot be
    /// awaited.
    pub async fn serve(self) -> Result<(), RunnerError> {
        let service = self.config.service();
        let broker = Broker::new(service.queue_capacity);
        let pipeline = UpdatePipeline::new(self.ctx.clone());

        // Subscriptions exist before the scheduler publishes its first tick.
        let workers: Vec<CheckWorker> = self
            .ctx
            .languages
            .keys()
            .map(|language| {
                CheckWorker::new(
                    pipeline.clone(),
                    &broker,
                    &service.plugin,
                    language.as_str(),
                    self.config.concurrency(),
                )
            })
            .collect();
        let fan_out = FanOut::new(
            Arc::clone(&self.ctx.store),
            Arc::clone(&self.ctx.host),
            broker.clone(),
            &service.plugin,
            &service.config_file,
        );
        let scheduler = Scheduler::new(
            Arc::clone(&self.ctx.store),
            broker,
            &service.plugin,
            service.schedule_interval(),
        );

        let mut stages = JoinSet::new();
        for worker in workers {
            stages.spawn(worker.run());
        }
        stages.spawn(fan_out.run());
        stages.spawn(scheduler.run());
        info!(plugin = %service.plugin, dry_run = self.config.dry_run(), "Service started");

        let signal = tokio::select! {
            signal = tokio::signal::ctrl_c() => signal,
            Some(stopped) = stages.join_next() => {
                if let Err(e) = stopped {
                    error!(error = %e, "Stage panicked");
                }
                warn!("A stage stopped unexpectedly, shutting down");
                Ok(())
            }
        };

        info!("Shutting down");
        stages.abort_all();
        while stages.join_next().await.is_some() {}

        signal.map_err(RunnerError::Signal)
    }
}

fn absolute(path: &Path) -> Result<PathBuf, RunnerError> {
    std::path::absolute(path).map_err(|source| RunnerError::Path {
        path: path.display().to_string(),
        source,
    })
}
