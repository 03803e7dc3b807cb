//! The per-module update job.
//!
//! One job moves a single `(repository, module)` pair through
//! sync → build cache → checker → report → patch → dedup gate → publish,
//! stopping early as soon as there is nothing to propose.

mod error;

pub use error::UpdateError;

use crate::build_cache::{BuildCache, BuildCacheError};
use crate::checker::{read_report, CheckRequest, Checker};
use crate::config::LanguageSettings;
use crate::dedup::DeduplicationGate;
use crate::host::CodeHost;
use crate::manifest::{handler_for, Language, ManifestHandler};
use crate::publisher::{PatchedFile, PublishRequest, PublishedUpdate, Publisher};
use crate::repository::{ModuleConfig, Repository, RepositoryStore};
use crate::source_control::SourceControl;
use crate::templates::TemplateRenderer;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, info_span, warn, Instrument};

/// Collaborators shared by every stage. Created once at start-up.
#[derive(Clone)]
pub struct PipelineContext {
    pub store: Arc<dyn RepositoryStore>,
    pub host: Arc<dyn CodeHost>,
    pub source_control: Arc<dyn SourceControl>,
    pub checker: Arc<dyn Checker>,
    pub build_cache: BuildCache,
    pub languages: Arc<BTreeMap<Language, LanguageSettings>>,
    pub checkout_root: PathBuf,
    pub renderer: Arc<TemplateRenderer>,
    /// Stop every job before publication.
    pub dry_run: bool,
}

/// How a module job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleOutcome {
    /// The checker reported no changed dependency.
    UpToDate,

    /// Changed dependencies were reported but none is declared in the manifest.
    NothingPatched { dependencies: Vec<String> },

    /// An open pull request already proposes these dependencies.
    AlreadyProposed { dependencies: Vec<String> },

    /// Patched, but publication was skipped.
    DryRun { dependencies: Vec<String> },

    /// A pull request was opened.
    Published(PublishedUpdate),
}

impl ModuleOutcome {
    /// Short label for logs and summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleOutcome::UpToDate => "up to date",
            ModuleOutcome::NothingPatched { .. } => "nothing patched",
            ModuleOutcome::AlreadyProposed { .. } => "already proposed",
            ModuleOutcome::DryRun { .. } => "dry run",
            ModuleOutcome::Published(_) => "published",
        }
    }
}

/// Runs module jobs against a [`PipelineContext`].
#[derive(Clone)]
pub struct UpdatePipeline {
    ctx: PipelineContext,
    gate: DeduplicationGate,
    publisher: Publisher,
    checkouts: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

impl UpdatePipeline {
    /// Creates a pipeline.
    pub fn new(ctx: PipelineContext) -> Self {
        let gate = DeduplicationGate::new(Arc::clone(&ctx.host));
        let publisher = Publisher::new(
            Arc::clone(&ctx.source_control),
            Arc::clone(&ctx.host),
            Arc::clone(&ctx.renderer),
            ctx.checkout_root.clone(),
        );

        Self {
            ctx,
            gate,
            publisher,
            checkouts: Arc::default(),
        }
    }

    /// Returns the shared context.
    pub fn context(&self) -> &PipelineContext {
        &self.ctx
    }

    /// Runs the update job of one module.
    ///
    /// Jobs of the same repository share a working copy and run one at a time.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError`] for the step that failed; nothing is retried.
    pub async fn run(&self, repository: &Repository, module: &ModuleConfig) -> Result<ModuleOutcome, UpdateError> {
        let span = info_span!(
            "module",
            repo = %repository.full_name,
            language = %module.language,
            path = %module.path
        );

        let checkout = self.checkout_lock(&repository.id);
        let _guard = checkout.lock().await;
        self.run_module(repository, module).instrument(span).await
    }

    fn checkout_lock(&self, repository_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut checkouts = self.checkouts.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(checkouts.entry(repository_id.to_string()).or_default())
    }

    async fn run_module(&self, repository: &Repository, module: &ModuleConfig) -> Result<ModuleOutcome, UpdateError> {
        let language: Language = module.language.parse()?;
        let settings = self
            .ctx
            .languages
            .get(&language)
            .ok_or_else(|| UpdateError::UnsupportedLanguage {
                language: module.language.clone(),
            })?;
        let handler = handler_for(language);
        let files = handler.locate(module);

        let checkout = self.publisher.checkout_path(repository);
        self.ctx.source_control.sync(repository, &checkout).await?;

        let cache = self.ctx.build_cache.prepare(&repository.id, module).await?;
        self.ctx.build_cache.extract(&checkout, &files, &cache).await?;
        let report_path = self
            .ctx
            .build_cache
            .reset_report(&cache, handler.report_file())
            .await?;

        let exit = self
            .ctx
            .checker
            .run(&CheckRequest::check(settings, handler, &cache))
            .await?;
        debug!(exit_code = ?exit.code, "Checker finished");

        let Some(raw) = read_report(&report_path).await? else {
            info!("No report, dependencies are up to date");
            return Ok(ModuleOutcome::UpToDate);
        };

        let report = handler.parse_report(&raw)?;
        let changed = report.changed_names();
        if changed.is_empty() {
            info!("Dependencies are up to date");
            return Ok(ModuleOutcome::UpToDate);
        }
        info!(changed = ?changed, "Found outdated dependencies");

        let manifest_path = cache.join(handler.manifest_file());
        let manifest = read_cached(&manifest_path).await?;
        let patched = handler.patch(&manifest, &report)?;

        if !patched.unpatched.is_empty() {
            warn!(
                dependencies = ?patched.unpatched,
                "Outdated dependencies have no declaration in the manifest"
            );
        }
        if patched.is_unchanged() {
            return Ok(ModuleOutcome::NothingPatched { dependencies: changed });
        }

        let patched_path = cache.join(format!("{}.new", handler.manifest_file()));
        tokio::fs::write(&patched_path, &patched.content)
            .await
            .map_err(|source| cache_io(&patched_path, source))?;

        let dependencies = patched.patched;
        if self
            .gate
            .has_open_update(repository, module, &dependencies)
            .await?
        {
            info!("An open pull request already covers these dependencies");
            return Ok(ModuleOutcome::AlreadyProposed { dependencies });
        }

        if self.ctx.dry_run {
            info!(dependencies = ?dependencies, "Dry run, skipping publication");
            return Ok(ModuleOutcome::DryRun { dependencies });
        }

        let mut files = vec![PatchedFile {
            source: patched_path,
            destination: module.relative_file(handler.manifest_file()),
        }];
        files.extend(self.regenerate_lockfile(module, settings, handler, &cache).await?);

        let published = self
            .publisher
            .publish(&PublishRequest {
                repository,
                module,
                settings,
                files,
                dependencies,
            })
            .await?;

        Ok(ModuleOutcome::Published(published))
    }

    /// Runs the lockfile command of languages that have one.
    async fn regenerate_lockfile(
        &self,
        module: &ModuleConfig,
        settings: &LanguageSettings,
        handler: &dyn ManifestHandler,
        cache: &Path,
    ) -> Result<Option<PatchedFile>, UpdateError> {
        let (Some(lockfile), Some(request)) = (
            handler.lockfile(),
            CheckRequest::regenerate_lockfile(settings, handler, cache),
        ) else {
            return Ok(None);
        };

        debug!(lockfile, "Regenerating lockfile");
        let exit = self.ctx.checker.run(&request).await?;
        debug!(exit_code = ?exit.code, "Lockfile regeneration finished");

        Ok(Some(PatchedFile {
            source: cache.join(lockfile),
            destination: module.relative_file(lockfile),
        }))
    }
}

async fn read_cached(path: &Path) -> Result<String, UpdateError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| cache_io(path, source))
}

fn cache_io(path: &Path, source: std::io::Error) -> UpdateError {
    UpdateError::BuildCache(BuildCacheError::Io {
        path: path.display().to_string(),
        source,
    })
}
