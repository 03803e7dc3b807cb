#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod broker;
pub mod build_cache;
pub mod checker;
pub mod config;
pub mod dedup;
pub mod host;
pub mod manifest;
pub mod marker;
pub mod pipeline;
pub mod publisher;
pub mod report;
pub mod repository;
pub mod runner;
pub mod scheduler;
pub mod source_control;
pub mod summary;
pub mod templates;

pub use broker::{Broker, BrokerError, CheckRequested, RepositoryDue, RepositoryToggled};
pub use build_cache::{BuildCache, BuildCacheError, BuildCacheKey};
pub use checker::{CheckRequest, Checker, CheckerError, CheckerExit, DockerChecker, Mount};
pub use config::{ConfigError, LanguageSettings, ServiceConfig};
pub use dedup::DeduplicationGate;
pub use host::{CodeHost, CreatedPullRequest, GitHubHost, HostError, NewPullRequest, OpenPullRequest};
pub use manifest::{handler_for, locate, Language, ManifestError, ManifestHandler, PatchedManifest};
pub use marker::PullRequestMarker;
pub use pipeline::{ModuleOutcome, PipelineContext, UpdateError, UpdatePipeline};
pub use publisher::{PatchedFile, PublishError, PublishRequest, PublishedUpdate, Publisher};
pub use report::{parse_json, parse_log, OutdatedReport, ReportError, VersionInfo};
pub use repository::{
    FileRepositoryStore, ModuleConfig, Repository, RepositoryConfig, RepositoryError,
    RepositoryStore,
};
pub use runner::{Runner, RunnerConfig, RunnerError};
pub use scheduler::{CheckWorker, ConfigResolver, FanOut, Scheduler};
pub use source_control::{GitCli, GitError, SourceControl};
pub use summary::{ProcessingResult, RunSummary};
pub use templates::{generate_branch_name, TemplateError, TemplateRenderer, UpdateContext};
