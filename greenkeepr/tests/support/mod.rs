//! In-memory collaborators for pipeline tests.

#![allow(dead_code)]

use async_trait::async_trait;
use greenkeepr::{
    BuildCache, CheckRequest, Checker, CheckerError, CheckerExit, CodeHost, CreatedPullRequest,
    FileRepositoryStore, GitError, HostError, NewPullRequest, OpenPullRequest, PipelineContext,
    Repository, ServiceConfig, SourceControl, TemplateRenderer,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

pub fn fixture(path: &str) -> String {
    std::fs::read_to_string(fixtures_root().join(path)).unwrap()
}

/// Repository with the `greenkeep` plugin enabled.
pub fn repository(id: &str) -> Repository {
    Repository {
        id: id.to_string(),
        full_name: format!("acme/app-{id}"),
        access_token: "s3cret".to_string(),
        plugins: vec!["greenkeep".to_string()],
        git_url: format!("https://github.com/acme/app-{id}.git"),
        default_branch: "master".to_string(),
    }
}

/// A commit recorded by [`FakeSourceControl`].
#[derive(Debug, Clone)]
pub struct Commit {
    pub message: String,
    /// Staged path and its content at commit time.
    pub files: Vec<(String, String)>,
}

/// Working copy whose default branch always holds `files`.
#[derive(Default)]
pub struct FakeSourceControl {
    files: Mutex<BTreeMap<String, String>>,
    pub events: Mutex<Vec<String>>,
    pub commits: Mutex<Vec<Commit>>,
}

impl FakeSourceControl {
    pub fn with_files(files: &[(&str, String)]) -> Self {
        let fake = Self::default();
        for (path, content) in files {
            fake.set_file(path, content);
        }
        fake
    }

    pub fn set_file(&self, path: &str, content: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn commits(&self) -> Vec<Commit> {
        self.commits.lock().unwrap().clone()
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl SourceControl for FakeSourceControl {
    async fn sync(&self, _repository: &Repository, checkout: &Path) -> Result<(), GitError> {
        if checkout.exists() {
            std::fs::remove_dir_all(checkout).unwrap();
        }
        for (path, content) in self.files.lock().unwrap().iter() {
            let file = checkout.join(path);
            std::fs::create_dir_all(file.parent().unwrap()).unwrap();
            std::fs::write(file, content).unwrap();
        }
        std::fs::create_dir_all(checkout).unwrap();

        self.record("sync".to_string());
        Ok(())
    }

    async fn create_branch(&self, _checkout: &Path, branch: &str) -> Result<(), GitError> {
        self.record(format!("branch {branch}"));
        Ok(())
    }

    async fn stage_and_commit(&self, checkout: &Path, files: &[String], message: &str) -> Result<(), GitError> {
        let files = files
            .iter()
            .map(|file| {
                let content = std::fs::read_to_string(checkout.join(file)).unwrap();
                (file.clone(), content)
            })
            .collect();

        self.commits.lock().unwrap().push(Commit {
            message: message.to_string(),
            files,
        });
        self.record("commit".to_string());
        Ok(())
    }

    async fn force_push(&self, _repository: &Repository, _checkout: &Path, branch: &str) -> Result<(), GitError> {
        self.record(format!("push {branch}"));
        Ok(())
    }

    async fn restore_default_branch(&self, repository: &Repository, _checkout: &Path) -> Result<(), GitError> {
        self.record(format!("restore {}", repository.default_branch));
        Ok(())
    }
}

/// Code host serving one configuration file and keeping created pull
/// requests open.
#[derive(Default)]
pub struct FakeHost {
    config: Mutex<Option<String>>,
    pub open: Mutex<Vec<OpenPullRequest>>,
    pub created: Mutex<Vec<NewPullRequest>>,
    pub config_fetches: Mutex<usize>,
}

impl FakeHost {
    pub fn with_config(config: &str) -> Self {
        let host = Self::default();
        host.set_config(Some(config));
        host
    }

    pub fn set_config(&self, config: Option<&str>) {
        *self.config.lock().unwrap() = config.map(str::to_string);
    }

    pub fn created(&self) -> Vec<NewPullRequest> {
        self.created.lock().unwrap().clone()
    }

    pub fn config_fetches(&self) -> usize {
        *self.config_fetches.lock().unwrap()
    }
}

#[async_trait]
impl CodeHost for FakeHost {
    async fn open_pull_requests(&self, _repository: &Repository) -> Result<Vec<OpenPullRequest>, HostError> {
        Ok(self.open.lock().unwrap().clone())
    }

    async fn create_pull_request(
        &self,
        repository: &Repository,
        pull_request: &NewPullRequest,
    ) -> Result<CreatedPullRequest, HostError> {
        let mut open = self.open.lock().unwrap();
        let number = open.len() as u64 + 1;
        open.push(OpenPullRequest {
            number,
            title: pull_request.title.clone(),
            body: pull_request.body.clone(),
        });
        self.created.lock().unwrap().push(pull_request.clone());

        Ok(CreatedPullRequest {
            number,
            url: format!("https://github.com/{}/pull/{number}", repository.full_name),
        })
    }

    async fn fetch_file(
        &self,
        _repository: &Repository,
        path: &str,
        _reference: Option<&str>,
    ) -> Result<Option<String>, HostError> {
        if path != ".sisyphus" {
            return Ok(None);
        }
        *self.config_fetches.lock().unwrap() += 1;
        Ok(self.config.lock().unwrap().clone())
    }
}

/// Checker writing a canned report and lockfile.
#[derive(Default)]
pub struct FakeChecker {
    report: Mutex<Option<String>>,
    lockfile: Mutex<Option<String>>,
    pub requests: Mutex<Vec<CheckRequest>>,
}

impl FakeChecker {
    pub fn with_report(report: &str) -> Self {
        let checker = Self::default();
        *checker.report.lock().unwrap() = Some(report.to_string());
        checker
    }

    pub fn set_lockfile(&self, content: &str) {
        *self.lockfile.lock().unwrap() = Some(content.to_string());
    }

    pub fn requests(&self) -> Vec<CheckRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Checker for FakeChecker {
    async fn run(&self, request: &CheckRequest) -> Result<CheckerExit, CheckerError> {
        self.requests.lock().unwrap().push(request.clone());

        if request.entrypoint.is_none() {
            let report = request.mounts.iter().rfind(|mount| !mount.read_only).unwrap();
            if let Some(content) = self.report.lock().unwrap().as_deref() {
                std::fs::write(&report.host, content).unwrap();
            }
        } else if let Some(content) = self.lockfile.lock().unwrap().as_deref() {
            let lockfile = request
                .mounts
                .iter()
                .find(|mount| mount.container.ends_with(".lock"))
                .unwrap();
            std::fs::write(&lockfile.host, content).unwrap();
        }

        Ok(CheckerExit { code: Some(1) })
    }
}

/// A pipeline context over the fakes, rooted in a temporary directory.
pub struct Harness {
    pub temp: TempDir,
    pub host: Arc<FakeHost>,
    pub source_control: Arc<FakeSourceControl>,
    pub checker: Arc<FakeChecker>,
    pub ctx: PipelineContext,
}

impl Harness {
    pub fn new(host: FakeHost, source_control: FakeSourceControl, checker: FakeChecker) -> Self {
        let temp = TempDir::new().unwrap();
        let data = temp.path().join("repositories");
        std::fs::create_dir_all(&data).unwrap();

        let host = Arc::new(host);
        let source_control = Arc::new(source_control);
        let checker = Arc::new(checker);

        let ctx = PipelineContext {
            store: Arc::new(FileRepositoryStore::new(&data)),
            host: host.clone(),
            source_control: source_control.clone(),
            checker: checker.clone(),
            build_cache: BuildCache::new(temp.path().join("cache")),
            languages: Arc::new(ServiceConfig::default().languages),
            checkout_root: temp.path().join("checkouts"),
            renderer: Arc::new(TemplateRenderer::new()),
            dry_run: false,
        };

        Self {
            temp,
            host,
            source_control,
            checker,
            ctx,
        }
    }

    pub fn data_path(&self) -> PathBuf {
        self.temp.path().join("repositories")
    }

    /// Stores `repository` and returns it.
    pub fn store(&self, repository: Repository) -> Repository {
        let path = self.data_path().join(format!("{}.json", repository.id));
        std::fs::write(path, serde_json::to_string(&repository).unwrap()).unwrap();
        repository
    }
}
