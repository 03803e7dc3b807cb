//! Checker invocations.

use crate::config::LanguageSettings;
use crate::manifest::ManifestHandler;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A bind mount of a build cache file into the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    /// File on the host.
    pub host: PathBuf,

    /// Path inside the container.
    pub container: String,

    /// Whether the container may only read the file.
    pub read_only: bool,
}

impl Mount {
    /// Creates a read-only mount.
    pub fn read_only(host: impl Into<PathBuf>, container: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            container: container.into(),
            read_only: true,
        }
    }

    /// Creates a read-write mount.
    pub fn read_write(host: impl Into<PathBuf>, container: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            container: container.into(),
            read_only: false,
        }
    }

    /// `<host>:<container>:ro|rw`, as passed to `docker run -v`.
    pub fn volume_arg(&self) -> String {
        let mode = if self.read_only { "ro" } else { "rw" };
        format!("{}:{}:{mode}", self.host.display(), self.container)
    }
}

/// One run of a checker image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRequest {
    /// Container image.
    pub image: String,

    /// Bind mounts.
    pub mounts: Vec<Mount>,

    /// Entrypoint override; the first element replaces the image entrypoint,
    /// the rest are passed as arguments.
    pub entrypoint: Option<Vec<String>>,

    /// Upper bound for the run.
    pub timeout: Option<Duration>,
}

impl CheckRequest {
    /// Outdated check: manifests read-only, report read-write.
    pub fn check(settings: &LanguageSettings, handler: &dyn ManifestHandler, cache: &Path) -> Self {
        let mut mounts: Vec<Mount> = handler
            .files()
            .iter()
            .map(|file| Mount::read_only(cache.join(file), container_path(settings, file)))
            .collect();

        let report = handler.report_file();
        mounts.push(Mount::read_write(cache.join(report), container_path(settings, report)));

        Self {
            image: settings.image.clone(),
            mounts,
            entrypoint: None,
            timeout: settings.timeout(),
        }
    }

    /// Lockfile regeneration against the patched manifest, if the language
    /// has a lockfile.
    pub fn regenerate_lockfile(
        settings: &LanguageSettings,
        handler: &dyn ManifestHandler,
        cache: &Path,
    ) -> Option<Self> {
        let lockfile = handler.lockfile()?;
        let command = handler.lockfile_command()?;
        let manifest = handler.manifest_file();

        Some(Self {
            image: settings.image.clone(),
            mounts: vec![
                Mount::read_write(
                    cache.join(format!("{manifest}.new")),
                    container_path(settings, manifest),
                ),
                Mount::read_write(cache.join(lockfile), container_path(settings, lockfile)),
            ],
            entrypoint: Some(command.iter().map(|arg| arg.to_string()).collect()),
            timeout: settings.timeout(),
        })
    }
}

fn container_path(settings: &LanguageSettings, file: &str) -> String {
    format!("{}/{file}", settings.mount_dir.trim_end_matches('/'))
}
