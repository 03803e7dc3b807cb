//! Docker-backed checker.

use super::{CheckRequest, Checker, CheckerError, CheckerExit};
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::process::Command;
use tracing::{debug, info, warn};

static CONTAINER_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Runs checker images with `docker run --rm`.
#[derive(Debug, Clone)]
pub struct DockerChecker {
    program: String,
}

impl Default for DockerChecker {
    fn default() -> Self {
        Self::new("docker")
    }
}

impl DockerChecker {
    /// Creates a checker using the given container CLI (`docker`, `podman`).
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments of `docker run` for `request`, using container `name`.
    pub fn run_args(request: &CheckRequest, name: &str) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "--rm".to_string(),
            "--name".to_string(),
            name.to_string(),
        ];

        for mount in &request.mounts {
            args.push("-v".to_string());
            args.push(mount.volume_arg());
        }

        let trailing = match request.entrypoint.as_deref() {
            Some([entrypoint, rest @ ..]) => {
                args.push("--entrypoint".to_string());
                args.push(entrypoint.clone());
                rest
            }
            _ => &[],
        };

        args.push(request.image.clone());
        args.extend(trailing.iter().cloned());
        args
    }

    async fn remove_container(&self, name: &str) {
        let result = Command::new(&self.program)
            .args(["rm", "-f", name])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        if let Err(e) = result {
            warn!(container = name, error = %e, "Failed to remove checker container");
        }
    }
}

#[async_trait]
impl Checker for DockerChecker {
    async fn run(&self, request: &CheckRequest) -> Result<CheckerExit, CheckerError> {
        let name = format!(
            "greenkeepr-{}-{}",
            std::process::id(),
            CONTAINER_SEQUENCE.fetch_add(1, Ordering::Relaxed)
        );
        let args = Self::run_args(request, &name);
        debug!(image = %request.image, container = %name, "Starting checker");

        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match request.timeout {
            Some(limit) => match tokio::time::timeout(limit, command.output()).await {
                Ok(output) => output,
                Err(_) => {
                    self.remove_container(&name).await;
                    return Err(CheckerError::Timeout {
                        image: request.image.clone(),
                        timeout_secs: limit.as_secs(),
                    });
                }
            },
            None => command.output().await,
        };

        let output = match output {
            Ok(output) => output,
            Err(source) => {
                self.remove_container(&name).await;
                return Err(CheckerError::Spawn {
                    image: request.image.clone(),
                    source,
                });
            }
        };

        let code = output.status.code();
        if output.status.success() {
            debug!(image = %request.image, "Checker finished");
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            info!(
                image = %request.image,
                exit_code = ?code,
                stderr = %stderr.trim(),
                "Checker exited with non-zero status"
            );
        }

        Ok(CheckerExit { code })
    }
}
