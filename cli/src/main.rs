//! CLI for greenkeepr.
//!
//! Checks the dependencies of every enabled repository inside containers and
//! opens one pull request per module with the outdated dependencies updated.

use clap::Parser;
use greenkeepr::{RunSummary, Runner, RunnerConfig, RunnerError, ServiceConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// greenkeepr - Open pull requests for outdated dependencies.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the service configuration file.
    #[arg(long, env = "GREENKEEPR_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding one JSON file per repository.
    #[arg(long, env = "GREENKEEPR_DATA_PATH")]
    data_path: Option<PathBuf>,

    /// Maximum concurrent module jobs.
    #[arg(long)]
    concurrency: Option<usize>,

    /// Check and patch, but do not push branches or open pull requests.
    #[arg(long)]
    dry_run: bool,

    /// Check every repository once and exit instead of running as a service.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // octocrab talks TLS through rustls; pin its provider before any client exists
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    init_tracing();
    let args = Args::parse();

    if !args.once {
        return match serve(args).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!(error = %e, "Critical failure");
                ExitCode::from(2)
            }
        };
    }

    match run_once(args).await {
        Ok(summary) => {
            print_summary(&summary);

            if summary.has_failures() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with compact output, filtered by `RUST_LOG`
/// (defaults to "info").
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Builds the runner configuration from the file and the overrides.
fn runner_config(args: &Args) -> Result<RunnerConfig, RunnerError> {
    let mut config = match &args.config {
        Some(path) => RunnerConfig::from_file(path)?,
        None => RunnerConfig::new(ServiceConfig::default()),
    };

    if let Some(data_path) = &args.data_path {
        config = config.with_data_path(data_path.clone());
    }
    if let Some(concurrency) = args.concurrency {
        config = config.with_concurrency(concurrency);
    }
    Ok(config.with_dry_run(args.dry_run))
}

async fn run_once(args: Args) -> Result<RunSummary, RunnerError> {
    let runner = Runner::new(runner_config(&args)?)?;
    runner.run_once().await
}

async fn serve(args: Args) -> Result<(), RunnerError> {
    let runner = Runner::new(runner_config(&args)?)?;
    runner.serve().await
}

/// Prints the final run summary.
fn print_summary(summary: &RunSummary) {
    println!("\nSummary:");
    println!(
        "  Mode: {}",
        if summary.dry_run { "Dry Run" } else { "Live" }
    );
    println!("  Repositories scanned: {}", summary.repositories_scanned);
    println!("  Modules checked: {}", summary.modules_checked);
    println!("  Up to date: {}", summary.up_to_date);
    println!("  Nothing to patch: {}", summary.nothing_patched);
    println!("  Already proposed: {}", summary.already_proposed);

    if summary.dry_run {
        println!("  Would open pull requests: {}", summary.would_publish);
    } else {
        println!("  Pull requests created: {}", summary.pull_requests_created);
    }

    println!("  Skipped: {}", summary.skipped);
    println!("  Failed: {}", summary.failed);
}
