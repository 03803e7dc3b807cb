//! Checker error types.

use thiserror::Error;

/// Errors that can occur while running a checker.
#[derive(Debug, Error)]
pub enum CheckerError {
    /// The container runtime could not be started.
    #[error("Failed to start checker '{image}': {source}")]
    Spawn {
        image: String,
        #[source]
        source: std::io::Error,
    },

    /// The checker did not finish in time.
    #[error("Checker '{image}' timed out after {timeout_secs} seconds")]
    Timeout { image: String, timeout_secs: u64 },

    /// The report file exists but cannot be read.
    #[error("Failed to read report '{path}': {source}")]
    ReadReport {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
