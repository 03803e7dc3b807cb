//! Runner error types.

/// Errors that stop a run as a whole.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration loading errors.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// The repository store cannot be read.
    #[error(transparent)]
    Repository(#[from] crate::repository::RepositoryError),

    /// A configured directory cannot be made absolute.
    #[error("Failed to resolve '{path}': {source}")]
    Path {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Waiting for the shutdown signal failed.
    #[error("Failed to listen for shutdown signal: {0}")]
    Signal(#[source] std::io::Error),
}
