//! Repositories known to the pipeline and their per-plugin module configuration.
//!
//! Repositories are owned by the persistence backend; the pipeline only reads
//! them through [`RepositoryStore`].

mod config;
mod error;
mod model;
mod store;

pub use config::{RepositoryConfig, DEFAULT_CONFIG_FILE, DEFAULT_PLUGIN};
pub use error::RepositoryError;
pub use model::{ModuleConfig, Repository};
pub use store::{FileRepositoryStore, RepositoryStore};
