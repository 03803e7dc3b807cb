//! Messages exchanged between stages.

use crate::repository::ModuleConfig;
use serde::{Deserialize, Serialize};

/// Topic of repository toggle events.
pub const TOGGLE_TOPIC: &str = "toggle-repository";

/// Topic of check requests for one language, e.g. `greenkeep-ruby`.
pub fn check_topic(plugin: &str, language: &str) -> String {
    format!("{plugin}-{language}")
}

/// A repository is due for a scan. Published on the `<plugin>` topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RepositoryDue {
    #[serde(rename = "RepositoryID")]
    pub repository_id: String,
    pub plugin: String,
}

/// One module of a repository should be checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CheckRequested {
    pub config: ModuleConfig,
    #[serde(rename = "RepositoryID")]
    pub repository_id: String,
}

/// A plugin was toggled on a repository; its configuration may have changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RepositoryToggled {
    #[serde(rename = "RepositoryID")]
    pub repository_id: String,
}
