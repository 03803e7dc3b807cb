//! Normalized checker reports.
//!
//! Both report variants parse into an [`OutdatedReport`]: dependency name to
//! [`VersionInfo`], ordered by name. A dependency counts as changed only when
//! its wanted and latest versions differ.

mod error;
mod json;
mod log;

pub use error::ReportError;
pub use json::parse_json;
pub use log::parse_log;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Versions of a single dependency as reported by the checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Version currently satisfied by the manifest.
    #[serde(rename = "Wanted", alias = "wanted")]
    pub wanted: String,

    /// Newest published version.
    #[serde(rename = "Latest", alias = "latest")]
    pub latest: String,
}

impl VersionInfo {
    /// Creates a version entry.
    pub fn new(wanted: impl Into<String>, latest: impl Into<String>) -> Self {
        Self {
            wanted: wanted.into(),
            latest: latest.into(),
        }
    }

    /// Returns true if the manifest needs a new version.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.wanted != self.latest
    }
}

/// Dependency name to versions, unique by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutdatedReport {
    entries: BTreeMap<String, VersionInfo>,
}

impl OutdatedReport {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an entry.
    pub fn insert(&mut self, name: impl Into<String>, version: VersionInfo) {
        self.entries.insert(name.into(), version);
    }

    /// Returns the entry for `name`.
    pub fn get(&self, name: &str) -> Option<&VersionInfo> {
        self.entries.get(name)
    }

    /// Number of reported dependencies, changed or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Changed entries ordered by name.
    pub fn changed(&self) -> impl Iterator<Item = (&str, &VersionInfo)> {
        self.entries
            .iter()
            .filter(|(_, version)| version.is_changed())
            .map(|(name, version)| (name.as_str(), version))
    }

    /// Names of the changed entries, ordered.
    pub fn changed_names(&self) -> Vec<String> {
        self.changed().map(|(name, _)| name.to_string()).collect()
    }
}

impl FromIterator<(String, VersionInfo)> for OutdatedReport {
    fn from_iter<I: IntoIterator<Item = (String, VersionInfo)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
