//! Repository and module configuration types.

use super::RepositoryError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A repository with at least one plugin toggled on.
///
/// Field names follow the stored JSON layout (`ID`, `FullName`, `GitURL`, ...).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Repository {
    /// Stable identifier, also used as a directory name.
    #[serde(rename = "ID")]
    pub id: String,

    /// Full repository name in "owner/name" format.
    pub full_name: String,

    /// Token used for API calls, clones and pushes.
    pub access_token: String,

    /// Enabled plugin names.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub plugins: Vec<String>,

    /// Remote URL to clone from.
    #[serde(rename = "GitURL")]
    pub git_url: String,

    /// Branch updates are proposed against.
    #[serde(default = "default_branch")]
    pub default_branch: String,
}

fn default_branch() -> String {
    "master".to_string()
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Repository {
    /// Splits the full name into owner and repository name.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::InvalidFullName`] unless the name has exactly
    /// one `/` with non-empty parts on both sides.
    pub fn split_full_name(&self) -> Result<(&str, &str), RepositoryError> {
        match self.full_name.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok((owner, name))
            }
            _ => Err(RepositoryError::InvalidFullName {
                full_name: self.full_name.clone(),
            }),
        }
    }

    /// Returns true if the plugin is toggled on for this repository.
    #[must_use]
    pub fn has_plugin(&self, plugin: &str) -> bool {
        self.plugins.iter().any(|p| p == plugin)
    }
}

// Keeps the access token out of logs.
impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("id", &self.id)
            .field("full_name", &self.full_name)
            .field("access_token", &"<redacted>")
            .field("plugins", &self.plugins)
            .field("git_url", &self.git_url)
            .field("default_branch", &self.default_branch)
            .finish()
    }
}

/// One manifest location inside a repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModuleConfig {
    /// Directory of the manifest, relative to the repository root.
    pub path: String,

    /// Language name selecting the manifest handler, e.g. "javascript".
    pub language: String,
}

impl ModuleConfig {
    /// Creates a module configuration.
    pub fn new(path: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            language: language.into(),
        }
    }

    /// Returns the repository-relative path of `file` inside this module.
    ///
    /// An empty path, `.` or `/` refers to the repository root.
    #[must_use]
    pub fn relative_file(&self, file: &str) -> String {
        let dir = self.path.trim_start_matches("./").trim_matches('/');
        if dir.is_empty() || dir == "." {
            file.to_string()
        } else {
            format!("{dir}/{file}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_repository(full_name: &str) -> Repository {
        Repository {
            id: "42".to_string(),
            full_name: full_name.to_string(),
            access_token: "secret".to_string(),
            plugins: vec!["greenkeep".to_string()],
            git_url: "https://github.com/acme/app.git".to_string(),
            default_branch: "master".to_string(),
        }
    }

    #[test]
    fn splits_full_name() {
        let repository = sample_repository("acme/app");
        assert_eq!(repository.split_full_name().unwrap(), ("acme", "app"));
    }

    #[test]
    fn rejects_malformed_full_names() {
        for name in ["acme", "acme/", "/app", "acme/app/extra"] {
            let repository = sample_repository(name);
            assert!(
                matches!(
                    repository.split_full_name(),
                    Err(RepositoryError::InvalidFullName { .. })
                ),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn deserializes_stored_layout() {
        let json = r#"{
            "ID": "1234",
            "FullName": "acme/app",
            "AccessToken": "token",
            "Plugins": null,
            "GitURL": "https://github.com/acme/app.git"
        }"#;

        let repository: Repository = serde_json::from_str(json).unwrap();

        assert_eq!(repository.id, "1234");
        assert!(repository.plugins.is_empty());
        assert_eq!(repository.default_branch, "master");
    }

    #[test]
    fn debug_output_hides_token() {
        let repository = sample_repository("acme/app");
        let debug = format!("{repository:?}");
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn resolves_relative_files() {
        assert_eq!(ModuleConfig::new(".", "ruby").relative_file("Gemfile"), "Gemfile");
        assert_eq!(ModuleConfig::new("", "ruby").relative_file("Gemfile"), "Gemfile");
        assert_eq!(
            ModuleConfig::new("./web/", "javascript").relative_file("package.json"),
            "web/package.json"
        );
        assert_eq!(
            ModuleConfig::new("services/api", "ruby").relative_file("Gemfile.lock"),
            "services/api/Gemfile.lock"
        );
    }
}
