//! Per-language checker and publication settings.

use crate::manifest::Language;
use serde::Deserialize;
use std::time::Duration;

/// Default mount point of the build cache inside checker containers.
pub const DEFAULT_MOUNT_DIR: &str = "/home/checker";

/// Default pull request body; `{{marker}}` expands to the marker block.
pub const DEFAULT_PR_BODY_FORMAT: &str =
    "This PR updates dependencies, which have not been covered by your versions so far:\n\n{{marker}}";

/// Resolved settings for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSettings {
    /// Checker container image.
    pub image: String,

    /// Directory the build cache is mounted at inside the container.
    pub mount_dir: String,

    /// Upper bound for a single checker run, in seconds. `None` waits forever.
    pub timeout_secs: Option<u64>,

    /// Handlebars format for pull request titles.
    pub pr_title_format: String,

    /// Handlebars format for pull request bodies.
    pub pr_body_format: String,

    /// Handlebars format for commit messages.
    pub commit_message_format: String,
}

impl LanguageSettings {
    /// Returns the built-in settings for `language`.
    pub fn builtin(language: Language) -> Self {
        let (image, title, commit) = match language {
            Language::Javascript => (
                "dep-check-js",
                "Update your JS dependencies",
                "update js dependencies",
            ),
            Language::Ruby => (
                "dep-check-rb",
                "Update your RB dependencies",
                "update rb dependencies",
            ),
        };

        Self {
            image: image.to_string(),
            mount_dir: DEFAULT_MOUNT_DIR.to_string(),
            timeout_secs: None,
            pr_title_format: title.to_string(),
            pr_body_format: DEFAULT_PR_BODY_FORMAT.to_string(),
            commit_message_format: commit.to_string(),
        }
    }

    /// Returns the checker timeout, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub(crate) fn apply(&mut self, overrides: LanguageOverrides) {
        let LanguageOverrides {
            image,
            mount_dir,
            timeout_secs,
            pr_title_format,
            pr_body_format,
            commit_message_format,
        } = overrides;

        if let Some(image) = image {
            self.image = image;
        }
        if let Some(mount_dir) = mount_dir {
            self.mount_dir = mount_dir;
        }
        if timeout_secs.is_some() {
            self.timeout_secs = timeout_secs;
        }
        if let Some(format) = pr_title_format {
            self.pr_title_format = format;
        }
        if let Some(format) = pr_body_format {
            self.pr_body_format = format;
        }
        if let Some(format) = commit_message_format {
            self.commit_message_format = format;
        }
    }
}

/// A `[languages.<name>]` table; every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub(crate) struct LanguageOverrides {
    image: Option<String>,
    mount_dir: Option<String>,
    timeout_secs: Option<u64>,
    pr_title_format: Option<String>,
    pr_body_format: Option<String>,
    commit_message_format: Option<String>,
}
