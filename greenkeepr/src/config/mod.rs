//! Service configuration loading.
//!
//! The service reads a single TOML file with kebab-case keys. Every key is
//! optional; `[languages.<name>]` tables are merged onto the built-in settings
//! of that language.
//!
//! ```toml
//! data-path = "/var/lib/greenkeepr/repositories"
//! concurrency = 8
//!
//! [languages.ruby]
//! image = "registry.local/dep-check-rb"
//! timeout-secs = 900
//! ```

mod error;
mod language;

pub use error::ConfigError;
pub use language::{LanguageSettings, DEFAULT_MOUNT_DIR, DEFAULT_PR_BODY_FORMAT};

use crate::manifest::Language;
use crate::repository::{DEFAULT_CONFIG_FILE, DEFAULT_PLUGIN};
use language::LanguageOverrides;
use serde::{de, Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Service-wide configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Directory of stored repositories (`<ID>.json`).
    pub data_path: PathBuf,

    /// Base directory of the build cache.
    pub cache_dir: PathBuf,

    /// Base directory of repository working copies.
    pub checkout_dir: PathBuf,

    /// Seconds between two scheduler ticks.
    pub schedule_interval_secs: u64,

    /// Concurrent module jobs per worker stage (and in one-shot runs).
    pub concurrency: usize,

    /// Capacity of each subscriber queue on the broker.
    pub queue_capacity: usize,

    /// Plugin name; also the name of the scheduler topic.
    pub plugin: String,

    /// Path of the repository configuration file.
    pub config_file: String,

    /// Author and committer name of update commits.
    pub committer_name: String,

    /// Author and committer email of update commits.
    pub committer_email: String,

    /// Settings per supported language.
    #[serde(deserialize_with = "merge_languages")]
    pub languages: BTreeMap<Language, LanguageSettings>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/repositories"),
            cache_dir: PathBuf::from("data/cache"),
            checkout_dir: PathBuf::from("data/checkouts"),
            schedule_interval_secs: 7200,
            concurrency: 4,
            queue_capacity: 64,
            plugin: DEFAULT_PLUGIN.to_string(),
            config_file: DEFAULT_CONFIG_FILE.to_string(),
            committer_name: "greenkeepr".to_string(),
            committer_email: "greenkeepr@users.noreply.github.com".to_string(),
            languages: builtin_languages(),
        }
    }
}

impl ServiceConfig {
    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is missing, unreadable, not valid
    /// TOML or fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "Loading service configuration");

        if !path.exists() {
            return Err(ConfigError::MissingFile {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlError {
            path: path.display().to_string(),
            source: e,
        })?;

        config.validate(path)?;
        Ok(config)
    }

    /// Validates value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first invalid key.
    pub fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |message: &str| ConfigError::ValidationError {
            path: path.display().to_string(),
            message: message.to_string(),
        };

        if self.concurrency == 0 {
            return Err(invalid("concurrency must be at least 1"));
        }
        if self.queue_capacity == 0 {
            return Err(invalid("queue-capacity must be at least 1"));
        }
        if self.schedule_interval_secs == 0 {
            return Err(invalid("schedule-interval-secs must be at least 1"));
        }
        if self.plugin.trim().is_empty() {
            return Err(invalid("plugin cannot be empty"));
        }
        if self.config_file.trim().is_empty() {
            return Err(invalid("config-file cannot be empty"));
        }

        for (language, settings) in &self.languages {
            if settings.image.trim().is_empty() {
                return Err(invalid(&format!("languages.{language}.image cannot be empty")));
            }
            if settings.timeout_secs == Some(0) {
                return Err(invalid(&format!(
                    "languages.{language}.timeout-secs must be at least 1"
                )));
            }
        }

        Ok(())
    }

    /// Returns the scheduler interval.
    #[must_use]
    pub fn schedule_interval(&self) -> Duration {
        Duration::from_secs(self.schedule_interval_secs)
    }
}

fn builtin_languages() -> BTreeMap<Language, LanguageSettings> {
    Language::ALL
        .iter()
        .map(|&language| (language, LanguageSettings::builtin(language)))
        .collect()
}

fn merge_languages<'de, D>(deserializer: D) -> Result<BTreeMap<Language, LanguageSettings>, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = BTreeMap::<String, LanguageOverrides>::deserialize(deserializer)?;
    let mut languages = builtin_languages();

    for (name, table) in overrides {
        let language: Language = name.parse().map_err(de::Error::custom)?;
        if let Some(settings) = languages.get_mut(&language) {
            settings.apply(table);
        }
    }

    Ok(languages)
}
