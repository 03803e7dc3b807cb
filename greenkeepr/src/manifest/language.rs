//! Supported manifest languages.

use super::ManifestError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A language with a manifest handler and a checker image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// `package.json`, checked with `npm outdated --json`.
    Javascript,
    /// `Gemfile` + `Gemfile.lock`, checked with `bundle outdated`.
    Ruby,
}

impl Language {
    /// Every supported language.
    pub const ALL: [Language; 2] = [Language::Javascript, Language::Ruby];

    /// Returns the name used in configuration, topics and markers.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Javascript => "javascript",
            Language::Ruby => "ruby",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|language| language.as_str() == s)
            .ok_or_else(|| ManifestError::UnsupportedLanguage {
                language: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_configured_names() {
        assert_eq!("javascript".parse::<Language>().unwrap(), Language::Javascript);
        assert_eq!("ruby".parse::<Language>().unwrap(), Language::Ruby);
    }

    #[test]
    fn unknown_names_are_unsupported() {
        for name in ["go", "Ruby", ""] {
            assert!(matches!(
                name.parse::<Language>(),
                Err(ManifestError::UnsupportedLanguage { .. })
            ));
        }
    }
}
