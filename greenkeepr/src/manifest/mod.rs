//! Manifest handling per language.
//!
//! A [`ManifestHandler`] knows which files make up a module's manifest, which
//! report its checker writes, how to parse that report and how to apply it to
//! the manifest. Handlers are selected with [`handler_for`].

mod error;
mod javascript;
mod language;
mod ruby;

pub use error::ManifestError;
pub use javascript::PackageJson;
pub use language::Language;
pub use ruby::Gemfile;

use crate::report::{OutdatedReport, ReportError};
use crate::repository::ModuleConfig;

/// Result of applying a report to a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchedManifest {
    /// Updated manifest content.
    pub content: String,

    /// Changed dependencies that were rewritten, in report order.
    pub patched: Vec<String>,

    /// Changed dependencies without a declaration in the manifest.
    pub unpatched: Vec<String>,
}

impl PatchedManifest {
    /// Returns true if no dependency was rewritten.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.patched.is_empty()
    }
}

/// Language-specific manifest operations.
pub trait ManifestHandler: Send + Sync {
    /// Language served by this handler.
    fn language(&self) -> Language;

    /// Files extracted into the build cache, manifest first.
    fn files(&self) -> &'static [&'static str];

    /// The file rewritten by [`ManifestHandler::patch`].
    fn manifest_file(&self) -> &'static str;

    /// Lockfile regenerated after patching, if the language has one.
    fn lockfile(&self) -> Option<&'static str> {
        None
    }

    /// Command run in the checker image to regenerate the lockfile.
    fn lockfile_command(&self) -> Option<&'static [&'static str]> {
        None
    }

    /// Report file the checker writes into the build cache.
    fn report_file(&self) -> &'static str;

    /// Parses the checker report.
    fn parse_report(&self, raw: &str) -> Result<OutdatedReport, ReportError>;

    /// Pins every changed dependency of `report` at its latest version.
    fn patch(&self, manifest: &str, report: &OutdatedReport) -> Result<PatchedManifest, ManifestError>;

    /// Returns the repository-relative paths of [`ManifestHandler::files`].
    fn locate(&self, module: &ModuleConfig) -> Vec<String> {
        self.files()
            .iter()
            .map(|file| module.relative_file(file))
            .collect()
    }
}

static PACKAGE_JSON: PackageJson = PackageJson;
static GEMFILE: Gemfile = Gemfile;

/// Returns the handler for `language`.
pub fn handler_for(language: Language) -> &'static dyn ManifestHandler {
    match language {
        Language::Javascript => &PACKAGE_JSON,
        Language::Ruby => &GEMFILE,
    }
}

/// Returns the ordered manifest files of `module`, relative to the repository.
///
/// # Errors
///
/// Returns [`ManifestError::UnsupportedLanguage`] for unknown languages.
pub fn locate(module: &ModuleConfig) -> Result<Vec<String>, ManifestError> {
    let language: Language = module.language.parse()?;
    Ok(handler_for(language).locate(module))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locates_javascript_manifest() {
        let module = ModuleConfig::new("frontend", "javascript");
        assert_eq!(locate(&module).unwrap(), ["frontend/package.json"]);
    }

    #[test]
    fn locates_ruby_manifest_and_lockfile_in_order() {
        let module = ModuleConfig::new(".", "ruby");
        assert_eq!(locate(&module).unwrap(), ["Gemfile", "Gemfile.lock"]);
    }

    #[test]
    fn locate_rejects_unknown_language() {
        let module = ModuleConfig::new(".", "elixir");
        assert!(matches!(
            locate(&module),
            Err(ManifestError::UnsupportedLanguage { language }) if language == "elixir"
        ));
    }

    #[test]
    fn handlers_match_their_language() {
        for language in Language::ALL {
            let handler = handler_for(language);
            assert_eq!(handler.language(), language);
            assert_eq!(handler.files()[0], handler.manifest_file());
        }
    }
}
