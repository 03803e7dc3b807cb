//! Machine-readable pull request markers.
//!
//! Every update pull request carries a fenced block naming the module and the
//! dependencies it updates:
//!
//! ````text
//! ```
//! # ruby dependencies in api
//! [
//! 	"puma",
//! 	"rails"
//! ]
//! ```
//! ````
//!
//! The same constants render and parse the block, so an open pull request can
//! be matched against a new update without substring heuristics.

use crate::repository::ModuleConfig;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

const FENCE: &str = "```";
const TAG_PREFIX: &str = "# ";
const TAG_INFIX: &str = " dependencies in ";

/// Module and dependencies of one update pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestMarker {
    /// Language name as configured.
    pub language: String,

    /// Module path as configured.
    pub path: String,

    /// Updated dependency names.
    pub dependencies: Vec<String>,
}

impl PullRequestMarker {
    /// Creates the marker of an update to `module`.
    pub fn for_module(module: &ModuleConfig, dependencies: Vec<String>) -> Self {
        Self {
            language: module.language.clone(),
            path: module.path.clone(),
            dependencies,
        }
    }

    /// `# <language> dependencies in <path>`.
    pub fn tag(&self) -> String {
        format!("{TAG_PREFIX}{}{TAG_INFIX}{}", self.language, self.path)
    }

    /// Renders the fenced block, names as a tab-indented JSON array.
    ///
    /// # Errors
    ///
    /// Returns the encoding error of the name list.
    pub fn render(&self) -> Result<String, serde_json::Error> {
        let mut names = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut names, PrettyFormatter::with_indent(b"\t"));
        self.dependencies.serialize(&mut serializer)?;
        let names = String::from_utf8_lossy(&names);

        Ok(format!("{FENCE}\n{}\n{names}\n{FENCE}", self.tag()))
    }

    /// Parses every well-formed marker block in a pull request body.
    ///
    /// Blocks without a tag line or with an invalid name list are skipped.
    pub fn parse_all(body: &str) -> Vec<Self> {
        let mut markers = Vec::new();
        // Only indentation is dropped; the tag keeps the path byte for byte.
        let mut lines = body.lines().map(str::trim_start).peekable();

        while let Some(line) = lines.next() {
            if !is_fence(line) {
                continue;
            }

            // A fence without a tag may close an unrelated block.
            let Some((language, path)) = lines.peek().copied().and_then(parse_tag) else {
                continue;
            };
            lines.next();

            let mut json = String::new();
            let mut closed = false;
            for line in lines.by_ref() {
                if is_fence(line) {
                    closed = true;
                    break;
                }
                json.push_str(line);
                json.push('\n');
            }

            if !closed {
                break;
            }

            if let Ok(dependencies) = serde_json::from_str::<Vec<String>>(&json) {
                markers.push(Self {
                    language: language.to_string(),
                    path: path.to_string(),
                    dependencies,
                });
            }
        }

        markers
    }

    /// Returns true if this marker belongs to `module`.
    #[must_use]
    pub fn is_for(&self, module: &ModuleConfig) -> bool {
        self.language == module.language && self.path == module.path
    }

    /// Returns true if any name appears in this marker, compared exactly.
    #[must_use]
    pub fn overlaps<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names
            .iter()
            .any(|name| self.dependencies.iter().any(|d| d == name.as_ref()))
    }
}

fn is_fence(line: &str) -> bool {
    line.trim_end() == FENCE
}

fn parse_tag(line: &str) -> Option<(&str, &str)> {
    let tag = line.strip_prefix(TAG_PREFIX)?;
    let (language, path) = tag.split_once(TAG_INFIX)?;
    (!language.is_empty()).then_some((language, path))
}
