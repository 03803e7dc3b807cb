//! `package.json` manifests.

use super::{Language, ManifestError, ManifestHandler, PatchedManifest};
use crate::report::{parse_json, OutdatedReport, ReportError};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

/// Dependency groups that may declare a package.
const DEPENDENCY_GROUPS: [&str; 4] = [
    "dependencies",
    "devDependencies",
    "optionalDependencies",
    "peerDependencies",
];

const DEFAULT_INDENT: &str = "  ";

/// Handler for npm projects.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageJson;

impl ManifestHandler for PackageJson {
    fn language(&self) -> Language {
        Language::Javascript
    }

    fn files(&self) -> &'static [&'static str] {
        &["package.json"]
    }

    fn manifest_file(&self) -> &'static str {
        "package.json"
    }

    fn report_file(&self) -> &'static str {
        "outdated.json"
    }

    fn parse_report(&self, raw: &str) -> Result<OutdatedReport, ReportError> {
        parse_json(raw)
    }

    fn patch(&self, manifest: &str, report: &OutdatedReport) -> Result<PatchedManifest, ManifestError> {
        let mut document: Value = serde_json::from_str(manifest).map_err(ManifestError::Decode)?;
        let root = document.as_object_mut().ok_or(ManifestError::NotAnObject)?;

        let mut patched = Vec::new();
        let mut unpatched = Vec::new();

        for (name, version) in report.changed() {
            let mut declared = false;
            for group in DEPENDENCY_GROUPS {
                let Some(entries) = root.get_mut(group).and_then(Value::as_object_mut) else {
                    continue;
                };
                if let Some(entry) = entries.get_mut(name) {
                    *entry = Value::String(version.latest.clone());
                    declared = true;
                }
            }

            if declared {
                patched.push(name.to_string());
            } else {
                unpatched.push(name.to_string());
            }
        }

        if patched.is_empty() {
            return Ok(PatchedManifest {
                content: manifest.to_string(),
                patched,
                unpatched,
            });
        }

        let indent = detect_indent(manifest);
        let mut buffer = Vec::with_capacity(manifest.len());
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(indent.as_bytes()));
        document
            .serialize(&mut serializer)
            .map_err(|e| ManifestError::Encode(e.to_string()))?;

        let mut content = String::from_utf8(buffer).map_err(|e| ManifestError::Encode(e.to_string()))?;
        if manifest.ends_with('\n') {
            content.push('\n');
        }

        Ok(PatchedManifest {
            content,
            patched,
            unpatched,
        })
    }
}

/// Leading whitespace of the first indented line.
///
/// Only the indent unit survives re-encoding. Inline arrays and objects such
/// as `"files": ["dist"]` come back expanded one entry per line, so a patched
/// manifest may differ outside the updated entries.
fn detect_indent(manifest: &str) -> &str {
    manifest
        .lines()
        .skip(1)
        .find_map(|line| {
            let trimmed = line.trim_start_matches([' ', '\t']);
            let width = line.len() - trimmed.len();
            (width > 0 && !trimmed.is_empty()).then(|| &line[..width])
        })
        .unwrap_or(DEFAULT_INDENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::VersionInfo;

    fn report(entries: &[(&str, &str, &str)]) -> OutdatedReport {
        entries
            .iter()
            .map(|(name, wanted, latest)| (name.to_string(), VersionInfo::new(*wanted, *latest)))
            .collect()
    }

    #[test]
    fn pins_changed_dependency_at_latest() {
        let manifest = "{\n  \"name\": \"app\",\n  \"dependencies\": {\n    \"left-pad\": \"1.0.0\"\n  }\n}\n";

        let result = PackageJson
            .patch(manifest, &report(&[("left-pad", "1.0.0", "1.3.0")]))
            .unwrap();

        assert_eq!(
            result.content,
            "{\n  \"name\": \"app\",\n  \"dependencies\": {\n    \"left-pad\": \"1.3.0\"\n  }\n}\n"
        );
        assert_eq!(result.patched, ["left-pad"]);
        assert!(result.unpatched.is_empty());
    }

    #[test]
    fn keeps_key_order_and_indentation() {
        let manifest = "{\n    \"version\": \"1.0.0\",\n    \"name\": \"app\",\n    \"devDependencies\": {\n        \"zeta\": \"^1.0.0\",\n        \"alpha\": \"^2.0.0\"\n    }\n}";

        let result = PackageJson
            .patch(manifest, &report(&[("alpha", "2.0.0", "3.1.0")]))
            .unwrap();

        assert_eq!(
            result.content,
            "{\n    \"version\": \"1.0.0\",\n    \"name\": \"app\",\n    \"devDependencies\": {\n        \"zeta\": \"^1.0.0\",\n        \"alpha\": \"3.1.0\"\n    }\n}"
        );
    }

    #[test]
    fn patches_every_group_declaring_the_package() {
        let manifest = r#"{
	"dependencies": { "react": "16.0.0" },
	"peerDependencies": { "react": "16.0.0" }
}
"#;

        let result = PackageJson
            .patch(manifest, &report(&[("react", "16.0.0", "18.2.0")]))
            .unwrap();
        let document: Value = serde_json::from_str(&result.content).unwrap();

        assert_eq!(document["dependencies"]["react"], "18.2.0");
        assert_eq!(document["peerDependencies"]["react"], "18.2.0");
        assert!(result.content.contains("\n\t\"dependencies\""));
    }

    #[test]
    fn inline_containers_are_expanded() {
        let manifest = "{\n  \"files\": [\"dist\"],\n  \"dependencies\": { \"react\": \"16.0.0\" }\n}\n";

        let result = PackageJson
            .patch(manifest, &report(&[("react", "16.0.0", "18.2.0")]))
            .unwrap();

        assert_eq!(
            result.content,
            "{\n  \"files\": [\n    \"dist\"\n  ],\n  \"dependencies\": {\n    \"react\": \"18.2.0\"\n  }\n}\n"
        );
    }

    #[test]
    fn unchanged_and_undeclared_dependencies() {
        let manifest = "{\n  \"dependencies\": {\n    \"a\": \"1.0.0\"\n  }\n}\n";

        let result = PackageJson
            .patch(
                manifest,
                &report(&[("a", "1.0.0", "1.0.0"), ("ghost", "1.0.0", "2.0.0")]),
            )
            .unwrap();

        assert_eq!(result.content, manifest);
        assert!(result.is_unchanged());
        assert_eq!(result.unpatched, ["ghost"]);
    }

    #[test]
    fn rejects_non_object_manifests() {
        let result = PackageJson.patch("[]", &report(&[("a", "1", "2")]));
        assert!(matches!(result, Err(ManifestError::NotAnObject)));

        let result = PackageJson.patch("{", &report(&[("a", "1", "2")]));
        assert!(matches!(result, Err(ManifestError::Decode(_))));
    }

    #[test]
    fn detects_indentation() {
        assert_eq!(detect_indent("{\n\t\"a\": 1\n}"), "\t");
        assert_eq!(detect_indent("{\n    \"a\": 1\n}"), "    ");
        assert_eq!(detect_indent("{}"), DEFAULT_INDENT);
    }
}
