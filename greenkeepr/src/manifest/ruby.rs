//! `Gemfile` manifests.
//!
//! Gemfiles are patched line by line: only the version literal of the first
//! matching `gem` declaration changes, every other byte is kept.

use super::{Language, ManifestError, ManifestHandler, PatchedManifest};
use crate::report::{parse_log, OutdatedReport, ReportError};
use regex::Regex;

const VERSION_PATTERN: &str = r#"^\s*,\s*['"](?:[~><=!]+\s*)?(?P<version>[^'"]*)['"]"#;

/// Handler for Bundler projects.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gemfile;

impl ManifestHandler for Gemfile {
    fn language(&self) -> Language {
        Language::Ruby
    }

    fn files(&self) -> &'static [&'static str] {
        &["Gemfile", "Gemfile.lock"]
    }

    fn manifest_file(&self) -> &'static str {
        "Gemfile"
    }

    fn lockfile(&self) -> Option<&'static str> {
        Some("Gemfile.lock")
    }

    fn lockfile_command(&self) -> Option<&'static [&'static str]> {
        Some(&["bundle", "update"])
    }

    fn report_file(&self) -> &'static str {
        "outdated.log"
    }

    fn parse_report(&self, raw: &str) -> Result<OutdatedReport, ReportError> {
        parse_log(raw)
    }

    fn patch(&self, manifest: &str, report: &OutdatedReport) -> Result<PatchedManifest, ManifestError> {
        let version_pattern = Regex::new(VERSION_PATTERN).map_err(|source| ManifestError::Pattern {
            name: "version".to_string(),
            source,
        })?;

        let mut lines: Vec<String> = manifest.split_inclusive('\n').map(str::to_string).collect();
        let mut patched = Vec::new();
        let mut unpatched = Vec::new();

        for (name, version) in report.changed() {
            let declaration = declaration_pattern(name)?;
            let rewritten = lines.iter_mut().find_map(|line| {
                let (body, ending) = split_line_ending(line);
                let updated = rewrite_declaration(body, &declaration, &version_pattern, &version.latest)?;
                let updated = format!("{updated}{ending}");
                Some((line, updated))
            });

            match rewritten {
                Some((line, updated)) => {
                    *line = updated;
                    patched.push(name.to_string());
                }
                None => unpatched.push(name.to_string()),
            }
        }

        Ok(PatchedManifest {
            content: lines.concat(),
            patched,
            unpatched,
        })
    }
}

fn declaration_pattern(name: &str) -> Result<Regex, ManifestError> {
    let pattern = format!(
        r#"^\s*gem\s*\(?\s*(?P<quote>['"]){}['"]"#,
        regex::escape(name)
    );
    Regex::new(&pattern).map_err(|source| ManifestError::Pattern {
        name: name.to_string(),
        source,
    })
}

/// Returns the line with its version replaced, or `None` if it does not
/// declare the gem.
fn rewrite_declaration(line: &str, declaration: &Regex, version: &Regex, latest: &str) -> Option<String> {
    let captures = declaration.captures(line)?;
    let name_end = captures.get(0)?.end();
    let rest = &line[name_end..];

    match version.captures(rest).and_then(|c| c.name("version")) {
        Some(current) => {
            let start = name_end + current.start();
            let end = name_end + current.end();
            Some(format!("{}{latest}{}", &line[..start], &line[end..]))
        }
        None => {
            let quote = captures.name("quote").map_or("'", |q| q.as_str());
            Some(format!(
                "{}, {quote}{latest}{quote}{rest}",
                &line[..name_end]
            ))
        }
    }
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}
