//! Line-oriented (log) reports.
//!
//! ```text
//! Fetching gem metadata from https://rubygems.org/
//! Resolving dependencies...
//!
//! rails (5.0.0), latest 5.1.4.
//! puma (3.9.1), latest 3.11.2.
//! ```

use super::{OutdatedReport, ReportError, VersionInfo};

/// Parses a checker log: header, blank line, one line per outdated dependency.
///
/// The body ends at the next blank line or at the end of input. Input without
/// a body has no updates.
///
/// # Errors
///
/// Returns [`ReportError::MalformedLine`] with the 1-based line number of the
/// first body line that is not `<name> (<wanted>)[,] latest <latest>.`.
pub fn parse_log(raw: &str) -> Result<OutdatedReport, ReportError> {
    let mut report = OutdatedReport::new();
    let mut lines = raw.lines().enumerate().map(|(index, line)| (index + 1, line));

    // Header.
    if !lines.by_ref().any(|(_, line)| line.trim().is_empty()) {
        return Ok(report);
    }

    let body = lines
        .skip_while(|(_, line)| line.trim().is_empty())
        .take_while(|(_, line)| !line.trim().is_empty());

    for (line_number, line) in body {
        let (name, version) = parse_line(line).map_err(|reason| ReportError::MalformedLine {
            line_number,
            line: line.to_string(),
            reason,
        })?;
        report.insert(name, version);
    }

    Ok(report)
}

fn parse_line(line: &str) -> Result<(&str, VersionInfo), &'static str> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let &[name, wanted, keyword, latest] = tokens.as_slice() else {
        return Err("expected 4 tokens");
    };

    let wanted = wanted.strip_suffix(',').unwrap_or(wanted);
    let wanted = wanted
        .strip_prefix('(')
        .and_then(|w| w.strip_suffix(')'))
        .ok_or("wanted version must be in parentheses")?;

    if keyword != "latest" {
        return Err("expected 'latest'");
    }

    let latest = latest.strip_suffix('.').ok_or("latest version must end with '.'")?;

    if wanted.is_empty() || latest.is_empty() {
        return Err("empty version");
    }

    Ok((name, VersionInfo::new(wanted, latest)))
}
