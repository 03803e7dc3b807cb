//! Structured (JSON) reports.

use super::{OutdatedReport, ReportError};

/// Parses a JSON object of dependency name to `{Wanted, Latest}`.
///
/// Empty or whitespace-only input has no updates. Keys other than the two
/// versions are ignored, so `npm outdated --json` output parses as is.
///
/// # Errors
///
/// Returns [`ReportError::Json`] if the input is not such an object.
pub fn parse_json(raw: &str) -> Result<OutdatedReport, ReportError> {
    if raw.trim().is_empty() {
        return Ok(OutdatedReport::new());
    }

    Ok(serde_json::from_str(raw)?)
}
