//! Report parsing error types.

use thiserror::Error;

/// Errors that can occur while parsing checker output.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The structured report is not a JSON object of version entries.
    #[error("Invalid JSON report: {0}")]
    Json(#[from] serde_json::Error),

    /// A body line of a log report does not have the expected shape.
    #[error("Malformed report line {line_number} ('{line}'): {reason}")]
    MalformedLine {
        line_number: usize,
        line: String,
        reason: &'static str,
    },
}
