//! Manifest error types.

use thiserror::Error;

/// Errors that can occur while locating or patching manifests.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// No handler exists for the configured language.
    #[error("Unsupported language '{language}'")]
    UnsupportedLanguage { language: String },

    /// The manifest is not valid JSON.
    #[error("Failed to decode manifest: {0}")]
    Decode(#[source] serde_json::Error),

    /// The manifest decoded to something other than a JSON object.
    #[error("Manifest root is not an object")]
    NotAnObject,

    /// Re-encoding the patched manifest failed.
    #[error("Failed to encode manifest: {0}")]
    Encode(String),

    /// A declaration pattern could not be built.
    #[error("Invalid pattern for dependency '{name}': {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}
