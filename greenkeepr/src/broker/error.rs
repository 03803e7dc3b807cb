//! Broker error types.

use thiserror::Error;

/// Errors that can occur while exchanging messages.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// A message could not be serialized.
    #[error("Failed to encode message for '{topic}': {source}")]
    Encode {
        topic: String,
        #[source]
        source: serde_json::Error,
    },

    /// A received payload is not a valid message.
    #[error("Failed to decode message from '{topic}': {source}")]
    Decode {
        topic: String,
        #[source]
        source: serde_json::Error,
    },
}
