//! Error types for message ingestion

use thiserror::Error;

/// Boxed error produced by an external collaborator (fetcher, lister)
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while decoding, normalizing or ingesting messages
#[derive(Error, Debug)]
pub enum IngestError {
    /// The byte stream could not be parsed as a message at all
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// A boilerplate pattern failed to compile
    #[error("Invalid boilerplate pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The message identifier listing failed; the batch cannot start
    #[error("Failed to list message identifiers: {0}")]
    Listing(#[source] BoxError),

    /// The transport payload could not be decoded into raw message bytes
    #[error("Failed to decode transport payload: {0}")]
    Transport(String),
}

/// Per-item failure recorded in a batch result slot
#[derive(Error, Debug)]
#[error("Failed to ingest message {message_id}: {cause}")]
pub struct ErrorMarker {
    /// Identifier of the message that failed
    pub message_id: String,

    /// Underlying cause reported by the fetch collaborator
    #[source]
    pub cause: BoxError,
}

impl ErrorMarker {
    pub fn new(message_id: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self {
            message_id: message_id.into(),
            cause: cause.into(),
        }
    }
}

/// Result type for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;
