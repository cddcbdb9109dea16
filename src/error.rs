//! Error types for the chunking engine.

use thiserror::Error;

/// Errors raised while chunking documents or writing chunk output.
#[derive(Debug, Error)]
pub enum ChunkError {
    /// Document content is larger than the configured single-document limit.
    #[error("document '{path}' is {size} bytes, exceeding the {limit} byte limit")]
    DocumentTooLarge {
        path: String,
        size: usize,
        limit: usize,
    },

    /// A custom profile failed validation.
    #[error("invalid chunk profile '{name}': {reason}")]
    InvalidProfile { name: String, reason: String },

    /// Processing of a document was aborted (worker panic or cancellation).
    #[error("chunking of document '{path}' was aborted: {reason}")]
    Aborted { path: String, reason: String },

    #[error("failed to write chunk output: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize chunk output: {0}")]
    Serialization(#[from] serde_json::Error),
}
