//! Source documents and request/response definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ProfileSelector;

/// A normalized document to be chunked.
///
/// Documents arrive already stripped of front matter and markup quirks; the
/// engine only ever reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Unique key of the document, usually its relative source path
    pub path: String,

    /// Plain-text body
    pub content: String,
}

impl Document {
    /// Create a new document.
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Get content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }

    /// Check if the document has no visible content.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Request to chunk a set of documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRequest {
    /// Documents to chunk, in output order
    pub documents: Vec<Document>,

    /// Profile to chunk with; the service's active profile when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileSelector>,
}

/// Response when starting a chunking job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartChunkJobResponse {
    /// ID of the created job
    pub job_id: Uuid,

    /// Whether the job was accepted
    pub accepted: bool,

    /// Number of documents queued
    pub documents_count: usize,

    /// Optional message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Status of a chunking job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkJobStatus {
    /// Job is queued but not started
    Pending,
    /// Job is currently running
    Running,
    /// Job completed and its output was written
    Completed,
    /// Job failed
    Failed,
}

/// Response with job status information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkJobStatusResponse {
    /// ID of the job
    pub job_id: Uuid,

    /// Current status
    pub status: ChunkJobStatus,

    /// Total documents to process
    pub total_documents: usize,

    /// Documents that failed and were skipped
    pub failed_documents: usize,

    /// Total chunks created
    pub chunks_created: usize,

    /// Directory holding `chunks.jsonl` and the statistics sidecar
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,

    /// Error message if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// When the job started
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// When the job completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}
