//! Document Chunking Library
//!
//! A deterministic, structure-aware chunking engine for RAG pipelines.
//! Splits normalized markdown-like documents into token-budgeted chunks with
//! stable identifiers and source ranges for citation.

pub mod api;
pub mod batch;
pub mod chunkers;
pub mod error;
pub mod jobs;
pub mod output;
pub mod registry;
pub mod types;

pub use batch::{BatchConfig, BatchProcessor, ChunkRun, DocumentFailure};
pub use chunkers::{Chunker, DocumentChunker};
pub use error::ChunkError;
pub use registry::{ProfileRegistry, ResolvedProfile};
pub use types::{Chunk, ChunkStats, ChunkingProfile, Document, ProfileSelector};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::batch::*;
    pub use crate::chunkers::{CharTokenEstimator, Chunker, DocumentChunker, TokenEstimator};
    pub use crate::error::ChunkError;
    pub use crate::output::{write_run, JsonlWriter};
    pub use crate::registry::ProfileRegistry;
    pub use crate::types::*;
}

/// Profile used when none is requested
pub const DEFAULT_PROFILE: &str = "default";

/// Default number of documents chunked concurrently
pub const DEFAULT_MAX_CONCURRENT_DOCUMENTS: usize = 4;

/// Maximum content size of a single document (10MB)
pub const DEFAULT_MAX_CONTENT_SIZE: usize = 10 * 1024 * 1024;

/// Default directory for job output
pub const DEFAULT_OUTPUT_DIR: &str = "./chunk-output";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3017;
