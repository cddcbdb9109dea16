//! Core types for the chunking service.

mod chunk;
mod config;
mod source;
mod stats;

pub use chunk::{ByteRange, Chunk, LineRange};
pub use config::{ChunkingConfig, ChunkingProfile, ProfileOverride, ProfileSelector};
pub use source::{
    ChunkJobStatus, ChunkJobStatusResponse, ChunkRequest, Document, StartChunkJobResponse,
};
pub use stats::ChunkStats;
