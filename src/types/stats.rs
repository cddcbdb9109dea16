//! Corpus-level chunking statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Chunk, ChunkingProfile};

/// Summary of a chunking run, persisted as the statistics sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkStats {
    /// Name of the profile the run used
    pub profile: String,

    /// Full settings of that profile
    pub settings: ChunkingProfile,

    pub total_chunks: usize,

    /// Number of input documents, including failed ones
    pub total_documents: usize,

    pub failed_documents: usize,

    /// Mean `token_count` over all chunks
    pub average_chunk_size: f64,

    pub average_chunks_per_document: f64,

    pub generated_at: DateTime<Utc>,
}

impl ChunkStats {
    /// Compute statistics over the final chunk list.
    pub fn compute(
        profile: &ChunkingProfile,
        chunks: &[Chunk],
        total_documents: usize,
        failed_documents: usize,
    ) -> Self {
        let total_chunks = chunks.len();
        let total_tokens = chunks
            .iter()
            .fold(0usize, |sum, c| sum.saturating_add(c.token_count));

        Self {
            profile: profile.name.clone(),
            settings: profile.clone(),
            total_chunks,
            total_documents,
            failed_documents,
            average_chunk_size: mean(total_tokens, total_chunks),
            average_chunks_per_document: mean(total_chunks, total_documents),
            generated_at: Utc::now(),
        }
    }
}

fn mean(sum: usize, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}
