//! Base traits for chunkers and token estimation.

use anyhow::Result;

use super::lines;
use crate::types::{Chunk, ChunkingProfile, Document};

/// Characters counted as one token by the default estimator.
pub const CHARS_PER_TOKEN: usize = 4;

/// The core trait that all chunkers must implement.
///
/// A chunker takes a document and splits it into citation-addressable
/// chunks sized by the given profile. Implementations must be pure: the same
/// document and profile always produce the same chunks.
pub trait Chunker: Send + Sync {
    /// Get the name of this chunker.
    fn name(&self) -> &'static str;

    /// Chunk the given document with the provided profile.
    fn chunk(&self, document: &Document, profile: &ChunkingProfile) -> Result<Vec<Chunk>>;

    /// Get the description of this chunker.
    fn description(&self) -> &'static str {
        "A document chunker"
    }
}

/// Approximates the token cost of a piece of text.
pub trait TokenEstimator: Send + Sync {
    fn estimate(&self, text: &str) -> usize;
}

/// Character-count estimator: `ceil(chars / 4)`, with an optional multiplier
/// for fenced code blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharTokenEstimator {
    code_block_weight: Option<f64>,
}

impl CharTokenEstimator {
    pub fn new(code_block_weight: Option<f64>) -> Self {
        Self { code_block_weight }
    }

    /// Estimator matching the profile's code weighting.
    pub fn for_profile(profile: &ChunkingProfile) -> Self {
        Self::new(profile.code_block_weight)
    }
}

impl TokenEstimator for CharTokenEstimator {
    fn estimate(&self, text: &str) -> usize {
        let base = text.chars().count().div_ceil(CHARS_PER_TOKEN);

        match self.code_block_weight {
            Some(weight) if is_fenced_block(text) => (base as f64 * weight).ceil() as usize,
            _ => base,
        }
    }
}

/// Whether the text is a fenced code block, i.e. opens with a fence line.
fn is_fenced_block(text: &str) -> bool {
    text.lines()
        .next()
        .map_or(false, lines::is_fence)
}

/// Estimate tokens with the unweighted default estimator.
pub fn estimate_tokens(text: &str) -> usize {
    CharTokenEstimator::default().estimate(text)
}
