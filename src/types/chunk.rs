//! Chunk type definitions.

use serde::{Deserialize, Serialize};

/// Inclusive 1-based line span in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

/// Half-open byte span in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

/// A chunk of content extracted from a document.
///
/// Chunks are the fundamental unit of content that gets embedded and cited.
/// `source_path`, `heading_path` and the two ranges together point back to
/// the exact origin of the chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Stable identifier derived from `doc_id`, `heading_path` and `chunk_index`
    pub chunk_id: String,

    /// Stable identifier derived from the document's path and content
    pub doc_id: String,

    /// The text content of the chunk
    pub content: String,

    /// Estimated number of tokens in this chunk
    pub token_count: usize,

    /// Path of the document this chunk came from
    pub source_path: String,

    /// `/`-joined section anchors; empty for preamble chunks
    pub heading_path: String,

    /// Title of the enclosing section (absent for preamble chunks)
    pub section_title: Option<String>,

    /// Heading level of the enclosing section (0 for preamble chunks)
    pub section_level: u8,

    pub line_range: LineRange,

    pub byte_range: ByteRange,

    /// Order of this chunk within its document (0-indexed)
    pub chunk_index: usize,

    /// Content contains a fenced block or an inline code span
    pub has_code: bool,

    /// Content contains a bullet or numbered list item
    pub has_list: bool,

    /// Distinct fence language tags, in order of appearance
    pub language_hints: Vec<String>,
}

impl Chunk {
    /// Check if the chunk came from the document preamble.
    pub fn is_preamble(&self) -> bool {
        self.section_level == 0
    }
}
