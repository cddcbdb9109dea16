//! Chunk finalizer: turns packed buffers into citable chunk records.

use sha2::{Digest, Sha256};

use super::assembler::ChunkBuffer;
use super::lines::{self, FenceEvent, FenceTracker};
use crate::types::{ByteRange, Chunk, Document, LineRange};

/// Hex characters kept from SHA-256 digests for document and chunk ids.
pub const ID_LENGTH: usize = 16;

/// Separator between hashed id components, so that component boundaries
/// cannot shift (`"a" + "10"` vs `"a1" + "0"`).
const ID_SEPARATOR: &str = "\u{1f}";

fn short_digest(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            hasher.update(ID_SEPARATOR.as_bytes());
        }
        hasher.update(part.as_bytes());
    }
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(ID_LENGTH);
    digest
}

/// Stable id of a document: changes whenever its path or content changes.
pub fn document_id(document: &Document) -> String {
    short_digest(&[document.path.as_str(), document.content.as_str()])
}

/// Stable id of a chunk within a document.
pub fn chunk_id(doc_id: &str, heading_path: &str, chunk_index: usize) -> String {
    let index = chunk_index.to_string();
    short_digest(&[doc_id, heading_path, index.as_str()])
}

/// Byte offsets of every line of a document.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Offset of the first byte of each line
    starts: Vec<usize>,
    /// Offset just past the last byte of each line, line terminator excluded
    ends: Vec<usize>,
}

impl LineIndex {
    pub fn new(content: &str) -> Self {
        let mut starts = Vec::new();
        let mut ends = Vec::new();
        let mut offset = 0;

        for raw in content.split_inclusive('\n') {
            let line = raw.strip_suffix('\n').unwrap_or(raw);
            let line = line.strip_suffix('\r').unwrap_or(line);
            starts.push(offset);
            ends.push(offset + line.len());
            offset += raw.len();
        }

        Self { starts, ends }
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Byte span covering 1-based lines `first..=last`.
    pub fn byte_range(&self, first: usize, last: usize) -> ByteRange {
        let fallback = self.ends.last().copied().unwrap_or(0);
        let start = self
            .starts
            .get(first.saturating_sub(1))
            .copied()
            .unwrap_or(fallback);
        let end = self
            .ends
            .get(last.saturating_sub(1))
            .copied()
            .unwrap_or(fallback);
        ByteRange {
            start,
            end: end.max(start),
        }
    }
}

/// Structural position shared by every chunk of one section (or the preamble).
#[derive(Debug, Clone)]
pub struct SectionContext {
    pub heading_path: String,
    pub title: Option<String>,
    pub level: u8,
}

impl SectionContext {
    pub fn preamble() -> Self {
        Self {
            heading_path: String::new(),
            title: None,
            level: 0,
        }
    }

    /// Context of a section; `anchors` is the breadcrumb ending at the
    /// section's own anchor.
    pub fn section(anchors: &[&str], title: &str, level: u8) -> Self {
        Self {
            heading_path: anchors.join("/"),
            title: Some(title.to_string()),
            level,
        }
    }
}

/// Builds chunk records for one document.
pub struct ChunkFinalizer<'a> {
    doc_id: &'a str,
    source_path: &'a str,
    lines: &'a LineIndex,
}

impl<'a> ChunkFinalizer<'a> {
    pub fn new(doc_id: &'a str, source_path: &'a str, lines: &'a LineIndex) -> Self {
        Self {
            doc_id,
            source_path,
            lines,
        }
    }

    /// Finalize the buffers of one section; `first_index` is the
    /// document-wide index of the first buffer.
    pub fn finalize(
        &self,
        section: &SectionContext,
        buffers: Vec<ChunkBuffer>,
        first_index: usize,
    ) -> Vec<Chunk> {
        buffers
            .into_iter()
            .filter(|buffer| !buffer.is_empty())
            .enumerate()
            .map(|(offset, buffer)| self.finalize_one(section, buffer, first_index + offset))
            .collect()
    }

    fn finalize_one(
        &self,
        section: &SectionContext,
        buffer: ChunkBuffer,
        chunk_index: usize,
    ) -> Chunk {
        let line_start = buffer
            .paragraphs
            .first()
            .map(|p| p.line_start)
            .unwrap_or(1);
        let line_end = buffer
            .paragraphs
            .last()
            .map(|p| p.line_end)
            .unwrap_or(line_start);

        let content = buffer
            .paragraphs
            .iter()
            .map(|p| p.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let flags = ContentFlags::scan(&content);

        Chunk {
            chunk_id: chunk_id(self.doc_id, &section.heading_path, chunk_index),
            doc_id: self.doc_id.to_string(),
            token_count: buffer.tokens,
            source_path: self.source_path.to_string(),
            heading_path: section.heading_path.clone(),
            section_title: section.title.clone(),
            section_level: section.level,
            line_range: LineRange {
                start: line_start,
                end: line_end,
            },
            byte_range: self.lines.byte_range(line_start, line_end),
            chunk_index,
            has_code: flags.has_code,
            has_list: flags.has_list,
            language_hints: flags.language_hints,
            content,
        }
    }
}

/// Code and list markers found in a chunk's content.
#[derive(Debug, Default, PartialEq, Eq)]
struct ContentFlags {
    has_code: bool,
    has_list: bool,
    language_hints: Vec<String>,
}

impl ContentFlags {
    fn scan(content: &str) -> Self {
        let mut flags = Self::default();
        let mut fences = FenceTracker::new();

        for line in content.lines() {
            match fences.observe(line) {
                FenceEvent::Open { language } => {
                    flags.has_code = true;
                    if let Some(language) = language {
                        if !flags.language_hints.contains(&language) {
                            flags.language_hints.push(language);
                        }
                    }
                }
                FenceEvent::Outside => {
                    if lines::is_list_item(line) {
                        flags.has_list = true;
                    }
                    if lines::has_inline_code(line) {
                        flags.has_code = true;
                    }
                }
                FenceEvent::Inside | FenceEvent::Close => {}
            }
        }

        flags
    }
}
