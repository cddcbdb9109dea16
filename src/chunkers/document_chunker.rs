//! Document chunker for markdown and wiki content.

use anyhow::Result;
use tracing::debug;

use super::assembler::ChunkAssembler;
use super::base::{CharTokenEstimator, Chunker};
use super::finalizer::{document_id, ChunkFinalizer, LineIndex, SectionContext};
use super::paragraph;
use super::structure;
use crate::types::{Chunk, ChunkingProfile, Document};

/// Document chunker for markdown, wiki, and structured text content.
///
/// This chunker is aware of document structure like headings, code blocks,
/// and lists, ensuring chunks respect these boundaries. Output is fully
/// determined by the document and the profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentChunker;

impl DocumentChunker {
    /// Create a new document chunker.
    pub fn new() -> Self {
        Self
    }

    /// Chunk one document: preamble chunks first, then each section's chunks
    /// in source order, indexed document-wide.
    pub fn chunk_document(&self, document: &Document, profile: &ChunkingProfile) -> Vec<Chunk> {
        if document.is_blank() {
            return Vec::new();
        }

        let doc_id = document_id(document);
        let line_index = LineIndex::new(&document.content);
        let estimator = CharTokenEstimator::for_profile(profile);
        let assembler = ChunkAssembler::new(profile, &estimator);
        let finalizer = ChunkFinalizer::new(&doc_id, &document.path, &line_index);

        let parsed = structure::parse(&document.content, profile.split_on_headings);
        let mut chunks = Vec::new();

        let preamble = paragraph::split(&parsed.preamble, 1, profile.preserve_lists);
        chunks.extend(finalizer.finalize(
            &SectionContext::preamble(),
            assembler.assemble(preamble),
            chunks.len(),
        ));

        for section in &parsed.sections {
            let paragraphs = paragraph::split(
                &section.body,
                section.body_start_line(),
                profile.preserve_lists,
            );
            let context =
                SectionContext::section(&[section.anchor.as_str()], &section.title, section.level);
            chunks.extend(finalizer.finalize(
                &context,
                assembler.assemble(paragraphs),
                chunks.len(),
            ));
        }

        debug!(
            path = %document.path,
            doc_id = %doc_id,
            sections = parsed.sections.len(),
            chunks = chunks.len(),
            "Chunked document"
        );

        chunks
    }
}

impl Chunker for DocumentChunker {
    fn name(&self) -> &'static str {
        "document"
    }

    fn description(&self) -> &'static str {
        "Heading-aware document chunker for markdown and wiki content"
    }

    fn chunk(&self, document: &Document, profile: &ChunkingProfile) -> Result<Vec<Chunk>> {
        Ok(self.chunk_document(document, profile))
    }
}
