//! Structure-aware chunking pipeline.
//!
//! A document flows through the structure parser, the paragraph splitter,
//! the chunk assembler and the finalizer, in that order.

pub mod assembler;
pub mod base;
mod document_chunker;
pub mod finalizer;
pub mod lines;
pub mod paragraph;
pub mod structure;

pub use base::{estimate_tokens, CharTokenEstimator, Chunker, TokenEstimator};
pub use document_chunker::DocumentChunker;
pub use finalizer::{chunk_id, document_id};
