//! Batch processing: chunks a corpus of documents and aggregates statistics.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::Result;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::chunkers::{Chunker, DocumentChunker};
use crate::error::ChunkError;
use crate::registry::ProfileRegistry;
use crate::types::{Chunk, ChunkStats, ChunkingConfig, ChunkingProfile, Document, ProfileSelector};
use crate::{DEFAULT_MAX_CONCURRENT_DOCUMENTS, DEFAULT_MAX_CONTENT_SIZE};

/// Configuration for batch processing.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum documents chunked concurrently
    pub concurrency: usize,
    /// Maximum content size per document (bytes)
    pub max_content_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_MAX_CONCURRENT_DOCUMENTS,
            max_content_size: DEFAULT_MAX_CONTENT_SIZE,
        }
    }
}

impl From<&ChunkingConfig> for BatchConfig {
    fn from(config: &ChunkingConfig) -> Self {
        Self {
            concurrency: config.max_concurrent_documents,
            max_content_size: config.max_content_size,
        }
    }
}

/// A document that could not be chunked and was skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub path: String,
    pub error: String,
}

/// Result of chunking a corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRun {
    /// Chunks of all documents, in input document order
    pub chunks: Vec<Chunk>,
    pub stats: ChunkStats,
    /// Non-fatal warnings, such as a profile fallback
    pub warnings: Vec<String>,
    pub failures: Vec<DocumentFailure>,
}

/// Batch processor that drives a chunker over many documents.
///
/// Documents are independent: a failure in one is recorded and the rest of
/// the batch carries on.
pub struct BatchProcessor {
    chunker: Arc<dyn Chunker>,
    registry: Arc<ProfileRegistry>,
    config: BatchConfig,
}

impl BatchProcessor {
    /// Create a batch processor using the document chunker.
    pub fn new(registry: Arc<ProfileRegistry>, config: BatchConfig) -> Self {
        Self::with_chunker(Arc::new(DocumentChunker::new()), registry, config)
    }

    /// Create a batch processor with a specific chunker.
    pub fn with_chunker(
        chunker: Arc<dyn Chunker>,
        registry: Arc<ProfileRegistry>,
        config: BatchConfig,
    ) -> Self {
        Self {
            chunker,
            registry,
            config,
        }
    }

    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    /// Resolve the profile and chunk every document on the calling thread.
    pub fn run(&self, documents: &[Document], selector: &ProfileSelector) -> ChunkRun {
        let resolved = self.registry.resolve(selector);
        let mut run = self.process(documents, &resolved.profile);
        run.warnings = resolved.warnings;
        run
    }

    /// Resolve the profile and chunk documents on the blocking pool, up to
    /// `concurrency` at a time. Output order is input order.
    pub async fn run_concurrent(
        &self,
        documents: Vec<Document>,
        selector: &ProfileSelector,
    ) -> ChunkRun {
        let resolved = self.registry.resolve(selector);
        let mut run = self.process_concurrent(documents, resolved.profile).await;
        run.warnings = resolved.warnings;
        run
    }

    /// Chunk documents sequentially with an already resolved profile.
    pub fn process(&self, documents: &[Document], profile: &ChunkingProfile) -> ChunkRun {
        info!(
            documents = documents.len(),
            profile = %profile.name,
            "Starting batch chunking"
        );

        let results = documents
            .iter()
            .map(|doc| {
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    chunk_checked(
                        self.chunker.as_ref(),
                        doc,
                        profile,
                        self.config.max_content_size,
                    )
                }))
                .unwrap_or_else(|payload| {
                    Err(ChunkError::Aborted {
                        path: doc.path.clone(),
                        reason: panic_message(payload.as_ref()),
                    }
                    .into())
                });
                (doc.path.clone(), result)
            })
            .collect();

        collect_run(profile, results)
    }

    /// Chunk documents concurrently with an already resolved profile.
    pub async fn process_concurrent(
        &self,
        documents: Vec<Document>,
        profile: ChunkingProfile,
    ) -> ChunkRun {
        info!(
            documents = documents.len(),
            profile = %profile.name,
            concurrency = self.config.concurrency,
            "Starting concurrent batch chunking"
        );

        let profile = Arc::new(profile);
        let limit = self.config.max_content_size;

        let tasks = documents.into_iter().map(|doc| {
            let chunker = Arc::clone(&self.chunker);
            let profile = Arc::clone(&profile);
            async move {
                let path = doc.path.clone();
                let result = tokio::task::spawn_blocking(move || {
                    chunk_checked(chunker.as_ref(), &doc, &profile, limit)
                })
                .await
                .unwrap_or_else(|e| {
                    Err(ChunkError::Aborted {
                        path: path.clone(),
                        reason: e.to_string(),
                    }
                    .into())
                });
                (path, result)
            }
        });

        // `buffered` yields in submission order, whatever order tasks finish in.
        let results: Vec<(String, Result<Vec<Chunk>>)> = stream::iter(tasks)
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        collect_run(&profile, results)
    }
}

/// Chunk one document after checking it against the size limit.
fn chunk_checked(
    chunker: &dyn Chunker,
    document: &Document,
    profile: &ChunkingProfile,
    max_content_size: usize,
) -> Result<Vec<Chunk>> {
    if document.content_len() > max_content_size {
        return Err(ChunkError::DocumentTooLarge {
            path: document.path.clone(),
            size: document.content_len(),
            limit: max_content_size,
        }
        .into());
    }

    debug!(path = %document.path, chunker = chunker.name(), "Processing document");
    chunker.chunk(document, profile)
}

/// Text of a caught panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "chunker panicked".to_string())
}

/// Concatenate per-document results in order and compute statistics.
fn collect_run(profile: &ChunkingProfile, results: Vec<(String, Result<Vec<Chunk>>)>) -> ChunkRun {
    let total_documents = results.len();
    let mut chunks = Vec::new();
    let mut failures = Vec::new();

    for (path, result) in results {
        match result {
            Ok(document_chunks) => chunks.extend(document_chunks),
            Err(e) => {
                warn!(path = %path, error = %e, "Failed to chunk document, skipping");
                failures.push(DocumentFailure {
                    path,
                    error: e.to_string(),
                });
            }
        }
    }

    let stats = ChunkStats::compute(profile, &chunks, total_documents, failures.len());

    info!(
        documents = total_documents,
        failed = failures.len(),
        chunks = stats.total_chunks,
        average_chunk_size = stats.average_chunk_size,
        "Batch chunking complete"
    );

    ChunkRun {
        chunks,
        stats,
        warnings: Vec::new(),
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProfileOverride;
    use anyhow::anyhow;
    use pretty_assertions::assert_eq;

    fn processor() -> BatchProcessor {
        BatchProcessor::new(Arc::new(ProfileRegistry::builtin()), BatchConfig::default())
    }

    fn corpus() -> Vec<Document> {
        let long: Vec<String> = (0..24).map(|i| format!("Paragraph {i}. {}", "word ".repeat(80))).collect();
        vec![
            Document::new("a.md", format!("# Alpha\n\n{}", long.join("\n\n"))),
            Document::new("b.md", ""),
            Document::new("c.md", "Intro.\n\n## Beta\n\n- one\n- two\n\n```toml\nkey = 1\n```"),
        ]
    }

    fn ids(run: &ChunkRun) -> Vec<String> {
        run.chunks.iter().map(|c| c.chunk_id.clone()).collect()
    }

    /// Fails on paths containing "bad", panics on paths containing "boom".
    struct FlakyChunker;

    impl Chunker for FlakyChunker {
        fn name(&self) -> &'static str {
            "flaky"
        }

        fn chunk(&self, document: &Document, profile: &ChunkingProfile) -> Result<Vec<Chunk>> {
            if document.path.contains("bad") {
                return Err(anyhow!("cannot chunk {}", document.path));
            }
            if document.path.contains("boom") {
                panic!("chunker crashed");
            }
            DocumentChunker::new().chunk(document, profile)
        }
    }

    #[test]
    fn test_documents_stay_in_input_order() {
        let run = processor().run(&corpus(), &ProfileSelector::named("granular"));

        let paths: Vec<&str> = run.chunks.iter().map(|c| c.source_path.as_str()).collect();
        let first_c = paths.iter().position(|p| *p == "c.md").unwrap();
        assert!(paths[..first_c].iter().all(|p| *p == "a.md"));
        assert!(paths[first_c..].iter().all(|p| *p == "c.md"));
        assert!(run.failures.is_empty());
        assert!(run.warnings.is_empty());
    }

    #[test]
    fn test_statistics() {
        let run = processor().run(&corpus(), &ProfileSelector::named("default"));

        assert_eq!(run.stats.profile, "default");
        assert_eq!(run.stats.total_documents, 3);
        assert_eq!(run.stats.total_chunks, run.chunks.len());
        let mean = run.chunks.iter().map(|c| c.token_count).sum::<usize>() as f64
            / run.chunks.len() as f64;
        assert_eq!(run.stats.average_chunk_size, mean);
        assert_eq!(
            run.stats.average_chunks_per_document,
            run.chunks.len() as f64 / 3.0
        );
    }

    #[test]
    fn test_unknown_profile_matches_default_plus_warning() {
        let processor = processor();
        let fallback = processor.run(&corpus(), &ProfileSelector::named("not-a-real-profile"));
        let default = processor.run(&corpus(), &ProfileSelector::named("default"));

        assert_eq!(ids(&fallback), ids(&default));
        assert_eq!(fallback.warnings.len(), 1);
        assert_eq!(fallback.stats.profile, "default");
    }

    #[test]
    fn test_failures_are_isolated() {
        let processor = BatchProcessor::with_chunker(
            Arc::new(FlakyChunker),
            Arc::new(ProfileRegistry::builtin()),
            BatchConfig::default(),
        );
        let mut docs = corpus();
        docs.insert(1, Document::new("bad.md", "# Bad\n\ntext"));

        let run = processor.run(&docs, &ProfileSelector::default());
        assert_eq!(run.failures.len(), 1);
        assert_eq!(run.failures[0].path, "bad.md");
        assert_eq!(run.stats.failed_documents, 1);
        assert_eq!(run.stats.total_documents, 4);
        assert!(run.chunks.iter().any(|c| c.source_path == "c.md"));
    }

    #[test]
    fn test_oversized_document_is_skipped() {
        let processor = BatchProcessor::new(
            Arc::new(ProfileRegistry::builtin()),
            BatchConfig {
                concurrency: 2,
                max_content_size: 64,
            },
        );
        let docs = vec![
            Document::new("small.md", "small"),
            Document::new("huge.md", "x".repeat(65)),
        ];

        let run = processor.run(&docs, &ProfileSelector::default());
        assert_eq!(run.chunks.len(), 1);
        assert_eq!(run.failures.len(), 1);
        assert!(run.failures[0].error.contains("huge.md"));
    }

    #[tokio::test]
    async fn test_concurrent_matches_sequential() {
        let processor = processor();
        let selector = ProfileSelector::named("granular");

        let sequential = processor.run(&corpus(), &selector);
        let concurrent = processor.run_concurrent(corpus(), &selector).await;

        assert_eq!(ids(&concurrent), ids(&sequential));
        assert_eq!(concurrent.stats.total_chunks, sequential.stats.total_chunks);
    }

    #[tokio::test]
    async fn test_concurrent_isolates_panics() {
        let processor = BatchProcessor::with_chunker(
            Arc::new(FlakyChunker),
            Arc::new(ProfileRegistry::builtin()),
            BatchConfig::default(),
        );
        let mut docs = corpus();
        docs.push(Document::new("boom.md", "text"));
        docs.push(Document::new("after.md", "still chunked"));

        let run = processor.run_concurrent(docs, &ProfileSelector::default()).await;
        assert_eq!(run.failures.len(), 1);
        assert_eq!(run.failures[0].path, "boom.md");
        assert_eq!(run.chunks.last().unwrap().source_path, "after.md");
    }

    #[test]
    fn test_sequential_isolates_panics() {
        let processor = BatchProcessor::with_chunker(
            Arc::new(FlakyChunker),
            Arc::new(ProfileRegistry::builtin()),
            BatchConfig::default(),
        );
        let mut docs = corpus();
        docs.push(Document::new("boom.md", "text"));
        docs.push(Document::new("after.md", "still chunked"));

        let run = processor.run(&docs, &ProfileSelector::default());
        assert_eq!(run.failures.len(), 1);
        assert_eq!(run.failures[0].path, "boom.md");
        assert!(run.failures[0].error.contains("chunker crashed"));
        assert_eq!(run.stats.total_documents, 5);
        assert_eq!(run.chunks.last().unwrap().source_path, "after.md");
    }

    #[test]
    fn test_huge_code_weight_is_rejected_not_fatal() {
        let selector = ProfileSelector::Custom(ProfileOverride {
            code_block_weight: Some(1e30),
            ..Default::default()
        });
        let docs = vec![Document::new(
            "code.md",
            "# Code\n\n```rust\nfn a() {}\n```\n\n```rust\nfn b() {}\n```",
        )];

        let run = processor().run(&docs, &selector);
        assert_eq!(run.warnings.len(), 1);
        assert_eq!(run.stats.profile, "default");
        assert!(run.failures.is_empty());
        assert_eq!(run.chunks.len(), 1);
    }

    #[test]
    fn test_block_on_concurrent_run() {
        let run = tokio_test::block_on(
            processor().run_concurrent(corpus(), &ProfileSelector::named("faq")),
        );
        assert_eq!(run.stats.profile, "faq");
        assert_eq!(run.stats.total_documents, 3);
    }
}
