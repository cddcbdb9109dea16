//! Line-delimited chunk stream and statistics sidecar.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::batch::{ChunkRun, DocumentFailure};
use crate::error::ChunkError;
use crate::types::{Chunk, ChunkStats};

/// File name of the chunk stream.
pub const CHUNKS_FILE: &str = "chunks.jsonl";

/// File name of the statistics sidecar.
pub const STATS_FILE: &str = "chunks.stats.json";

/// Writes chunks as one JSON object per line.
pub struct JsonlWriter<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> JsonlWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn write_chunk(&mut self, chunk: &Chunk) -> Result<(), ChunkError> {
        serde_json::to_writer(&mut self.writer, chunk)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    pub fn write_all<'c>(
        &mut self,
        chunks: impl IntoIterator<Item = &'c Chunk>,
    ) -> Result<(), ChunkError> {
        for chunk in chunks {
            self.write_chunk(chunk)?;
        }
        Ok(())
    }

    /// Number of chunks written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush and return the underlying writer.
    pub fn finish(mut self) -> Result<W, ChunkError> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Contents of the statistics sidecar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSidecar {
    #[serde(flatten)]
    pub stats: ChunkStats,
    pub warnings: Vec<String>,
    pub failures: Vec<DocumentFailure>,
}

impl From<&ChunkRun> for StatsSidecar {
    fn from(run: &ChunkRun) -> Self {
        Self {
            stats: run.stats.clone(),
            warnings: run.warnings.clone(),
            failures: run.failures.clone(),
        }
    }
}

/// Paths of the files written for a run.
#[derive(Debug, Clone)]
pub struct OutputFiles {
    pub chunks: PathBuf,
    pub stats: PathBuf,
}

/// Encode chunks as a JSON Lines payload.
pub fn to_jsonl(chunks: &[Chunk]) -> Result<Vec<u8>, ChunkError> {
    let mut writer = JsonlWriter::new(Vec::new());
    writer.write_all(chunks)?;
    writer.finish()
}

/// Write `chunks.jsonl` and `chunks.stats.json` for a run into `dir`,
/// creating the directory if needed.
pub fn write_run(dir: &Path, run: &ChunkRun) -> Result<OutputFiles, ChunkError> {
    fs::create_dir_all(dir)?;

    let chunks_path = dir.join(CHUNKS_FILE);
    let mut writer = JsonlWriter::new(BufWriter::new(File::create(&chunks_path)?));
    writer.write_all(&run.chunks)?;
    let written = writer.written();
    writer.finish()?;

    let stats_path = dir.join(STATS_FILE);
    let mut stats_file = BufWriter::new(File::create(&stats_path)?);
    serde_json::to_writer_pretty(&mut stats_file, &StatsSidecar::from(run))?;
    stats_file.write_all(b"\n")?;
    stats_file.flush()?;

    info!(
        dir = %dir.display(),
        chunks = written,
        "Wrote chunk output"
    );

    Ok(OutputFiles {
        chunks: chunks_path,
        stats: stats_path,
    })
}
