//! Output module for persisting chunk runs.

mod jsonl;

pub use jsonl::{
    to_jsonl, write_run, JsonlWriter, OutputFiles, StatsSidecar, CHUNKS_FILE, STATS_FILE,
};
