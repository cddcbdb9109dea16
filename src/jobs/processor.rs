//! Job processor for background chunking runs.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

use super::store::JobStore;
use crate::batch::BatchProcessor;
use crate::output;
use crate::types::{ChunkRequest, ProfileSelector};

/// Processor that runs chunking jobs and writes their output to disk.
pub struct JobProcessor {
    batch: Arc<BatchProcessor>,
    output_root: PathBuf,
    default_profile: String,
}

impl JobProcessor {
    pub fn new(
        batch: Arc<BatchProcessor>,
        output_root: impl Into<PathBuf>,
        default_profile: impl Into<String>,
    ) -> Self {
        Self {
            batch,
            output_root: output_root.into(),
            default_profile: default_profile.into(),
        }
    }

    /// Directory a job's files are written to.
    pub fn job_dir(&self, job_id: Uuid) -> PathBuf {
        self.output_root.join(job_id.to_string())
    }

    /// Process a chunking job, recording progress in the shared store.
    pub async fn process_job(
        &self,
        job_id: Uuid,
        request: ChunkRequest,
        job_store: Arc<RwLock<JobStore>>,
    ) {
        info!(job_id = %job_id, documents = request.documents.len(), "Starting job processing");

        job_store.write().await.start_job(job_id);

        let selector = request
            .profile
            .unwrap_or_else(|| ProfileSelector::named(self.default_profile.as_str()));
        let run = self
            .batch
            .run_concurrent(request.documents, &selector)
            .await;

        let dir = self.job_dir(job_id);
        let written = {
            let dir = dir.clone();
            tokio::task::spawn_blocking(move || output::write_run(&dir, &run).map(|_| run)).await
        };

        let mut store = job_store.write().await;
        match written {
            Ok(Ok(run)) => {
                info!(
                    job_id = %job_id,
                    chunks = run.stats.total_chunks,
                    failed = run.stats.failed_documents,
                    "Job processing complete"
                );
                store.complete_job(
                    job_id,
                    run.stats.total_chunks,
                    run.stats.failed_documents,
                    dir.display().to_string(),
                );
            }
            Ok(Err(e)) => {
                error!(job_id = %job_id, error = %e, "Failed to write job output");
                store.fail_job(job_id, e.to_string());
            }
            Err(e) => {
                error!(job_id = %job_id, error = %e, "Output task aborted");
                store.fail_job(job_id, e.to_string());
            }
        }
    }
}
