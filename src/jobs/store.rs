//! Job store for tracking chunking job status.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

use crate::types::{ChunkJobStatus, ChunkJobStatusResponse};

/// In-memory job store for tracking chunking jobs.
pub struct JobStore {
    jobs: HashMap<Uuid, JobRecord>,
}

/// Internal record for tracking a job.
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub job_id: Uuid,
    pub status: ChunkJobStatus,
    pub total_documents: usize,
    pub failed_documents: usize,
    pub chunks_created: usize,
    pub output_dir: Option<String>,
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl JobRecord {
    pub fn new(job_id: Uuid, total_documents: usize) -> Self {
        Self {
            job_id,
            status: ChunkJobStatus::Pending,
            total_documents,
            failed_documents: 0,
            chunks_created: 0,
            output_dir: None,
            error: None,
            started_at: None,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn start(&mut self) {
        self.status = ChunkJobStatus::Running;
        self.started_at = Some(Utc::now());
    }

    /// Mark the job as completed with its run totals.
    pub fn complete(&mut self, chunks: usize, failed: usize, output_dir: String) {
        self.status = ChunkJobStatus::Completed;
        self.chunks_created = chunks;
        self.failed_documents = failed;
        self.output_dir = Some(output_dir);
        self.completed_at = Some(Utc::now());
    }

    pub fn fail(&mut self, error: String) {
        self.status = ChunkJobStatus::Failed;
        self.error = Some(error);
        self.completed_at = Some(Utc::now());
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self.status,
            ChunkJobStatus::Completed | ChunkJobStatus::Failed
        )
    }

    pub fn to_response(&self) -> ChunkJobStatusResponse {
        ChunkJobStatusResponse {
            job_id: self.job_id,
            status: self.status,
            total_documents: self.total_documents,
            failed_documents: self.failed_documents,
            chunks_created: self.chunks_created,
            output_dir: self.output_dir.clone(),
            error: self.error.clone(),
            started_at: self.started_at,
            completed_at: self.completed_at,
        }
    }
}

impl JobStore {
    pub fn new() -> Self {
        Self {
            jobs: HashMap::new(),
        }
    }

    /// Create a new job and return its ID.
    pub fn create_job(&mut self, total_documents: usize) -> Uuid {
        let job_id = Uuid::new_v4();
        self.jobs.insert(job_id, JobRecord::new(job_id, total_documents));
        job_id
    }

    pub fn get_job(&self, job_id: Uuid) -> Option<&JobRecord> {
        self.jobs.get(&job_id)
    }

    pub fn start_job(&mut self, job_id: Uuid) -> bool {
        self.update(job_id, JobRecord::start)
    }

    pub fn complete_job(
        &mut self,
        job_id: Uuid,
        chunks: usize,
        failed: usize,
        output_dir: String,
    ) -> bool {
        self.update(job_id, |job| job.complete(chunks, failed, output_dir))
    }

    pub fn fail_job(&mut self, job_id: Uuid, error: String) -> bool {
        self.update(job_id, |job| job.fail(error))
    }

    /// Get job status as response.
    pub fn get_job_status(&self, job_id: Uuid) -> Option<ChunkJobStatusResponse> {
        self.jobs.get(&job_id).map(JobRecord::to_response)
    }

    /// Drop finished jobs that completed before `max_age` ago.
    pub fn cleanup_old_jobs(&mut self, max_age: chrono::Duration) {
        let cutoff = Utc::now() - max_age;
        self.jobs.retain(|_, job| {
            !job.is_finished() || job.completed_at.map_or(true, |t| t > cutoff)
        });
    }

    /// Get count of jobs by status.
    pub fn get_job_counts(&self) -> HashMap<ChunkJobStatus, usize> {
        let mut counts = HashMap::new();
        for job in self.jobs.values() {
            *counts.entry(job.status).or_insert(0) += 1;
        }
        counts
    }

    fn update(&mut self, job_id: Uuid, apply: impl FnOnce(&mut JobRecord)) -> bool {
        match self.jobs.get_mut(&job_id) {
            Some(job) => {
                apply(job);
                true
            }
            None => false,
        }
    }
}

/// Periodically drop finished jobs older than `max_age` from the shared store.
pub fn spawn_cleanup(
    store: Arc<RwLock<JobStore>>,
    every: Duration,
    max_age: chrono::Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let mut store = store.write().await;
            store.cleanup_old_jobs(max_age);
            debug!(jobs = ?store.get_job_counts(), "Cleaned up finished jobs");
        }
    })
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_lifecycle() {
        let mut store = JobStore::new();
        let job_id = store.create_job(3);

        let status = store.get_job_status(job_id).unwrap();
        assert_eq!(status.status, ChunkJobStatus::Pending);
        assert_eq!(status.total_documents, 3);
        assert!(status.started_at.is_none());

        assert!(store.start_job(job_id));
        assert_eq!(store.get_job(job_id).unwrap().status, ChunkJobStatus::Running);

        assert!(store.complete_job(job_id, 12, 1, "out/job".to_string()));
        let status = store.get_job_status(job_id).unwrap();
        assert_eq!(status.status, ChunkJobStatus::Completed);
        assert_eq!(status.chunks_created, 12);
        assert_eq!(status.failed_documents, 1);
        assert_eq!(status.output_dir.as_deref(), Some("out/job"));
        assert!(status.completed_at.is_some());
    }

    #[test]
    fn test_unknown_job() {
        let mut store = JobStore::new();
        let missing = Uuid::new_v4();
        assert!(!store.start_job(missing));
        assert!(!store.fail_job(missing, "nope".to_string()));
        assert!(store.get_job_status(missing).is_none());
    }

    #[tokio::test]
    async fn test_scheduled_cleanup_drops_finished_jobs() {
        let store = Arc::new(RwLock::new(JobStore::new()));
        let (done, running) = {
            let mut guard = store.write().await;
            let done = guard.create_job(1);
            guard.complete_job(done, 1, 0, "out".to_string());
            let running = guard.create_job(1);
            guard.start_job(running);
            (done, running)
        };

        let handle = spawn_cleanup(
            Arc::clone(&store),
            Duration::from_millis(10),
            chrono::Duration::zero(),
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();

        let guard = store.read().await;
        assert!(guard.get_job(done).is_none());
        assert!(guard.get_job(running).is_some());
    }

    #[test]
    fn test_cleanup_keeps_running_jobs() {
        let mut store = JobStore::new();
        let running = store.create_job(1);
        store.start_job(running);
        let failed = store.create_job(1);
        store.fail_job(failed, "disk full".to_string());

        store.cleanup_old_jobs(chrono::Duration::zero());

        assert!(store.get_job(running).is_some());
        assert!(store.get_job(failed).is_none());
        assert_eq!(store.get_job_counts().get(&ChunkJobStatus::Running), Some(&1));
    }
}
