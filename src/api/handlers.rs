//! HTTP request handlers for the chunking service.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::batch::{BatchConfig, BatchProcessor, ChunkRun};
use crate::jobs::{JobProcessor, JobStore};
use crate::output::StatsSidecar;
use crate::registry::ProfileRegistry;
use crate::types::{
    ChunkRequest, ChunkingConfig, ChunkingProfile, ProfileSelector, StartChunkJobResponse,
};

/// Application state shared across handlers.
pub struct AppState {
    pub processor: Arc<BatchProcessor>,
    pub job_store: Arc<RwLock<JobStore>>,
    pub config: ChunkingConfig,
}

impl AppState {
    /// Build state with the built-in profile registry.
    pub fn new(config: ChunkingConfig) -> Self {
        let processor = BatchProcessor::new(
            Arc::new(ProfileRegistry::builtin()),
            BatchConfig::from(&config),
        );
        Self {
            processor: Arc::new(processor),
            job_store: Arc::new(RwLock::new(JobStore::new())),
            config,
        }
    }

    /// Profile selector for a request, falling back to the active profile.
    fn selector(&self, requested: Option<ProfileSelector>) -> ProfileSelector {
        requested.unwrap_or_else(|| ProfileSelector::named(self.config.active_profile.as_str()))
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
    active_profile: String,
}

/// Health check endpoint.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        active_profile: state.config.active_profile.clone(),
    })
}

/// List registered profiles.
pub async fn list_profiles(State(state): State<Arc<AppState>>) -> Json<Vec<ChunkingProfile>> {
    Json(state.processor.registry().list().to_vec())
}

/// Get one registered profile by name.
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ChunkingProfile>, StatusCode> {
    state
        .processor
        .registry()
        .get(&name)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// Chunk documents and return the chunks with run statistics.
pub async fn chunk_documents(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChunkRequest>,
) -> Json<ChunkRun> {
    info!(documents = request.documents.len(), "Received chunk request");

    let selector = state.selector(request.profile);
    let run = state
        .processor
        .run_concurrent(request.documents, &selector)
        .await;

    Json(run)
}

/// Trailing record of a chunk stream.
#[derive(Debug, Serialize)]
pub struct StreamSummary {
    summary: StatsSidecar,
}

/// Chunk documents and stream the chunks back as JSON Lines, followed by one
/// `{"summary": ...}` record carrying statistics, warnings and failures.
pub async fn chunk_stream(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChunkRequest>,
) -> Response {
    info!(documents = request.documents.len(), "Received chunk stream request");

    let selector = state.selector(request.profile);
    let run = state
        .processor
        .run_concurrent(request.documents, &selector)
        .await;

    let summary = StreamSummary {
        summary: StatsSidecar {
            stats: run.stats,
            warnings: run.warnings,
            failures: run.failures,
        },
    };
    let records = run
        .chunks
        .into_iter()
        .map(serde_json::to_value)
        .chain(std::iter::once(serde_json::to_value(summary)));

    let lines = stream::iter(records).map(|record| {
        record.and_then(|value| serde_json::to_vec(&value)).map(|mut line| {
            line.push(b'\n');
            Bytes::from(line)
        })
    });

    (
        [(header::CONTENT_TYPE, "application/x-ndjson")],
        Body::from_stream(lines),
    )
        .into_response()
}

/// Start a background chunking job.
pub async fn start_chunk_job(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChunkRequest>,
) -> Json<StartChunkJobResponse> {
    let documents_count = request.documents.len();

    if documents_count == 0 {
        return Json(StartChunkJobResponse {
            job_id: Uuid::nil(),
            accepted: false,
            documents_count: 0,
            message: Some("No documents provided".to_string()),
        });
    }

    let job_id = state.job_store.write().await.create_job(documents_count);
    info!(job_id = %job_id, documents = documents_count, "Received chunk job request");

    let processor = JobProcessor::new(
        Arc::clone(&state.processor),
        state.config.output_dir.clone(),
        state.config.active_profile.clone(),
    );
    let job_store = Arc::clone(&state.job_store);

    tokio::spawn(async move {
        processor.process_job(job_id, request, job_store).await;
    });

    Json(StartChunkJobResponse {
        job_id,
        accepted: true,
        documents_count,
        message: None,
    })
}

/// Get job status.
pub async fn get_job_status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, StatusCode> {
    let store = state.job_store.read().await;

    match store.get_job_status(job_id) {
        Some(status) => Ok(Json(status)),
        None => Err(StatusCode::NOT_FOUND),
    }
}
