//! HTTP surface of the chunking service.

pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

pub use handlers::AppState;

/// Build the service routes over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Chunking
        .route("/chunk", post(handlers::chunk_documents))
        .route("/chunk/stream", post(handlers::chunk_stream))
        // Chunking jobs
        .route("/chunk/jobs", post(handlers::start_chunk_job))
        .route("/chunk/jobs/:job_id", get(handlers::get_job_status))
        // Profiles
        .route("/chunk/profiles", get(handlers::list_profiles))
        .route("/chunk/profiles/:name", get(handlers::get_profile))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::types::{ChunkJobStatus, ChunkingConfig};

    fn app(output_dir: &std::path::Path) -> Router {
        let config = ChunkingConfig {
            output_dir: output_dir.display().to_string(),
            ..ChunkingConfig::default()
        };
        router(Arc::new(AppState::new(config)))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_profiles_endpoints() {
        let dir = tempfile::tempdir().unwrap();

        let response = app(dir.path())
            .oneshot(Request::get("/chunk/profiles").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let names: Vec<String> = body_json(response)
            .await
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["default", "code-heavy", "faq", "large-context", "granular"]
        );

        let response = app(dir.path())
            .oneshot(Request::get("/chunk/profiles/faq").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_json(response).await["max_tokens"], 800);

        let response = app(dir.path())
            .oneshot(Request::get("/chunk/profiles/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_chunk_endpoint_with_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let request = post_json(
            "/chunk",
            json!({
                "documents": [{ "path": "guide.md", "content": "# Guide\n\n## Setup\n\nShort setup text." }],
                "profile": "missing"
            }),
        );

        let response = app(dir.path()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let run = body_json(response).await;
        assert_eq!(run["chunks"].as_array().unwrap().len(), 1);
        assert_eq!(run["chunks"][0]["heading_path"], "setup");
        assert_eq!(run["stats"]["profile"], "default");
        assert_eq!(run["warnings"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_stream_endpoint_emits_ndjson() {
        let dir = tempfile::tempdir().unwrap();
        let request = post_json(
            "/chunk/stream",
            json!({
                "documents": [
                    { "path": "a.md", "content": "# A\n\nalpha" },
                    { "path": "b.md", "content": "beta" }
                ],
                "profile": "not-a-real-profile"
            }),
        );

        let response = app(dir.path()).oneshot(request).await.unwrap();
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/x-ndjson"
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        let records: Vec<Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(records.len(), 3);

        let paths: Vec<&str> = records[..2]
            .iter()
            .map(|r| r["source_path"].as_str().unwrap())
            .collect();
        assert_eq!(paths, vec!["a.md", "b.md"]);

        let summary = &records[2]["summary"];
        assert_eq!(summary["profile"], "default");
        assert_eq!(summary["total_chunks"], 2);
        assert_eq!(summary["failures"].as_array().unwrap().len(), 0);
        let warnings = summary["warnings"].as_array().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].as_str().unwrap().contains("not-a-real-profile"));
    }

    #[tokio::test]
    async fn test_job_lifecycle_over_http() {
        let dir = tempfile::tempdir().unwrap();
        let state = Arc::new(AppState::new(ChunkingConfig {
            output_dir: dir.path().display().to_string(),
            ..ChunkingConfig::default()
        }));

        let empty = router(Arc::clone(&state))
            .oneshot(post_json("/chunk/jobs", json!({ "documents": [] })))
            .await
            .unwrap();
        assert_eq!(body_json(empty).await["accepted"], false);

        let response = router(Arc::clone(&state))
            .oneshot(post_json(
                "/chunk/jobs",
                json!({ "documents": [{ "path": "a.md", "content": "alpha" }] }),
            ))
            .await
            .unwrap();
        let accepted = body_json(response).await;
        assert_eq!(accepted["accepted"], true);
        let job_id: uuid::Uuid = serde_json::from_value(accepted["job_id"].clone()).unwrap();

        let mut status = None;
        for _ in 0..100 {
            let current = state.job_store.read().await.get_job_status(job_id).unwrap();
            if current.status == ChunkJobStatus::Completed {
                status = Some(current);
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        let status = status.unwrap();
        assert_eq!(status.chunks_created, 1);

        let response = router(state)
            .oneshot(
                Request::get(format!("/chunk/jobs/{job_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_json(response).await["status"], "completed");
    }
}
