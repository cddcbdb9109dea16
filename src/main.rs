//! Document Chunking Service - Main Entry Point

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docchunk::api::{self, AppState};
use docchunk::jobs;
use docchunk::types::ChunkingConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "docchunk=info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = ChunkingConfig::from_env();

    info!("Starting Document Chunking Service v{}", env!("CARGO_PKG_VERSION"));
    info!(
        profile = %config.active_profile,
        concurrency = config.max_concurrent_documents,
        output_dir = %config.output_dir,
        "Loaded configuration"
    );

    let port = config.port;
    let state = Arc::new(AppState::new(config));

    // Finished jobs are kept for an hour
    jobs::spawn_cleanup(
        Arc::clone(&state.job_store),
        Duration::from_secs(600),
        chrono::Duration::hours(1),
    );

    let app = api::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
