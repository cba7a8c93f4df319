//! HTTP surface for docsearch.
//!
//! Exposes `POST /api/vector-search`, which streams the answer as plain
//! text, and `GET /health`.

pub mod error;
pub mod routes;

pub use error::{ApiError, ErrorBody};

use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use docsearch_core::{AppError, AppResult};
use docsearch_knowledge::Pipeline;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the application router around a shared pipeline.
pub fn router(pipeline: Arc<Pipeline>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/api/vector-search", post(routes::vector_search))
        .route("/health", get(routes::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(pipeline)
}

/// Serve until interrupted.
pub async fn run(bind: &str, pipeline: Arc<Pipeline>) -> AppResult<()> {
    let addr: SocketAddr = bind
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid bind address {}: {}", bind, e)))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(pipeline))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
