//! Route handlers.

use crate::error::ApiError;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use docsearch_knowledge::Pipeline;
use futures::StreamExt;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// `POST /api/vector-search`
///
/// The body is read raw so that a missing or malformed payload is reported
/// as a caller error by the pipeline rather than rejected by an extractor.
pub async fn vector_search(
    State(pipeline): State<Arc<Pipeline>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("vector_search", %request_id);

    async move {
        tracing::info!("Handling vector search request ({} bytes)", body.len());

        let answer = pipeline.handle(&body).await.map_err(|e| {
            e.log();
            ApiError(e)
        })?;

        tracing::info!("Streaming answer");

        let stream = answer.map(|fragment| Ok::<_, Infallible>(Bytes::from(fragment)));
        Ok::<_, ApiError>(
            (
                [(CONTENT_TYPE, "text/plain; charset=utf-8")],
                Body::from_stream(stream),
            )
                .into_response(),
        )
    }
    .instrument(span)
    .await
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}
