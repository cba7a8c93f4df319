//! Mapping of pipeline failures onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use docsearch_core::PipelineError;
use serde::Serialize;
use serde_json::Value;

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A failed request, ready to be rendered.
///
/// Caller errors become 400 with their message and data. System errors
/// become 500 with the generic message only.
#[derive(Debug)]
pub struct ApiError(pub PipelineError);

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_caller() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = ErrorBody {
            error: self.0.public_message().to_string(),
            data: match self.0 {
                PipelineError::Caller { data, .. } => data,
                PipelineError::System { .. } => None,
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsearch_core::GENERIC_SYSTEM_MESSAGE;

    async fn render(err: PipelineError) -> (StatusCode, Value) {
        let response = ApiError(err).into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_caller_error_with_data() {
        let (status, body) = render(PipelineError::caller_with_data(
            "Flagged content",
            serde_json::json!({ "flagged": true, "categories": { "hate": true } }),
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Flagged content");
        assert_eq!(body["data"]["categories"]["hate"], true);
    }

    #[tokio::test]
    async fn test_caller_error_without_data_omits_field() {
        let (status, body) = render(PipelineError::caller("Missing request data")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({ "error": "Missing request data" }));
    }

    #[tokio::test]
    async fn test_system_error_hides_detail() {
        let (status, body) = render(PipelineError::system(
            "Pipeline failed while embedding",
            "Embedding API error (401): invalid key sk-live",
        ))
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "error": GENERIC_SYSTEM_MESSAGE }));
    }
}
