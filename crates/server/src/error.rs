// crates/server/src/error.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Structured JSON error response for API errors
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// API error types that map to HTTP status codes
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Company not found: {0}")]
    CompanyNotFound(String),

    #[error("Chart not found: {0}")]
    ChartNotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            ApiError::CompanyNotFound(name) => {
                tracing::debug!(company = %name, "Company not found");
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::with_details("Company not found", format!("Company: {}", name)),
                )
            }
            ApiError::ChartNotFound(file) => {
                tracing::debug!(file = %file, "Chart not found");
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::with_details("Chart not found", format!("File: {}", file)),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!(message = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_details("Internal server error", msg.clone()),
                )
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!(message = %msg, "Bad request");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::with_details("Bad request", msg.clone()),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn extract_response(error: ApiError) -> (StatusCode, ErrorResponse) {
        let response = error.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let error_response: ErrorResponse = serde_json::from_slice(&body).unwrap();
        (status, error_response)
    }

    #[tokio::test]
    async fn test_company_not_found() {
        let (status, body) = extract_response(ApiError::CompanyNotFound("Acme".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "Company not found");
        assert_eq!(body.details.as_deref(), Some("Company: Acme"));
    }

    #[tokio::test]
    async fn test_chart_not_found() {
        let (status, body) = extract_response(ApiError::ChartNotFound("x.png".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "Chart not found");
    }

    #[tokio::test]
    async fn test_bad_request() {
        let (status, body) = extract_response(ApiError::BadRequest("empty name".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.details.as_deref(), Some("empty name"));
    }

    #[tokio::test]
    async fn test_internal_error() {
        let (status, body) = extract_response(ApiError::Internal("disk gone".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Internal server error");
        assert_eq!(body.details.as_deref(), Some("disk gone"));
    }
}
