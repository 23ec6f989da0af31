//! Error types for tagcluster-engine
//!
//! `MatchError` covers the failures that abort a matching invocation.
//! Per-track tag lookup failures never reach this type; the pipeline
//! absorbs them (see `tags::TagFetchError`).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::tags::TagFetchError;

/// Fatal errors for one matching invocation
#[derive(Debug, Error)]
pub enum MatchError {
    /// No API credential is available for the tag provider
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    /// Caller requested a clustering strategy that is not implemented
    #[error("Unsupported clustering algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Caller-supplied option is out of range
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Clustering could not run on the given vectors
    #[error("Clustering failed: {0}")]
    Clustering(String),

    /// Tag provider could not be constructed
    #[error("Tag provider unavailable: {0}")]
    Provider(String),
}

/// Result type for matching operations
pub type MatchResult<T> = Result<T, MatchError>;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Upstream tag service failed (502)
    #[error("Upstream error: {0}")]
    Upstream(#[from] TagFetchError),

    /// Matching pipeline error
    #[error(transparent)]
    Match(#[from] MatchError),
}

impl ApiError {
    /// HTTP status and machine-readable code for this error
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            ApiError::Match(MatchError::InvalidInput(_)) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST")
            }
            ApiError::Match(MatchError::MissingConfiguration(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "MISSING_CONFIGURATION",
            ),
            ApiError::Match(MatchError::UnsupportedAlgorithm(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "UNSUPPORTED_ALGORITHM",
            ),
            ApiError::Match(MatchError::Clustering(_))
            | ApiError::Match(MatchError::Provider(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();
        let message = self.to_string();

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
