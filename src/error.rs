//! Error types for the Filing Diff server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::fetch::FetchError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Network, HTTP or parse failure that survived every retry
    #[error("Fetch failed: {0}")]
    FetchFailure(#[from] FetchError),

    /// Identifier resolves to nothing
    #[error("Not found: {0}")]
    NotFound(String),

    /// No recognized section headings in a filing
    #[error("No sections: {0}")]
    NoSections(String),

    /// Fewer than two filings available to diff
    #[error("Insufficient history: {0}")]
    InsufficientHistory(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Machine-readable error kind
    pub fn code(&self) -> &'static str {
        match self {
            AppError::FetchFailure(_) => "FETCH_FAILURE",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::NoSections(_) => "NO_SECTIONS",
            AppError::InsufficientHistory(_) => "INSUFFICIENT_HISTORY",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::FetchFailure(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::NoSections(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InsufficientHistory(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Suggested client backoff, only for upstream throttling
    fn retry_after_ms(&self) -> Option<u64> {
        match self {
            AppError::FetchFailure(FetchError::Exhausted { last, .. })
                if matches!(**last, FetchError::Status { status: 429 | 503, .. }) =>
            {
                Some(2_000)
            }
            _ => None,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub error_code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_ms: Option<u64>,
}

impl From<&AppError> for ErrorPayload {
    fn from(err: &AppError) -> Self {
        let hint = match err {
            AppError::FetchFailure(e) => e.to_string(),
            AppError::NotFound(msg)
            | AppError::NoSections(msg)
            | AppError::InsufficientHistory(msg)
            | AppError::BadRequest(msg) => msg.clone(),
            AppError::Internal(_) => "An internal error occurred".to_string(),
        };

        ErrorPayload {
            error_code: err.code(),
            hint: Some(hint),
            retry_after_ms: err.retry_after_ms(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::FetchFailure(e) => tracing::error!("Fetch failure: {}", e),
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            other => tracing::debug!("Request failed: {}", other),
        }

        (self.status(), Json(ErrorPayload::from(&self))).into_response()
    }
}
