//! Route modules for the Filing Diff server

pub mod companies;
pub mod diff;
pub mod filings;
pub mod health;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;
use crate::text::SectionName;

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(health::router())
        .nest("/api/v1/companies", companies::router())
        .nest("/api/v1/filings", filings::router())
        .nest("/api/v1/diff", diff::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Comma-separated values, trimmed, empties dropped
pub(crate) fn split_list(raw: &str) -> Vec<&str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).collect()
}

pub(crate) fn parse_section(raw: &str) -> Result<SectionName, AppError> {
    raw.parse().map_err(AppError::BadRequest)
}
