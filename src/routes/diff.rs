//! Section diff endpoints

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::parse_section;
use crate::edgar::SectionDiff;
use crate::error::Result;
use crate::state::AppState;

/// Create the diff router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(diff_section))
        .route("/latest", get(diff_latest))
}

#[derive(Debug, Deserialize)]
pub struct DiffQuery {
    pub accession_a: String,
    pub accession_b: String,
    pub section: String,
}

async fn diff_section(State(state): State<AppState>, Query(params): Query<DiffQuery>) -> Result<Json<SectionDiff>> {
    let section = parse_section(&params.section)?;
    let diff = state
        .diff()
        .diff_section(&params.accession_a, &params.accession_b, section)
        .await?;
    Ok(Json(diff))
}

#[derive(Debug, Deserialize)]
pub struct LatestDiffQuery {
    pub cik_or_ticker: String,
    #[serde(default = "default_form")]
    pub form: String,
    pub section: String,
}

fn default_form() -> String {
    "10-K".to_string()
}

async fn diff_latest(
    State(state): State<AppState>,
    Query(params): Query<LatestDiffQuery>,
) -> Result<Json<SectionDiff>> {
    let section = parse_section(&params.section)?;
    let diff = state
        .diff()
        .diff_last_two(&params.cik_or_ticker, &params.form, section)
        .await?;
    Ok(Json(diff))
}
