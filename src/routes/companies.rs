//! Company lookup, filings listings and financials

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;

use super::split_list;
use crate::edgar::{Company, Filing, FilingQuery, FinancialsSnapshot};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Create the companies router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(find_company))
        .route("/:cik/filings", get(list_filings))
        .route("/:cik/financials", get(get_financials))
}

#[derive(Debug, Deserialize)]
pub struct CompanyQuery {
    /// Ticker, CIK or company name fragment
    pub query: String,
}

async fn find_company(State(state): State<AppState>, Query(params): Query<CompanyQuery>) -> Result<Json<Company>> {
    let company = state.edgar().find_company(&params.query).await?;
    Ok(Json(company))
}

/// Query parameters for a filings listing
#[derive(Debug, Deserialize)]
pub struct FilingsQuery {
    /// Comma-separated form types (e.g. `10-K,10-Q`)
    #[serde(default)]
    pub form_types: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    10
}

fn check_date(name: &str, value: Option<String>) -> Result<Option<String>> {
    match value {
        Some(date) if NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_err() => Err(AppError::BadRequest(format!(
            "{} must be YYYY-MM-DD, got '{}'",
            name, date
        ))),
        other => Ok(other),
    }
}

async fn list_filings(
    State(state): State<AppState>,
    Path(cik): Path<String>,
    Query(params): Query<FilingsQuery>,
) -> Result<Json<Vec<Filing>>> {
    let query = FilingQuery {
        form_types: params
            .form_types
            .as_deref()
            .map(|raw| split_list(raw).into_iter().map(String::from).collect())
            .unwrap_or_default(),
        start_date: check_date("start_date", params.start_date)?,
        end_date: check_date("end_date", params.end_date)?,
        limit: params.limit,
    };

    let cik = state.edgar().resolve_cik(&cik).await?;
    let filings = state.edgar().search_filings(&cik, &query).await?;
    Ok(Json(filings))
}

#[derive(Debug, Deserialize)]
pub struct FinancialsQuery {
    /// `FY2023`, `Q1 2024`; anything else selects the latest facts
    #[serde(default)]
    pub period: Option<String>,
}

async fn get_financials(
    State(state): State<AppState>,
    Path(cik): Path<String>,
    Query(params): Query<FinancialsQuery>,
) -> Result<Json<FinancialsSnapshot>> {
    let cik = state.edgar().resolve_cik(&cik).await?;
    let period = params.period.unwrap_or_else(|| "latest".to_string());
    let snapshot = state.edgar().get_financials(&cik, &period).await?;
    Ok(Json(snapshot))
}
