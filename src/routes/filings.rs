//! Filing text and section extraction

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::{parse_section, split_list};
use crate::edgar::{FilingSections, FilingText};
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::text::SectionName;

/// Create the filings router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:accession/text", get(filing_text))
        .route("/:accession/sections", get(filing_sections))
}

async fn filing_text(State(state): State<AppState>, Path(accession): Path<String>) -> Result<Json<FilingText>> {
    let filing = state.edgar().filing_text(&accession).await?;
    Ok(Json(filing))
}

/// Query parameters for section extraction
#[derive(Debug, Deserialize)]
pub struct SectionsQuery {
    /// Comma-separated section names; all found sections when absent
    #[serde(default)]
    pub sections: Option<String>,
    /// Fail with `NO_SECTIONS` instead of returning an empty list
    #[serde(default)]
    pub strict: bool,
}

fn parse_sections(raw: Option<&str>) -> Result<Option<Vec<SectionName>>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let names = split_list(raw)
        .into_iter()
        .map(parse_section)
        .collect::<Result<Vec<_>>>()?;
    Ok(if names.is_empty() { None } else { Some(names) })
}

async fn filing_sections(
    State(state): State<AppState>,
    Path(accession): Path<String>,
    Query(params): Query<SectionsQuery>,
) -> Result<Json<FilingSections>> {
    let wanted = parse_sections(params.sections.as_deref())?;
    let sections = state.edgar().get_sections(&accession, wanted.as_deref()).await?;

    if params.strict && sections.sections.is_empty() {
        return Err(AppError::NoSections(format!(
            "No recognized section headings in {}",
            accession
        )));
    }

    Ok(Json(sections))
}
