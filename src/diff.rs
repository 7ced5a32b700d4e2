//! Diff orchestrator
//!
//! Fetches two filings, extracts one named section from each and runs the
//! sentence differ over them. The chronologically earlier filing is always
//! the base.

use std::sync::Arc;

use async_trait::async_trait;

use crate::edgar::{EdgarClient, Filing, FilingQuery, FilingText, SectionDiff};
use crate::error::{AppError, Result};
use crate::text::{extract_sections, section_text, sentence_diff, DiffResult, SectionName};

/// Where the orchestrator gets filings from
#[async_trait]
pub trait FilingSource: Send + Sync {
    async fn filing_text(&self, accession: &str) -> Result<FilingText>;

    async fn search_filings(&self, cik: &str, query: &FilingQuery) -> Result<Vec<Filing>>;

    /// Zero-padded CIK for a CIK or ticker
    async fn resolve_cik(&self, cik_or_ticker: &str) -> Result<String>;
}

#[async_trait]
impl FilingSource for EdgarClient {
    async fn filing_text(&self, accession: &str) -> Result<FilingText> {
        EdgarClient::filing_text(self, accession).await
    }

    async fn search_filings(&self, cik: &str, query: &FilingQuery) -> Result<Vec<Filing>> {
        EdgarClient::search_filings(self, cik, query).await
    }

    async fn resolve_cik(&self, cik_or_ticker: &str) -> Result<String> {
        EdgarClient::resolve_cik(self, cik_or_ticker).await
    }
}

/// Section diffs over a [`FilingSource`]
#[derive(Clone)]
pub struct DiffService {
    source: Arc<dyn FilingSource>,
}

impl DiffService {
    pub fn new(source: Arc<dyn FilingSource>) -> Self {
        Self { source }
    }

    /// Diff `section` between two filings, oldest first.
    ///
    /// Equal filing dates keep the argument order. A section missing from a
    /// filing diffs as empty text.
    pub async fn diff_section(&self, accession_a: &str, accession_b: &str, section: SectionName) -> Result<SectionDiff> {
        let first = self.source.filing_text(accession_a).await?;
        let second = self.source.filing_text(accession_b).await?;

        let (mut old, mut new) = if second.filed_at < first.filed_at {
            (second, first)
        } else {
            (first, second)
        };

        let old_text = std::mem::take(&mut old.text);
        let new_text = std::mem::take(&mut new.text);
        // Quadratic in sentence count; keep it off the runtime workers
        let result = tokio::task::spawn_blocking(move || diff_named_section(&old_text, &new_text, section))
            .await
            .map_err(|e| AppError::Internal(format!("Section diff task failed: {}", e)))?;

        tracing::info!(
            accession_a = %old.accession,
            accession_b = %new.accession,
            section = %section,
            added = result.added.len(),
            removed = result.removed.len(),
            "Computed section diff"
        );

        Ok(SectionDiff {
            cik: new.cik,
            form: new.form,
            section,
            filed_at_a: old.filed_at,
            filed_at_b: new.filed_at,
            added: result.added,
            removed: result.removed,
            source_urls: vec![old.source_url, new.source_url],
            accession_a: old.accession,
            accession_b: new.accession,
        })
    }

    /// Diff `section` between a company's two most recent filings of `form`
    pub async fn diff_last_two(&self, cik_or_ticker: &str, form: &str, section: SectionName) -> Result<SectionDiff> {
        let cik = self.source.resolve_cik(cik_or_ticker).await?;
        let query = FilingQuery {
            form_types: vec![form.to_string()],
            limit: 2,
            ..Default::default()
        };
        let filings = self.source.search_filings(&cik, &query).await?;

        match filings.as_slice() {
            [latest, previous, ..] => self.diff_section(&previous.accession, &latest.accession, section).await,
            _ => Err(AppError::InsufficientHistory(format!(
                "Need two {} filings for {}, found {}",
                form,
                cik_or_ticker,
                filings.len()
            ))),
        }
    }
}

/// Extract `section` from both texts and diff them
fn diff_named_section(old: &str, new: &str, section: SectionName) -> DiffResult {
    let old_sections = extract_sections(old);
    let new_sections = extract_sections(new);
    let old_text = section_text(old, &old_sections, section);
    let new_text = section_text(new, &new_sections, section);

    if old_text.is_empty() || new_text.is_empty() {
        tracing::debug!(
            section = %section,
            old_found = !old_text.is_empty(),
            new_found = !new_text.is_empty(),
            "Section missing from at least one filing"
        );
    }

    sentence_diff(old_text, new_text)
}
