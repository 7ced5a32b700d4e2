//! EDGAR wire and provenance types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::text::SectionName;

/// Canonical company metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    pub ticker: Option<String>,
    /// Zero-padded 10-digit CIK
    pub cik: String,
}

/// One filing from a company's submissions index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filing {
    pub accession: String,
    pub form: String,
    /// YYYY-MM-DD
    pub filed: String,
    /// Full submission text file
    pub url: String,
}

/// Filters for a filings listing
#[derive(Debug, Clone, Default)]
pub struct FilingQuery {
    /// Form types to keep; empty keeps everything
    pub form_types: Vec<String>,
    /// Inclusive lower bound (YYYY-MM-DD)
    pub start_date: Option<String>,
    /// Inclusive upper bound (YYYY-MM-DD)
    pub end_date: Option<String>,
    pub limit: usize,
}

/// Provenance of one filing's primary document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilingMeta {
    pub accession: String,
    pub cik: String,
    pub form: String,
    /// ISO-8601 UTC
    pub filed_at: String,
    pub index_url: String,
    pub doc_url: String,
}

/// Normalized text of a filing plus provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilingText {
    pub accession: String,
    pub cik: String,
    pub form: String,
    pub filed_at: String,
    pub source_url: String,
    pub text: String,
}

/// One extracted section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionSlice {
    pub name: SectionName,
    pub start: usize,
    pub end: usize,
    pub heading: String,
    pub text: String,
}

/// Extracted sections of one filing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilingSections {
    pub accession: String,
    pub cik: String,
    pub form: String,
    pub filed_at: String,
    pub source_url: String,
    pub sections: Vec<SectionSlice>,
}

/// Sentence-level diff of one section across two filings.
///
/// `a` is always the earlier filing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionDiff {
    pub accession_a: String,
    pub accession_b: String,
    pub cik: String,
    pub form: String,
    pub section: SectionName,
    pub filed_at_a: String,
    pub filed_at_b: String,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub source_urls: Vec<String>,
}

/// Headline financial facts for one period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialsSnapshot {
    pub period: String,
    pub income_statement: BTreeMap<String, Option<f64>>,
    pub balance_sheet: BTreeMap<String, Option<f64>>,
    pub cash_flow: BTreeMap<String, Option<f64>>,
    pub derived: BTreeMap<String, Option<f64>>,
}
