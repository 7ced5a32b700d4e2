//! SEC EDGAR data access
//!
//! Ticker resolution, filings listings, filing text and XBRL financials, all
//! routed through the shared [`Fetcher`](crate::fetch::Fetcher).

mod client;
mod company;
mod filing_text;
mod filings;
mod financials;
mod types;

pub use client::{zero_pad_cik, EdgarClient, EdgarUrls, DOCUMENT_TTL, FACTS_TTL, FILINGS_TTL, TICKER_TTL};
pub use filing_text::slice_filing;
pub use financials::{parse_period, snapshot_from_facts, FiscalPeriod};
pub use types::{
    Company, Filing, FilingMeta, FilingQuery, FilingSections, FilingText, FinancialsSnapshot, SectionDiff,
    SectionSlice,
};
