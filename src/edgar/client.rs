//! EDGAR client
//!
//! Thin mapping layer over the resilient fetcher: builds EDGAR URLs, picks
//! cache keys and TTLs, and reshapes the provider's JSON.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::fetch::Fetcher;

/// Ticker map changes rarely
pub const TICKER_TTL: Duration = Duration::from_secs(7 * 24 * 3600);
/// Submissions index
pub const FILINGS_TTL: Duration = Duration::from_secs(24 * 3600);
/// XBRL company facts
pub const FACTS_TTL: Duration = Duration::from_secs(7 * 24 * 3600);
/// Filed documents never change
pub const DOCUMENT_TTL: Duration = Duration::from_secs(30 * 24 * 3600);

/// Base URLs of the two EDGAR hosts
#[derive(Debug, Clone)]
pub struct EdgarUrls {
    /// JSON APIs (`https://data.sec.gov`)
    pub data_base: String,
    /// Archives and static files (`https://www.sec.gov`)
    pub www_base: String,
}

impl Default for EdgarUrls {
    fn default() -> Self {
        Self {
            data_base: "https://data.sec.gov".to_string(),
            www_base: "https://www.sec.gov".to_string(),
        }
    }
}

impl EdgarUrls {
    pub fn company_tickers(&self) -> String {
        format!("{}/files/company_tickers.json", self.www_base.trim_end_matches('/'))
    }

    pub fn submissions(&self, cik10: &str) -> String {
        format!("{}/submissions/CIK{}.json", self.data_base.trim_end_matches('/'), cik10)
    }

    pub fn company_facts(&self, cik10: &str) -> String {
        format!(
            "{}/api/xbrl/companyfacts/CIK{}.json",
            self.data_base.trim_end_matches('/'),
            cik10
        )
    }

    /// Directory holding one submission's documents
    pub fn archive_dir(&self, cik10: &str, accession: &str) -> String {
        format!(
            "{}/Archives/edgar/data/{}/{}",
            self.www_base.trim_end_matches('/'),
            cik10.parse::<u64>().map(|v| v.to_string()).unwrap_or_else(|_| cik10.to_string()),
            accession.replace('-', "")
        )
    }

    /// Full submission text file
    pub fn filing_index(&self, cik10: &str, accession: &str) -> String {
        format!("{}/{}.txt", self.archive_dir(cik10, accession), accession)
    }
}

/// Parse a CIK and pad it to 10 digits
pub fn zero_pad_cik(cik: &str) -> Result<String> {
    let value: u64 = cik
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid CIK '{}'", cik)))?;
    Ok(format!("{:010}", value))
}

/// EDGAR data access built on the shared fetcher
#[derive(Clone)]
pub struct EdgarClient {
    pub(crate) fetcher: Arc<Fetcher>,
    pub(crate) urls: EdgarUrls,
}

impl EdgarClient {
    pub fn new(fetcher: Arc<Fetcher>, urls: EdgarUrls) -> Self {
        Self { fetcher, urls }
    }
}
