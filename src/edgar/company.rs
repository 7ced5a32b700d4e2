//! Ticker / CIK resolution

use serde::Deserialize;
use serde_json::Value;

use super::client::{zero_pad_cik, EdgarClient, TICKER_TTL};
use super::types::Company;
use crate::error::{AppError, Result};

/// One row of `company_tickers.json`
#[derive(Debug, Clone, Deserialize)]
struct TickerRecord {
    cik_str: u64,
    ticker: String,
    title: String,
}

impl From<&TickerRecord> for Company {
    fn from(record: &TickerRecord) -> Self {
        Company {
            name: record.title.clone(),
            ticker: Some(record.ticker.clone()),
            cik: format!("{:010}", record.cik_str),
        }
    }
}

/// Rows in file order (the map is keyed "0", "1", ...)
fn ticker_records(data: Value) -> Result<Vec<TickerRecord>> {
    let map: std::collections::HashMap<String, TickerRecord> = serde_json::from_value(data)
        .map_err(|e| AppError::Internal(format!("Unexpected company_tickers.json layout: {}", e)))?;

    let mut rows: Vec<(u64, TickerRecord)> = map
        .into_iter()
        .map(|(index, record)| (index.parse().unwrap_or(u64::MAX), record))
        .collect();
    rows.sort_by_key(|(index, _)| *index);

    Ok(rows.into_iter().map(|(_, record)| record).collect())
}

/// Match by ticker, then numeric CIK, then title substring
fn match_company(records: &[TickerRecord], query: &str) -> Option<Company> {
    let q = query.trim().to_uppercase();
    if q.is_empty() {
        return None;
    }

    if let Some(record) = records.iter().find(|r| r.ticker.to_uppercase() == q) {
        return Some(record.into());
    }

    if q.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(cik) = q.parse::<u64>() {
            if let Some(record) = records.iter().find(|r| r.cik_str == cik) {
                return Some(record.into());
            }
        }
    }

    let needle = q.to_lowercase();
    records
        .iter()
        .find(|r| r.title.to_lowercase().contains(&needle))
        .map(Company::from)
}

impl EdgarClient {
    /// Resolve a ticker, company name or CIK
    pub async fn find_company(&self, query: &str) -> Result<Company> {
        let url = self.urls.company_tickers();
        let data = self.fetcher.fetch_json(&url, "company_tickers", TICKER_TTL).await?;
        let records = ticker_records(data)?;

        match_company(&records, query).ok_or_else(|| {
            tracing::debug!(query = %query, "Company not found");
            AppError::NotFound(format!("Company not found: {}", query))
        })
    }

    /// Numeric input is taken as a CIK directly; anything else is looked up
    pub async fn resolve_cik(&self, cik_or_ticker: &str) -> Result<String> {
        let trimmed = cik_or_ticker.trim();
        if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
            return zero_pad_cik(trimmed);
        }
        Ok(self.find_company(trimmed).await?.cik)
    }
}
