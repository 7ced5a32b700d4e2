//! Filings listing from the submissions index

use serde::Deserialize;

use super::client::{zero_pad_cik, EdgarClient, EdgarUrls, FILINGS_TTL};
use super::types::{Filing, FilingQuery};
use crate::error::{AppError, Result};

#[derive(Debug, Default, Deserialize)]
struct Submissions {
    #[serde(default)]
    filings: SubmissionFilings,
}

#[derive(Debug, Default, Deserialize)]
struct SubmissionFilings {
    #[serde(default)]
    recent: RecentFilings,
}

/// Column-oriented "recent filings" block of the submissions index
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RecentFilings {
    pub accession_number: Vec<String>,
    pub form: Vec<String>,
    pub filing_date: Vec<String>,
    pub primary_document: Vec<String>,
}

/// One row of [`RecentFilings`]
pub(crate) struct RecentRow<'a> {
    pub accession: &'a str,
    pub form: &'a str,
    pub filing_date: &'a str,
    pub primary_document: &'a str,
}

impl RecentFilings {
    /// Rows in index order; ragged columns are cut to the shortest
    pub fn rows(&self) -> impl Iterator<Item = RecentRow<'_>> {
        self.accession_number
            .iter()
            .zip(&self.form)
            .zip(&self.filing_date)
            .enumerate()
            .map(move |(i, ((accession, form), filing_date))| RecentRow {
                accession,
                form,
                filing_date,
                primary_document: self.primary_document.get(i).map(String::as_str).unwrap_or(""),
            })
    }
}

/// Apply form/date filters, newest first, truncated to `query.limit`
pub(crate) fn select_filings(
    recent: &RecentFilings,
    cik10: &str,
    query: &FilingQuery,
    urls: &EdgarUrls,
) -> Vec<Filing> {
    let mut rows: Vec<Filing> = recent
        .rows()
        .filter(|row| query.form_types.is_empty() || query.form_types.iter().any(|f| f == row.form))
        .filter(|row| query.start_date.as_deref().map_or(true, |start| row.filing_date >= start))
        .filter(|row| query.end_date.as_deref().map_or(true, |end| row.filing_date <= end))
        .map(|row| Filing {
            accession: row.accession.to_string(),
            form: row.form.to_string(),
            filed: row.filing_date.to_string(),
            url: urls.filing_index(cik10, row.accession),
        })
        .collect();

    // Stable: same-day filings keep index order
    rows.sort_by(|a, b| b.filed.cmp(&a.filed));
    rows.truncate(query.limit);
    rows
}

impl EdgarClient {
    /// Recent filings block for a zero-padded CIK
    pub(crate) async fn recent_filings(&self, cik10: &str) -> Result<RecentFilings> {
        let url = self.urls.submissions(cik10);
        let data = self
            .fetcher
            .fetch_json(&url, &format!("subs_{}", cik10), FILINGS_TTL)
            .await?;

        let submissions: Submissions = serde_json::from_value(data)
            .map_err(|e| AppError::Internal(format!("Unexpected submissions layout for CIK {}: {}", cik10, e)))?;
        Ok(submissions.filings.recent)
    }

    /// List a company's filings, newest first
    pub async fn search_filings(&self, cik: &str, query: &FilingQuery) -> Result<Vec<Filing>> {
        let cik10 = zero_pad_cik(cik)?;
        let recent = self.recent_filings(&cik10).await?;
        let filings = select_filings(&recent, &cik10, query, &self.urls);

        tracing::debug!(
            cik = %cik10,
            forms = ?query.form_types,
            returned = filings.len(),
            "Searched filings"
        );
        Ok(filings)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::edgar::client::test_support::{self, submissions_json};
    use crate::fetch::MockTransport;
    use tempfile::TempDir;

    const ROWS: &[(&str, &str, &str, &str)] = &[
        ("0000320193-24-000081", "10-Q", "2024-08-02", "aapl-20240629.htm"),
        ("0000320193-23-000106", "10-K", "2023-11-03", "aapl-20230930.htm"),
        ("0000320193-24-000123", "10-K", "2024-11-01", "aapl-20240928.htm"),
        ("0000320193-22-000108", "10-K", "2022-10-28", "aapl-20220924.htm"),
        ("0000320193-24-000069", "8-K", "2024-05-02", "aapl-20240502.htm"),
    ];

    fn recent() -> RecentFilings {
        let subs: Submissions = serde_json::from_str(&submissions_json(ROWS)).unwrap();
        subs.filings.recent
    }

    fn query(forms: &[&str], limit: usize) -> FilingQuery {
        FilingQuery {
            form_types: forms.iter().map(|f| f.to_string()).collect(),
            limit,
            ..FilingQuery::default()
        }
    }

    #[test]
    fn test_filters_by_form_and_sorts_newest_first() {
        let filings = select_filings(&recent(), "0000320193", &query(&["10-K"], 10), &EdgarUrls::default());

        let accessions: Vec<&str> = filings.iter().map(|f| f.accession.as_str()).collect();
        assert_eq!(
            accessions,
            vec!["0000320193-24-000123", "0000320193-23-000106", "0000320193-22-000108"]
        );
        assert_eq!(
            filings[0].url,
            "https://www.sec.gov/Archives/edgar/data/320193/000032019324000123/0000320193-24-000123.txt"
        );
    }

    #[test]
    fn test_date_range_and_limit() {
        let mut q = query(&[], 2);
        q.start_date = Some("2023-01-01".to_string());
        q.end_date = Some("2024-08-02".to_string());

        let filings = select_filings(&recent(), "0000320193", &q, &EdgarUrls::default());

        let dates: Vec<&str> = filings.iter().map(|f| f.filed.as_str()).collect();
        assert_eq!(dates, vec!["2024-08-02", "2024-05-02"]);
    }

    #[test]
    fn test_missing_columns_yield_no_rows() {
        let subs: Submissions = serde_json::from_str(r#"{"cik": "1"}"#).unwrap();
        assert_eq!(subs.filings.recent.rows().count(), 0);
    }

    #[tokio::test]
    async fn test_search_filings_fetches_submissions() {
        let temp_dir = TempDir::new().unwrap();
        let transport = Arc::new(MockTransport::new());
        transport.ok(
            "https://data.sec.gov/submissions/CIK0000320193.json",
            &submissions_json(ROWS),
        );
        let client = test_support::client(&temp_dir, transport);

        let filings = client.search_filings("320193", &query(&["10-Q"], 5)).await.unwrap();
        assert_eq!(filings.len(), 1);
        assert_eq!(filings[0].form, "10-Q");

        assert!(matches!(
            client.search_filings("apple", &query(&[], 5)).await,
            Err(AppError::BadRequest(_))
        ));
    }
}
