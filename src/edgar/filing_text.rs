//! Filing documents: provenance lookup, text retrieval and section slicing

use chrono::NaiveDate;

use super::client::{zero_pad_cik, EdgarClient, DOCUMENT_TTL};
use super::types::{FilingMeta, FilingSections, FilingText, SectionSlice};
use crate::error::{AppError, Result};
use crate::text::{extract_sections, html_to_text, looks_like_html, SectionName};

/// `YYYY-MM-DD` to `YYYY-MM-DDT00:00:00Z`
fn filing_date_to_iso(date: &str) -> Result<String> {
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| AppError::Internal(format!("Unexpected filing date '{}': {}", date, e)))?;
    Ok(parsed.format("%Y-%m-%dT00:00:00Z").to_string())
}

impl EdgarClient {
    /// Locate an accession in its filer's submissions index.
    ///
    /// The filer CIK is the accession's first segment.
    pub async fn filing_meta(&self, accession: &str) -> Result<FilingMeta> {
        let prefix = accession.split('-').next().unwrap_or_default();
        let cik10 = zero_pad_cik(prefix)
            .map_err(|_| AppError::BadRequest(format!("Malformed accession number '{}'", accession)))?;

        let recent = self.recent_filings(&cik10).await?;
        let row = recent
            .rows()
            .find(|row| row.accession == accession)
            .ok_or_else(|| AppError::NotFound(format!("Accession {} not found in submissions", accession)))?;

        if row.primary_document.is_empty() {
            return Err(AppError::NotFound(format!(
                "Accession {} has no primary document",
                accession
            )));
        }

        Ok(FilingMeta {
            accession: accession.to_string(),
            cik: cik10.clone(),
            form: row.form.to_string(),
            filed_at: filing_date_to_iso(row.filing_date)?,
            index_url: self.urls.filing_index(&cik10, accession),
            doc_url: format!("{}/{}", self.urls.archive_dir(&cik10, accession), row.primary_document),
        })
    }

    /// Primary document of a filing as normalized text
    pub async fn filing_text(&self, accession: &str) -> Result<FilingText> {
        let meta = self.filing_meta(accession).await?;
        let body = self
            .fetcher
            .fetch_text(&meta.doc_url, &format!("doc_{}", accession), DOCUMENT_TTL)
            .await?;

        let text = if looks_like_html(&body) {
            html_to_text(&body).map_err(|e| AppError::Internal(e.to_string()))?
        } else {
            body
        };

        tracing::debug!(
            accession = %accession,
            form = %meta.form,
            text_len = text.len(),
            "Loaded filing text"
        );

        Ok(FilingText {
            accession: meta.accession,
            cik: meta.cik,
            form: meta.form,
            filed_at: meta.filed_at,
            source_url: meta.doc_url,
            text,
        })
    }

    /// Requested sections of a filing (all found sections when `wanted` is
    /// `None`), in document order
    pub async fn get_sections(&self, accession: &str, wanted: Option<&[SectionName]>) -> Result<FilingSections> {
        let filing = self.filing_text(accession).await?;
        Ok(slice_filing(filing, wanted))
    }
}

/// Cut a filing's text into its recognized sections
pub fn slice_filing(filing: FilingText, wanted: Option<&[SectionName]>) -> FilingSections {
    let found = extract_sections(&filing.text);

    let mut sections: Vec<SectionSlice> = found
        .into_iter()
        .filter(|(name, _)| wanted.map_or(true, |names| names.contains(name)))
        .map(|(name, bounds)| SectionSlice {
            name,
            text: filing.text.get(bounds.start..bounds.end).unwrap_or_default().to_string(),
            start: bounds.start,
            end: bounds.end,
            heading: bounds.heading,
        })
        .collect();
    sections.sort_by_key(|s| s.start);

    FilingSections {
        accession: filing.accession,
        cik: filing.cik,
        form: filing.form,
        filed_at: filing.filed_at,
        source_url: filing.source_url,
        sections,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::edgar::client::test_support::{self, submissions_json};
    use crate::fetch::MockTransport;
    use tempfile::TempDir;

    const SUBS_URL: &str = "https://data.sec.gov/submissions/CIK0000320193.json";
    const DOC_URL: &str = "https://www.sec.gov/Archives/edgar/data/320193/000032019324000123/aapl-20240928.htm";
    const DOC: &str = "<html><head><title>aapl-20240928</title></head><body>\
        <p>Item 1. Business</p><p>The Company designs smartphones.</p>\
        <p>Item 1A. Risk Factors</p><p>Competition is intense.</p>\
        </body></html>";

    fn transport() -> Arc<MockTransport> {
        let transport = Arc::new(MockTransport::new());
        transport.ok(
            SUBS_URL,
            &submissions_json(&[("0000320193-24-000123", "10-K", "2024-11-01", "aapl-20240928.htm")]),
        );
        transport.ok(DOC_URL, DOC);
        transport
    }

    #[test]
    fn test_filing_date_to_iso() {
        assert_eq!(filing_date_to_iso("2024-11-01").unwrap(), "2024-11-01T00:00:00Z");
        assert!(filing_date_to_iso("11/01/2024").is_err());
    }

    #[tokio::test]
    async fn test_filing_meta() {
        let temp_dir = TempDir::new().unwrap();
        let client = test_support::client(&temp_dir, transport());

        let meta = client.filing_meta("0000320193-24-000123").await.unwrap();

        assert_eq!(meta.cik, "0000320193");
        assert_eq!(meta.form, "10-K");
        assert_eq!(meta.filed_at, "2024-11-01T00:00:00Z");
        assert_eq!(meta.doc_url, DOC_URL);
    }

    #[tokio::test]
    async fn test_unknown_and_malformed_accessions() {
        let temp_dir = TempDir::new().unwrap();
        let client = test_support::client(&temp_dir, transport());

        assert!(matches!(
            client.filing_meta("0000320193-99-000001").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            client.filing_meta("not-an-accession").await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_filing_text_and_sections() {
        let temp_dir = TempDir::new().unwrap();
        let client = test_support::client(&temp_dir, transport());

        let filing = client.filing_text("0000320193-24-000123").await.unwrap();
        assert_eq!(filing.source_url, DOC_URL);
        assert!(filing.text.starts_with("Item 1. Business\nThe Company designs smartphones."));
        assert!(!filing.text.contains("aapl-20240928"));

        let sections = client
            .get_sections("0000320193-24-000123", Some(&[SectionName::RiskFactors]))
            .await
            .unwrap();
        assert_eq!(sections.sections.len(), 1);
        let risks = &sections.sections[0];
        assert_eq!(risks.name, SectionName::RiskFactors);
        assert_eq!(risks.text, "Item 1A. Risk Factors\nCompetition is intense.");
        assert_eq!(risks.end, filing.text.len());
    }

    #[test]
    fn test_slice_filing_without_headings() {
        let filing = FilingText {
            accession: "a".to_string(),
            cik: "0000000001".to_string(),
            form: "8-K".to_string(),
            filed_at: "2024-01-01T00:00:00Z".to_string(),
            source_url: "u".to_string(),
            text: "Press release. No items here.".to_string(),
        };

        assert!(slice_filing(filing, None).sections.is_empty());
    }
}
