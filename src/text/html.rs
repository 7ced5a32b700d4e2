//! HTML to plain text
//!
//! Filing primary documents are (inline XBRL) HTML. Text nodes are trimmed,
//! empty ones dropped and the rest joined with newlines, which keeps headings
//! like "Item 1A. Risk Factors" on their own lines for the section extractor.

use lol_html::{doc_text, element, rewrite_str, RewriteStrSettings};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HtmlError {
    #[error("HTML rewrite failed: {0}")]
    Rewrite(String),
}

/// Convert an HTML document to newline-separated text
pub fn html_to_text(html: &str) -> Result<String, HtmlError> {
    // Non-content elements are removed in a first pass so the text pass
    // never sees their contents
    let stripped = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("head, script, style, noscript, template", |el| {
                el.remove();
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| HtmlError::Rewrite(e.to_string()))?;

    let mut lines: Vec<String> = Vec::new();
    let mut node = String::new();

    rewrite_str(
        &stripped,
        RewriteStrSettings {
            document_content_handlers: vec![doc_text!(|chunk| {
                node.push_str(chunk.as_str());
                if chunk.last_in_text_node() {
                    let line = html_escape::decode_html_entities(&node).trim().to_string();
                    if !line.is_empty() {
                        lines.push(line);
                    }
                    node.clear();
                }
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| HtmlError::Rewrite(e.to_string()))?;

    Ok(lines.join("\n"))
}

/// Heuristic check for HTML vs. plain-text filing documents
pub fn looks_like_html(body: &str) -> bool {
    let head = body.trim_start();
    let prefix: String = head.chars().take(512).collect::<String>().to_ascii_lowercase();
    prefix.starts_with("<!doctype html")
        || prefix.starts_with("<?xml")
        || prefix.contains("<html")
        || prefix.contains("<body")
}
