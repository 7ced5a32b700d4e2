//! Section extractor
//!
//! Partitions normalized filing text into labeled slices using a fixed,
//! ordered set of heading patterns. Only the first occurrence of each heading
//! is used; a table of contents that repeats the headings ahead of the real
//! sections will therefore mis-slice. Offsets are UTF-8 byte offsets.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Recognized filing sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SectionName {
    #[serde(rename = "MDA")]
    Mda,
    RiskFactors,
    Business,
    Footnotes,
}

impl SectionName {
    pub const ALL: [SectionName; 4] = [
        SectionName::Mda,
        SectionName::RiskFactors,
        SectionName::Business,
        SectionName::Footnotes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionName::Mda => "MDA",
            SectionName::RiskFactors => "RiskFactors",
            SectionName::Business => "Business",
            SectionName::Footnotes => "Footnotes",
        }
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "Unknown section '{}', expected one of MDA, RiskFactors, Business, Footnotes",
                    s
                )
            })
    }
}

/// Location of one section within a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionBounds {
    pub start: usize,
    pub end: usize,
    /// Heading text as matched in the document
    pub heading: String,
}

/// Found sections keyed by name
pub type SectionMap = BTreeMap<SectionName, SectionBounds>;

/// Heading rules, in evaluation order
static HEADINGS: LazyLock<Vec<(SectionName, Regex)>> = LazyLock::new(|| {
    [
        (
            SectionName::Mda,
            r"Item\s+7\.\s*Management['’]s Discussion and Analysis|Item\s+2\.\s*Management",
        ),
        (SectionName::RiskFactors, r"Item\s+1A\.\s*Risk Factors"),
        (SectionName::Business, r"Item\s+1\.\s*Business"),
        (SectionName::Footnotes, r"Notes to (the )?Consolidated Financial Statements"),
    ]
    .into_iter()
    .filter_map(|(name, pattern)| {
        match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(re) => Some((name, re)),
            Err(e) => {
                tracing::error!(section = %name, error = %e, "Invalid heading pattern");
                None
            }
        }
    })
    .collect()
});

/// Find recognized sections in `text`.
///
/// Each section runs from its heading to the next recognized heading (or the
/// end of the text). No headings yields an empty map.
pub fn extract_sections(text: &str) -> SectionMap {
    let mut found: Vec<(SectionName, usize, &str)> = HEADINGS
        .iter()
        .filter_map(|(name, re)| re.find(text).map(|m| (*name, m.start(), m.as_str())))
        .collect();

    // Stable sort keeps rule order for (impossible in practice) equal starts
    found.sort_by_key(|(_, start, _)| *start);

    let mut sections = SectionMap::new();
    for (i, (name, start, heading)) in found.iter().enumerate() {
        let end = found.get(i + 1).map(|(_, next, _)| *next).unwrap_or(text.len());
        sections.insert(
            *name,
            SectionBounds {
                start: *start,
                end,
                heading: heading.to_string(),
            },
        );
    }

    tracing::trace!(found = sections.len(), text_len = text.len(), "Extracted sections");
    sections
}

/// Text of one section, or `""` when it was not found
pub fn section_text<'a>(text: &'a str, sections: &SectionMap, name: SectionName) -> &'a str {
    sections
        .get(&name)
        .and_then(|bounds| text.get(bounds.start..bounds.end))
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad_to(text: &mut String, offset: usize) {
        while text.len() < offset {
            text.push_str("lorem ");
        }
        text.truncate(offset);
    }

    #[test]
    fn test_sections_span_to_next_heading() {
        let mut text = String::new();
        pad_to(&mut text, 100);
        text.push_str("Item 1. Business\nWe design smartphones.");
        pad_to(&mut text, 500);
        text.push_str("Item 1A. Risk Factors\nCompetition is intense.");

        let sections = extract_sections(&text);

        assert_eq!(sections.len(), 2);
        let business = &sections[&SectionName::Business];
        assert_eq!((business.start, business.end), (100, 500));
        assert_eq!(business.heading, "Item 1. Business");

        let risks = &sections[&SectionName::RiskFactors];
        assert_eq!((risks.start, risks.end), (500, text.len()));
        assert_eq!(risks.heading, "Item 1A. Risk Factors");
    }

    #[test]
    fn test_no_headings_yields_empty_map() {
        let sections = extract_sections("Quarterly letter to shareholders. Nothing else.");
        assert!(sections.is_empty());
        assert_eq!(section_text("abc", &sections, SectionName::Mda), "");
    }

    #[test]
    fn test_case_insensitive_and_first_occurrence_only() {
        let text = "ITEM 7. MANAGEMENT'S DISCUSSION AND ANALYSIS of results. \
                    Item 7. Management's Discussion and Analysis again. \
                    Notes to the Consolidated Financial Statements follow.";

        let sections = extract_sections(text);

        let mda = &sections[&SectionName::Mda];
        assert_eq!(mda.start, 0);
        assert_eq!(mda.heading, "ITEM 7. MANAGEMENT'S DISCUSSION AND ANALYSIS");

        let notes = &sections[&SectionName::Footnotes];
        assert_eq!(mda.end, notes.start);
        assert_eq!(notes.end, text.len());
    }

    #[test]
    fn test_quarterly_mda_heading_and_typographic_apostrophe() {
        let quarterly = extract_sections("Part I\nItem 2. Management\u{2019}s Discussion");
        assert!(quarterly.contains_key(&SectionName::Mda));

        let annual = extract_sections("Item 7. Management\u{2019}s Discussion and Analysis");
        assert_eq!(annual[&SectionName::Mda].heading, "Item 7. Management\u{2019}s Discussion and Analysis");
    }

    #[test]
    fn test_ranges_are_sorted_and_disjoint() {
        let text = "Item 1. Business x Item 1A. Risk Factors y Item 7. Management's Discussion and Analysis z \
                    Notes to Consolidated Financial Statements end";
        let sections = extract_sections(text);
        assert_eq!(sections.len(), 4);

        let mut bounds: Vec<&SectionBounds> = sections.values().collect();
        bounds.sort_by_key(|b| b.start);
        for pair in bounds.windows(2) {
            assert!(pair[0].start < pair[0].end);
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(bounds.last().unwrap().end, text.len());
        assert!(section_text(text, &sections, SectionName::RiskFactors).starts_with("Item 1A. Risk Factors"));
    }

    #[test]
    fn test_section_name_parsing() {
        assert_eq!("MDA".parse::<SectionName>().unwrap(), SectionName::Mda);
        assert_eq!("riskfactors".parse::<SectionName>().unwrap(), SectionName::RiskFactors);
        assert!("Exhibits".parse::<SectionName>().is_err());
        assert_eq!(serde_json::to_string(&SectionName::Mda).unwrap(), "\"MDA\"");
    }
}
