//! Text processing: HTML normalization, section extraction and sentence diffs

pub mod html;
pub mod sections;
pub mod sentences;
pub mod similarity;

pub use html::{html_to_text, looks_like_html, HtmlError};
pub use sections::{extract_sections, section_text, SectionBounds, SectionMap, SectionName};
pub use sentences::{sentence_diff, split_sentences, DiffResult, MATCH_THRESHOLD};
pub use similarity::token_set_ratio;
