//! Sentence differ
//!
//! Splits two texts into sentences and reports which sentences of the new
//! text have no close match in the old one (added) and vice versa (removed).
//! The two scans are independent, so a reworded sentence can show up once in
//! each list rather than as a single modification.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::similarity::{token_set_ratio_cutoff, tokenize, TokenSet};

/// Best-match score below which a sentence counts as changed
pub const MATCH_THRESHOLD: u8 = 80;

/// Sentence boundary: terminal punctuation followed by whitespace
static BOUNDARY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.?!]\s+").expect("valid sentence boundary pattern"));

/// Added/removed sentences, each in its source document's order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffResult {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

/// Split text into trimmed, non-empty sentences in source order.
///
/// The terminating punctuation stays with its sentence.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for boundary in BOUNDARY.find_iter(text) {
        // Punctuation is a single ASCII byte
        push_trimmed(&mut sentences, &text[start..boundary.start() + 1]);
        start = boundary.end();
    }
    push_trimmed(&mut sentences, &text[start..]);

    sentences
}

fn push_trimmed<'a>(sentences: &mut Vec<&'a str>, fragment: &'a str) {
    let trimmed = fragment.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed);
    }
}

/// Sentences of `sentences` with no match of at least [`MATCH_THRESHOLD`]
/// in `against`; all of them when `against` is empty
fn unmatched(sentences: &[&str], against: &[&str]) -> Vec<String> {
    let candidates: Vec<TokenSet<'_>> = against.iter().map(|sentence| tokenize(sentence)).collect();

    sentences
        .iter()
        .filter(|sentence| {
            let tokens = tokenize(sentence);
            !candidates
                .iter()
                .any(|candidate| token_set_ratio_cutoff(&tokens, candidate, MATCH_THRESHOLD) >= MATCH_THRESHOLD)
        })
        .map(|sentence| sentence.to_string())
        .collect()
}

/// Diff two texts sentence by sentence
pub fn sentence_diff(old: &str, new: &str) -> DiffResult {
    let old_sentences = split_sentences(old);
    let new_sentences = split_sentences(new);

    let result = DiffResult {
        added: unmatched(&new_sentences, &old_sentences),
        removed: unmatched(&old_sentences, &new_sentences),
    };

    tracing::debug!(
        old_sentences = old_sentences.len(),
        new_sentences = new_sentences.len(),
        added = result.added.len(),
        removed = result.removed.len(),
        "Sentence diff complete"
    );

    result
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    /// `count` sentences of 20 pseudo-random words spelled from `alphabet`
    fn section(alphabet: &[u8], count: usize) -> Vec<String> {
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        (0..count)
            .map(|_| {
                let words: Vec<String> = (0..20)
                    .map(|_| {
                        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                        let mut n = (seed >> 33) % 20_000;
                        let mut word = String::new();
                        while word.len() < 4 || n > 0 {
                            word.push(alphabet[(n % alphabet.len() as u64) as usize] as char);
                            n /= alphabet.len() as u64;
                        }
                        word
                    })
                    .collect();
                format!("{}.", words.join(" "))
            })
            .collect()
    }

    #[test]
    fn test_split_sentences() {
        let sentences = split_sentences("  Revenue grew 5%. Costs were flat?  Yes!\n\nDone  ");
        assert_eq!(sentences, vec!["Revenue grew 5%.", "Costs were flat?", "Yes!", "Done"]);
    }

    #[test]
    fn test_split_keeps_inline_punctuation() {
        // No whitespace after the period, so not a boundary
        let sentences = split_sentences("Net sales were $1.5 billion. U.S.-based.");
        assert_eq!(sentences, vec!["Net sales were $1.5 billion.", "U.S.-based."]);
        assert!(split_sentences("   \n ").is_empty());
    }

    #[test]
    fn test_reworded_and_new_sentences() {
        let old = "Revenue grew 5%. Costs were flat.";
        let new = "Revenue grew 5%. Costs increased sharply. New product launched.";

        let diff = sentence_diff(old, new);

        assert_eq!(diff.added, vec!["Costs increased sharply.", "New product launched."]);
        assert_eq!(diff.removed, vec!["Costs were flat."]);
    }

    #[test]
    fn test_empty_old_text_adds_everything() {
        let diff = sentence_diff("", "First risk. Second risk.");
        assert_eq!(diff.added, vec!["First risk.", "Second risk."]);
        assert!(diff.removed.is_empty());
    }

    #[test]
    fn test_empty_new_text_removes_everything() {
        let diff = sentence_diff("First risk. Second risk.", "   ");
        assert!(diff.added.is_empty());
        assert_eq!(diff.removed, vec!["First risk.", "Second risk."]);
    }

    #[test]
    fn test_identical_texts_have_no_changes() {
        let text = "We face competition. Our suppliers are concentrated in Asia.";
        assert_eq!(sentence_diff(text, text), DiffResult::default());
    }

    #[test]
    fn test_output_follows_source_order() {
        let old = "Supplier concentration remains high. Litigation costs may rise.";
        let new = "Cybersecurity incidents could disrupt operations. Tariffs affect our margins. \
                   Supplier concentration remains high.";

        let diff = sentence_diff(old, new);

        assert_eq!(
            diff.added,
            vec!["Cybersecurity incidents could disrupt operations.", "Tariffs affect our margins."]
        );
        assert_eq!(diff.removed, vec!["Litigation costs may rise."]);
    }

    #[test]
    fn test_section_sized_input_finishes_quickly() {
        let shared = "Supplier concentration remains high.";
        let old_sentences = section(b"abcdefghijklm", 250);
        let new_sentences = section(b"nopqrstuvwxyz", 250);
        let old = format!("{} {}", shared, old_sentences.join(" "));
        let new = format!("{} {}", new_sentences.join(" "), shared);
        assert!(old.len() > 20_000);

        let started = Instant::now();
        let diff = sentence_diff(&old, &new);
        let elapsed = started.elapsed();

        assert_eq!(diff.added, new_sentences);
        assert_eq!(diff.removed, old_sentences);
        assert!(elapsed < Duration::from_secs(30), "diff took {:?}", elapsed);
    }
}
