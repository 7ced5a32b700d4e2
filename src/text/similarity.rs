//! Token-set similarity
//!
//! Order-independent lexical overlap between two strings on a 0-100 scale.
//! Tokens are whitespace-separated and compared verbatim (no case folding
//! or punctuation stripping). The score is the best of:
//!
//! - the normalized Indel similarity of the two sorted difference sets,
//!   weighted against the full token strings, and
//! - the similarity of the shared tokens to either side's full token string.
//!
//! When one token set contains the other the score is 100.

use std::collections::{BTreeSet, HashMap};

/// Whitespace tokens of one string, deduplicated and sorted
pub type TokenSet<'a> = BTreeSet<&'a str>;

pub fn tokenize(text: &str) -> TokenSet<'_> {
    text.split_whitespace().collect()
}

/// Similarity of `a` and `b` as an integer percentage
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    token_set_ratio_cutoff(&tokenize(a), &tokenize(b), 0)
}

/// Token-set similarity of two pre-tokenized strings, or 0 when the score
/// would fall below `cutoff`.
///
/// The character-level LCS is skipped whenever the cheap parts of the score
/// already decide the outcome.
pub fn token_set_ratio_cutoff(tokens_a: &TokenSet<'_>, tokens_b: &TokenSet<'_>, cutoff: u8) -> u8 {
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0;
    }

    let intersection: Vec<&str> = tokens_a.intersection(tokens_b).copied().collect();
    let diff_ab: Vec<&str> = tokens_a.difference(tokens_b).copied().collect();
    let diff_ba: Vec<&str> = tokens_b.difference(tokens_a).copied().collect();

    if !intersection.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 100;
    }

    // BTreeSet iteration is already sorted, so joins are the sorted token strings
    let diff_ab_joined = diff_ab.join(" ");
    let diff_ba_joined = diff_ba.join(" ");

    let ab_len = diff_ab_joined.chars().count();
    let ba_len = diff_ba_joined.chars().count();
    let sect_len = intersection.join(" ").chars().count();

    // Length of "<intersection> <diff>" for each side
    let separator = usize::from(sect_len != 0);
    let sect_ab_len = sect_len + separator + ab_len;
    let sect_ba_len = sect_len + separator + ba_len;

    let mut best = 0.0f64;
    if sect_len != 0 {
        // Distance from the intersection alone to each full string is just
        // the length of the appended part
        let sect_ab_ratio = normalized_similarity(separator + ab_len, sect_len + sect_ab_len);
        let sect_ba_ratio = normalized_similarity(separator + ba_len, sect_len + sect_ba_len);
        best = sect_ab_ratio.max(sect_ba_ratio);
    }

    // Indel distance is at least the length difference
    let total = sect_ab_len + sect_ba_len;
    let upper_bound = normalized_similarity(ab_len.abs_diff(ba_len), total);
    if upper_bound > best && upper_bound.round() >= f64::from(cutoff) {
        let distance = indel_distance(&diff_ab_joined, &diff_ba_joined);
        best = best.max(normalized_similarity(distance, total));
    }

    let score = best.round().clamp(0.0, 100.0) as u8;
    if score >= cutoff {
        score
    } else {
        0
    }
}

/// `100 * (1 - distance / total_len)`, with two empty strings scoring 100
fn normalized_similarity(distance: usize, total_len: usize) -> f64 {
    if total_len == 0 {
        return 100.0;
    }
    100.0 * (1.0 - distance as f64 / total_len as f64)
}

/// Insertions plus deletions needed to turn `a` into `b` (no substitutions)
fn indel_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    a.len() + b.len() - 2 * lcs_len(&a, &b)
}

/// Per-character bitmasks of the positions where it occurs in the pattern
struct PatternMasks {
    blocks: usize,
    ascii: Vec<u64>,
    other: HashMap<char, Vec<u64>>,
}

impl PatternMasks {
    fn new(pattern: &[char]) -> Self {
        let blocks = pattern.len().div_ceil(64);
        let mut masks = Self {
            blocks,
            ascii: vec![0; 128 * blocks],
            other: HashMap::new(),
        };
        for (i, &c) in pattern.iter().enumerate() {
            let bit = 1u64 << (i % 64);
            if c.is_ascii() {
                masks.ascii[c as usize * blocks + i / 64] |= bit;
            } else {
                masks.other.entry(c).or_insert_with(|| vec![0; blocks])[i / 64] |= bit;
            }
        }
        masks
    }

    fn get(&self, c: char) -> Option<&[u64]> {
        if c.is_ascii() {
            let start = c as usize * self.blocks;
            Some(&self.ascii[start..start + self.blocks])
        } else {
            self.other.get(&c).map(Vec::as_slice)
        }
    }
}

/// Longest common subsequence length, bit-parallel over 64-char blocks of
/// the shorter string
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let (pattern, text) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if pattern.is_empty() {
        return 0;
    }

    let masks = PatternMasks::new(pattern);
    let mut state = vec![u64::MAX; masks.blocks];

    for &c in text {
        let Some(matches) = masks.get(c) else {
            continue;
        };
        let mut carry = 0u64;
        for (word, &mask) in state.iter_mut().zip(matches) {
            let current = *word;
            let u = current & mask;
            let (sum, c1) = current.overflowing_add(u);
            let (sum, c2) = sum.overflowing_add(carry);
            carry = u64::from(c1 || c2);
            *word = sum | (current & !u);
        }
    }

    // Zero bits within the pattern length count matched positions
    let tail_bits = pattern.len() % 64;
    state
        .iter()
        .enumerate()
        .map(|(i, &word)| {
            let word = if i + 1 == state.len() && tail_bits != 0 {
                !word & ((1u64 << tail_bits) - 1)
            } else {
                !word
            };
            word.count_ones() as usize
        })
        .sum()
}
