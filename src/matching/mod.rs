//! Title normalization and similarity scoring.
//!
//! Catalog search results and metadata titles come from two services that
//! share no common key, so candidate selection rides entirely on fuzzy title
//! comparison. All comparisons run over normalized strings: lowercased with
//! everything outside ASCII alphanumerics stripped, which makes punctuation
//! and spacing differences free.

use strsim::levenshtein;

/// Score awarded when one normalized title contains the other without being
/// equal to it. Gated by the same acceptance threshold as edit-distance
/// similarity; there is no automatic accept for substring relations.
const SUBSTRING_SCORE: f64 = 0.9;

/// Normalize a title for comparison.
///
/// Lowercases and strips every character outside ASCII alphanumerics.
/// Idempotent: normalizing an already-normalized string is a no-op.
pub fn normalize(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Similarity between two normalized strings in `[0, 1]`, computed from the
/// Levenshtein distance: `(max_len - distance) / max_len`.
///
/// Symmetric in its arguments. Two empty strings score 0.0 rather than 1.0
/// so that titles consisting entirely of stripped characters never match
/// each other.
fn edit_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 0.0;
    }
    let distance = levenshtein(a, b);
    (max_len - distance) as f64 / max_len as f64
}

/// Score a single candidate title against a single query title.
fn score_pair(candidate: &str, query: &str) -> f64 {
    let nc = normalize(candidate);
    let nq = normalize(query);

    if nc.is_empty() || nq.is_empty() {
        return 0.0;
    }
    if nc == nq {
        return 1.0;
    }
    if nc.contains(&nq) || nq.contains(&nc) {
        return SUBSTRING_SCORE;
    }
    edit_similarity(&nc, &nq)
}

/// Score a candidate title against a query title and its synonym set.
///
/// The candidate is compared against the query first, then against each
/// synonym; the best score wins. Returns a value in `[0, 1]`.
pub fn score(candidate: &str, query: &str, synonyms: &[String]) -> f64 {
    let mut best = score_pair(candidate, query);
    for synonym in synonyms {
        if best >= 1.0 {
            break;
        }
        best = best.max(score_pair(candidate, synonym));
    }
    best
}
