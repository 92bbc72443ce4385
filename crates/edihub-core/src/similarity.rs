//! Lexical similarity between a query and a candidate text.
//!
//! Both strings are lower-cased and split on whitespace into token
//! *sets*: repeated tokens count once. The score is the Jaccard index of
//! the two sets, amplified by [`AMPLIFICATION`] and clamped to `1.0`.
//!
//! Short keyword-style titles rarely reach a high raw Jaccard overlap with
//! a query, so the amplification lets moderate overlap clear the usual
//! acceptance thresholds. Punctuation is kept as part of the token and no
//! stemming or stopword removal is applied.

use std::collections::HashSet;

/// Multiplier applied to the raw Jaccard index before clamping.
pub const AMPLIFICATION: f64 = 1.5;

/// Lower-cases `text` and collects its whitespace-separated tokens.
pub fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Jaccard index `|A ∩ B| / |A ∪ B|`, or `0.0` when either set is empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// Similarity of `text` to `query` in `[0.0, 1.0]`.
///
/// An empty (or whitespace-only) side always scores `0.0`, including
/// the empty-vs-empty case.
pub fn score(query: &str, text: &str) -> f64 {
    let j = jaccard(&tokenize(query), &tokenize(text));
    (j * AMPLIFICATION).min(1.0)
}
