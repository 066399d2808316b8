//! In-run deduplication by question signature.

use crate::models::QaPair;
use crate::utils::char_prefix;
use itertools::Itertools;

/// Default signature length, in characters.
pub const DEFAULT_SIGNATURE_LEN: usize = 50;

/// Lowercased first `len` characters of `question`.
pub fn signature(question: &str, len: usize) -> String {
    char_prefix(question, len).to_lowercase()
}

/// Keep the first pair for each signature, preserving order.
pub fn deduplicate(pairs: Vec<QaPair>, signature_len: usize) -> Vec<QaPair> {
    pairs
        .into_iter()
        .unique_by(|p| signature(&p.question, signature_len))
        .collect()
}
