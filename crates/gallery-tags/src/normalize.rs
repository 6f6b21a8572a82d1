//! Text folding for search.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold text for accent- and case-insensitive matching.
///
/// Decomposes (NFD), drops combining marks, and lowercases, so
/// `"Épinière"` and `"epiniere"` fold to the same string.
pub fn normalize_text(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Fold a user query. Returns `None` when nothing is left to match on.
pub fn normalize_query(query: &str) -> Option<String> {
    let folded = normalize_text(query.trim());
    if folded.is_empty() {
        None
    } else {
        Some(folded)
    }
}
