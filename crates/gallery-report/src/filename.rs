//! Timestamped report filenames

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref UNSAFE_CHARS: Regex = Regex::new(r#"[<>:"/\\|?*\x00-\x1f]"#).unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref MULTIPLE_DASHES: Regex = Regex::new(r"-+").unwrap();
}

const FALLBACK_PREFIX: &str = "report";
const MAX_PREFIX_LEN: usize = 60;

/// `<prefix>_<YYYY-MM-DD_HH-MM-SS>.pdf`, with the prefix made filesystem-safe.
pub fn report_filename(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{}_{}.pdf", sanitize_prefix(prefix), now.format("%Y-%m-%d_%H-%M-%S"))
}

/// Strip characters that are unsafe in filenames and collapse whitespace to dashes.
pub fn sanitize_prefix(prefix: &str) -> String {
    let cleaned = UNSAFE_CHARS.replace_all(prefix.trim(), "");
    let dashed = WHITESPACE.replace_all(&cleaned, "-");
    let collapsed = MULTIPLE_DASHES.replace_all(&dashed, "-");
    let trimmed: String = collapsed
        .trim_matches(|c| c == '-' || c == '.')
        .chars()
        .take(MAX_PREFIX_LEN)
        .collect();

    if trimmed.is_empty() {
        FALLBACK_PREFIX.to_string()
    } else {
        trimmed
    }
}
