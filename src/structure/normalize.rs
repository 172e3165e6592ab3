//! Whitespace normalization for extracted text.

use std::sync::OnceLock;

use regex::Regex;

fn whitespace_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static whitespace pattern"))
}

/// Collapse every whitespace run (newlines included) to a single ASCII space
/// and trim both ends.
///
/// An empty result means the input carried no content and must be skipped.
pub fn normalize(text: &str) -> String {
    whitespace_run().replace_all(text, " ").trim().to_string()
}

/// Number of whitespace-separated tokens in `text`.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
