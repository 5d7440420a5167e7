//! Token-equivalent measurement used for instruction and response bounds.
//!
//! One token-equivalent is one whitespace-separated word, independent of the
//! model's own tokenizer.

/// Number of token-equivalents in `text`
pub fn count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Keep at most `max` token-equivalents of `text`
///
/// Text already within the bound is returned unchanged; otherwise the first
/// `max` words are rejoined with single spaces.
pub fn clip(text: &str, max: usize) -> String {
    if count(text) <= max {
        return text.to_string();
    }
    text.split_whitespace()
        .take(max)
        .collect::<Vec<_>>()
        .join(" ")
}
