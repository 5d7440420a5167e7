//! Merging of the original prompt with a generated expansion.
//!
//! The original prompt is never rewritten. Generated text is clipped to the
//! response budget and sanitized before it is appended: control characters
//! are dropped, excluded category terms are removed, and comma/whitespace
//! runs are collapsed. Sanitization runs to a fixed point, so applying it to
//! its own output is a no-op.

use regex::Regex;

use crate::domain::errors::ExpansionError;
use crate::domain::models::GenerationConfig;
use crate::services::token_budget;

/// Separator placed between the original prompt and the expansion
pub const DELIMITER: &str = ", ";

/// Result of a merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedText {
    pub text: String,
    /// False when the original prompt was returned unchanged
    pub expanded: bool,
}

/// Combines original and generated text under the configured exclusions
#[derive(Debug, Clone)]
pub struct PromptMerger {
    exclude_pattern: Option<Regex>,
    max_response_tokens: usize,
}

impl PromptMerger {
    /// Compile the exclusion pattern for `config`
    ///
    /// # Errors
    /// `ExpansionError::Merge` if the exclusion terms cannot be compiled.
    pub fn new(config: &GenerationConfig) -> Result<Self, ExpansionError> {
        Ok(Self {
            exclude_pattern: build_exclude_pattern(&config.expansion_excludes)?,
            max_response_tokens: config.max_response_tokens,
        })
    }

    /// Merge `expansion` into `original_prompt`
    ///
    /// With no expansion, or one that sanitizes to nothing or merely repeats
    /// the original, the original prompt is returned byte-for-byte.
    pub fn merge(&self, original_prompt: &str, expansion: Option<&str>) -> MergedText {
        let unchanged = || MergedText {
            text: original_prompt.to_string(),
            expanded: false,
        };

        let Some(expansion) = expansion else {
            return unchanged();
        };

        let clipped = token_budget::clip(expansion, self.max_response_tokens);
        let addition = self.sanitize(&clipped);
        let base = original_prompt.trim_end_matches(|c: char| c == ',' || c.is_whitespace());

        if addition.is_empty() || addition.to_lowercase() == base.trim().to_lowercase() {
            return unchanged();
        }

        MergedText {
            text: format!("{base}{DELIMITER}{addition}"),
            expanded: true,
        }
    }

    /// Sanitize generated text
    pub fn sanitize(&self, text: &str) -> String {
        let mut current = self.sanitize_once(text);
        loop {
            let next = self.sanitize_once(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    /// Whether `text` still contains an excluded term
    pub fn contains_excluded(&self, text: &str) -> bool {
        self.exclude_pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(text))
    }

    fn sanitize_once(&self, text: &str) -> String {
        let without_controls: String = text
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();

        let stripped = match &self.exclude_pattern {
            Some(pattern) => pattern.replace_all(&without_controls, " ").into_owned(),
            None => without_controls,
        };

        collapse_separators(&stripped)
    }
}

/// Collapse whitespace runs and repeated commas, trimming both ends
fn collapse_separators(text: &str) -> String {
    text.split(',')
        .map(|segment| segment.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(DELIMITER)
}

/// Case-insensitive pattern matching any excluded term
///
/// `_`, `-` and spaces inside a term are interchangeable, so `artist_name`
/// also matches "artist name" and "Artist-Name". A word boundary is required
/// only at an edge where the term has an ASCII word character, so `art` leaves
/// "artful" alone while `アニメ` and `c++` match inside unspaced text. Longer
/// terms come first so a term is never partially removed by a shorter one it
/// contains.
fn build_exclude_pattern(excludes: &[String]) -> Result<Option<Regex>, ExpansionError> {
    let mut alternatives: Vec<String> = excludes
        .iter()
        .filter_map(|term| term_pattern(term))
        .collect();

    if alternatives.is_empty() {
        return Ok(None);
    }

    alternatives.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    alternatives.dedup();

    let pattern = format!("(?i)(?:{})", alternatives.join("|"));
    Regex::new(&pattern)
        .map(Some)
        .map_err(|e| ExpansionError::Merge(format!("invalid exclusion pattern: {e}")))
}

/// Pattern for one term, or `None` when it has no words
fn term_pattern(term: &str) -> Option<String> {
    let words: Vec<&str> = term
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .collect();
    let first = words.first()?.chars().next()?;
    let last = words.last()?.chars().next_back()?;

    let body = words
        .iter()
        .map(|word| regex::escape(word))
        .collect::<Vec<_>>()
        .join(r"[\s_-]+");
    let boundary = |edge: char| if is_ascii_word(edge) { r"(?-u:\b)" } else { "" };
    Some(format!("{}{body}{}", boundary(first), boundary(last)))
}

const fn is_ascii_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Settings;
    use crate::infrastructure::config::ConfigLoader;

    fn merger_with_excludes(excludes: &[&str]) -> PromptMerger {
        let mut config = ConfigLoader::validate(&Settings::default()).expect("valid defaults");
        config.expansion_excludes = excludes.iter().map(ToString::to_string).collect();
        PromptMerger::new(&config).expect("merger builds")
    }

    #[test]
    fn test_merge_appends_with_delimiter() {
        let merger = merger_with_excludes(&[]);
        let merged = merger.merge("a cat", Some("sitting on a windowsill, soft morning light"));
        assert!(merged.expanded);
        assert_eq!(merged.text, "a cat, sitting on a windowsill, soft morning light");
    }

    #[test]
    fn test_merge_absent_returns_original_exactly() {
        let merger = merger_with_excludes(&[]);
        let merged = merger.merge("  a cat,  ", None);
        assert!(!merged.expanded);
        assert_eq!(merged.text, "  a cat,  ");
    }

    #[test]
    fn test_merge_trims_trailing_separators_of_original() {
        let merger = merger_with_excludes(&[]);
        let merged = merger.merge("a cat, ,", Some("warm light"));
        assert_eq!(merged.text, "a cat, warm light");
    }

    #[test]
    fn test_excluded_term_removed() {
        let merger = merger_with_excludes(&["anime"]);
        let merged = merger.merge("a cat", Some("anime style lighting"));
        assert_eq!(merged.text, "a cat, style lighting");
    }

    #[test]
    fn test_excluded_term_variants_removed() {
        let merger = merger_with_excludes(&["artist_name"]);
        assert_eq!(
            merger.sanitize("soft light, Artist Name, artist-name glow"),
            "soft light, glow"
        );
    }

    #[test]
    fn test_excluded_term_is_whole_word_only() {
        let merger = merger_with_excludes(&["art"]);
        assert_eq!(merger.sanitize("artful art composition"), "artful composition");
    }

    #[test]
    fn test_excluded_term_removed_from_unspaced_text() {
        let merger = merger_with_excludes(&["アニメ"]);
        let merged = merger.merge("猫", Some("アニメ風の柔らかい光"));
        assert!(merged.expanded);
        assert_eq!(merged.text, "猫, 風の柔らかい光");
        assert!(!merged.text.contains("アニメ"));
    }

    #[test]
    fn test_excluded_term_with_symbol_edges_removed() {
        let merger = merger_with_excludes(&["c++", "(nsfw)"]);
        let merged = merger.merge("a cat", Some("c++ lighting, (NSFW) glow"));
        assert_eq!(merged.text, "a cat, lighting, glow");
    }

    #[test]
    fn test_ascii_term_matches_next_to_cjk() {
        let merger = merger_with_excludes(&["anime"]);
        assert_eq!(merger.sanitize("柔らかいanime光"), "柔らかい 光");
    }

    #[test]
    fn test_sanitize_collapses_separators_and_controls() {
        let merger = merger_with_excludes(&[]);
        assert_eq!(
            merger.sanitize(" ,, soft\u{0007}  light,,,   warm\ttone , "),
            "soft light, warm tone"
        );
    }

    #[test]
    fn test_sanitize_reaches_fixed_point() {
        let merger = merger_with_excludes(&["foo bar"]);
        let once = merger.sanitize("foo foo bar bar, baz");
        assert_eq!(once, "baz");
        assert_eq!(merger.sanitize(&once), once);
    }

    #[test]
    fn test_expansion_that_only_contains_excluded_terms_is_unchanged() {
        let merger = merger_with_excludes(&["anime"]);
        let merged = merger.merge("a cat", Some("anime, ANIME"));
        assert!(!merged.expanded);
        assert_eq!(merged.text, "a cat");
    }

    #[test]
    fn test_expansion_repeating_original_is_unchanged() {
        let merger = merger_with_excludes(&[]);
        let merged = merger.merge("A Cat", Some("a cat"));
        assert!(!merged.expanded);
    }

    #[test]
    fn test_expansion_is_clipped_to_response_budget() {
        let mut config = ConfigLoader::validate(&Settings::default()).expect("valid defaults");
        config.max_response_tokens = 3;
        let merger = PromptMerger::new(&config).expect("merger builds");
        let merged = merger.merge("a cat", Some("one two three four five"));
        assert_eq!(merged.text, "a cat, one two three");
    }
}
