//! Extraction of the usable expansion from a model's raw `response` text.
//!
//! Local models tend to wrap their answer: a leading label, commentary lines,
//! quotes, or an echo of the prompt they were given. The first content line
//! is taken and those wrappers are peeled off.

const LABELS: &[&str] = &["Enhanced prompt:", "Result:", "Output:", "Enhanced:"];
const COMMENT_PREFIXES: &[&str] = &["#", "//"];

/// Extract the expansion text from `raw`
///
/// Returns an empty string when the response has no content at all.
pub fn extract_expansion(raw: &str, original_prompt: &str) -> String {
    let line = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !COMMENT_PREFIXES.iter().any(|p| line.starts_with(p)))
        .map(strip_label)
        .find(|line| !line.is_empty())
        .unwrap_or_else(|| raw.trim());

    let unquoted = strip_quotes(line);
    strip_echoed_prompt(unquoted, original_prompt).to_string()
}

fn strip_label(line: &str) -> &str {
    LABELS
        .iter()
        .find_map(|label| strip_prefix_ignore_case(line, label))
        .map_or(line, str::trim)
}

fn strip_quotes(line: &str) -> &str {
    let trimmed = line.trim();
    for (open, close) in [('"', '"'), ('\'', '\''), ('“', '”')] {
        if let Some(inner) = trimmed
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            return inner.trim();
        }
    }
    trimmed
}

/// Drop a leading copy of the original prompt so it is not merged twice
fn strip_echoed_prompt<'a>(line: &'a str, original_prompt: &str) -> &'a str {
    let original = original_prompt.trim();
    if original.is_empty() {
        return line;
    }
    match strip_prefix_ignore_case(line, original) {
        // Only strip at a word boundary
        Some(rest) if rest.is_empty() || rest.starts_with([',', ' ', ';', '.']) => {
            rest.trim_start_matches([',', ' ', ';', '.'])
        }
        _ => line,
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}
