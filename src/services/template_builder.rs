//! Instruction template for the text-generation service.
//!
//! The instruction is a short directive followed by the original prompt on
//! its own line. Only the directive counts against `template_max_tokens`:
//! the original prompt is quoted verbatim and is never truncated.
//!
//! When the full directive does not fit, the optional lines go first (the
//! answer-length line, then the keep-original line), then categories are
//! dropped from the end of `targets ++ excludes`. A budget smaller than the
//! header alone clips the header. Exclusions dropped here are still enforced
//! by the prompt merger.

use std::fmt;

use crate::domain::models::GenerationConfig;
use crate::services::token_budget;

const HEADER: &str = "Add comma-separated details to this prompt.";
const KEEP_ORIGINAL: &str = "Do not rewrite the prompt.";
const TARGETS_LABEL: &str = "Add only:";
const EXCLUDES_LABEL: &str = "Never mention:";
const PROMPT_LABEL: &str = "Prompt:";

/// Rendered instruction for one exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    directive: String,
    original_prompt: String,
}

impl Instruction {
    pub fn directive(&self) -> &str {
        &self.directive
    }

    /// Size of the directive in token-equivalents
    pub fn directive_tokens(&self) -> usize {
        token_budget::count(&self.directive)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n{} {}",
            self.directive, PROMPT_LABEL, self.original_prompt
        )
    }
}

/// Which parts of the directive to render
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectiveParts<'a> {
    pub targets: &'a [&'a str],
    pub excludes: &'a [&'a str],
    pub keep_original: bool,
    /// Requested answer bound; omitted when `None`
    pub answer_limit: Option<usize>,
}

/// Build the instruction for `original_prompt`
///
/// Pure: the same inputs always yield the same text. Variation between batch
/// items comes from sampling on the service side, never from this template.
pub fn build_instruction(original_prompt: &str, config: &GenerationConfig) -> Instruction {
    let budget = config.template_max_tokens;
    let targets: Vec<&str> = config.expansion_targets.iter().map(String::as_str).collect();
    let excludes: Vec<&str> = config
        .expansion_excludes
        .iter()
        .map(String::as_str)
        .collect();
    let total = targets.len() + excludes.len();

    let with_categories = |keep: usize| DirectiveParts {
        targets: &targets[..keep.min(targets.len())],
        excludes: &excludes[..keep.saturating_sub(targets.len())],
        ..DirectiveParts::default()
    };

    let full = DirectiveParts {
        keep_original: true,
        answer_limit: Some(budget),
        ..with_categories(total)
    };
    let without_answer = DirectiveParts {
        answer_limit: None,
        ..full
    };
    let candidates = [full, without_answer]
        .into_iter()
        .chain((0..=total).rev().map(with_categories));

    let mut chosen = None;
    for (position, parts) in candidates.enumerate() {
        let directive = render_directive(&parts);
        if token_budget::count(&directive) <= budget {
            chosen = Some((position, parts.targets.len() + parts.excludes.len(), directive));
            break;
        }
    }

    let directive = match chosen {
        Some((0, _, directive)) => directive,
        Some((_, kept, directive)) => {
            tracing::debug!(
                kept,
                dropped = total - kept,
                budget,
                "shortened instruction to fit budget"
            );
            directive
        }
        None => {
            tracing::debug!(budget, "instruction budget smaller than header, clipping");
            token_budget::clip(HEADER, budget)
        }
    };

    Instruction {
        directive,
        original_prompt: original_prompt.to_string(),
    }
}

/// Render the directive for an explicit selection of parts
pub fn render_directive(parts: &DirectiveParts<'_>) -> String {
    let mut lines = vec![HEADER.to_string()];
    if !parts.targets.is_empty() {
        lines.push(format!("{TARGETS_LABEL} {}.", parts.targets.join(", ")));
    }
    if !parts.excludes.is_empty() {
        lines.push(format!("{EXCLUDES_LABEL} {}.", parts.excludes.join(", ")));
    }
    if parts.keep_original {
        lines.push(KEEP_ORIGINAL.to_string());
    }
    if let Some(limit) = parts.answer_limit {
        lines.push(format!("Answer in at most {limit} tokens."));
    }
    lines.join("\n")
}
