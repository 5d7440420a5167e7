//! Table output formatting for CLI commands
//!
//! Renders batch results and connection reports using comfy-table, with
//! color-coded outcome cells when the terminal supports them.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use crate::domain::models::{MergedPrompt, Outcome};
use crate::infrastructure::ollama::ConnectionReport;

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<u16>,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    pub const fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// One row per batch item, in index order
    pub fn format_merged_prompts(&self, prompts: &[MergedPrompt]) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            Cell::new("#").add_attribute(Attribute::Bold),
            Cell::new("Outcome").add_attribute(Attribute::Bold),
            Cell::new("Attempts").add_attribute(Attribute::Bold),
            Cell::new("Prompt").add_attribute(Attribute::Bold),
        ]);

        for prompt in prompts {
            let outcome_cell = if self.use_colors {
                Cell::new(prompt.source_outcome.to_string()).fg(outcome_color(prompt.source_outcome))
            } else {
                Cell::new(format!(
                    "{} {}",
                    outcome_icon(prompt.source_outcome),
                    prompt.source_outcome
                ))
            };

            table.add_row(vec![
                Cell::new(prompt.batch_index + 1),
                outcome_cell,
                Cell::new(prompt.attempts),
                Cell::new(&prompt.text),
            ]);
        }

        table.to_string()
    }

    pub fn format_connection_report(&self, report: &ConnectionReport) -> String {
        let mut table = self.create_base_table();

        let yes_no = |value: bool| {
            let cell = Cell::new(if value { "yes" } else { "no" });
            if self.use_colors {
                cell.fg(if value { Color::Green } else { Color::Red })
            } else {
                cell
            }
        };

        table.add_row(vec![Cell::new("Endpoint").add_attribute(Attribute::Bold), Cell::new(&report.endpoint)]);
        table.add_row(vec![Cell::new("Reachable").add_attribute(Attribute::Bold), yes_no(report.reachable)]);
        table.add_row(vec![Cell::new("Model").add_attribute(Attribute::Bold), Cell::new(&report.model)]);
        table.add_row(vec![
            Cell::new("Model installed").add_attribute(Attribute::Bold),
            yes_no(report.model_available),
        ]);
        if !report.models.is_empty() {
            table.add_row(vec![
                Cell::new("Available models").add_attribute(Attribute::Bold),
                Cell::new(report.models.join("\n")),
            ]);
        }
        if let Some(error) = &report.error {
            table.add_row(vec![Cell::new("Error").add_attribute(Attribute::Bold), Cell::new(error)]);
        }

        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();

        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if let Some(width) = self.max_width {
            table.set_width(width);
        }

        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if color output is supported
fn supports_color() -> bool {
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    !matches!(env::var("TERM").as_deref(), Ok("dumb"))
}

const fn outcome_color(outcome: Outcome) -> Color {
    match outcome {
        Outcome::Success => Color::Green,
        Outcome::FallbackUsed => Color::Yellow,
        Outcome::Aborted => Color::DarkGrey,
    }
}

const fn outcome_icon(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Success => "✓",
        Outcome::FallbackUsed => "↺",
        Outcome::Aborted => "⊘",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(index: usize, text: &str, outcome: Outcome) -> MergedPrompt {
        MergedPrompt {
            batch_index: index,
            text: text.to_string(),
            source_outcome: outcome,
            attempts: 1,
        }
    }

    #[test]
    fn test_format_merged_prompts_plain() {
        let formatter = TableFormatter::with_config(false, Some(120));
        let rendered = formatter.format_merged_prompts(&[
            prompt(0, "a cat, soft light", Outcome::Success),
            prompt(1, "a cat", Outcome::FallbackUsed),
        ]);

        assert!(rendered.contains("a cat, soft light"));
        assert!(rendered.contains("✓ success"));
        assert!(rendered.contains("↺ fallback_used"));
    }

    #[test]
    fn test_format_connection_report_with_error() {
        let formatter = TableFormatter::with_config(false, Some(120));
        let report = ConnectionReport {
            endpoint: "http://localhost:11434/".to_string(),
            model: "openhermes".to_string(),
            reachable: false,
            model_available: false,
            models: Vec::new(),
            error: Some("connection refused".to_string()),
        };
        let rendered = formatter.format_connection_report(&report);
        assert!(rendered.contains("connection refused"));
        assert!(rendered.contains("no"));
    }
}
