//! Progress bar utilities using indicatif for terminal output

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::domain::models::{MergedPrompt, OutcomeEvent};
use crate::domain::ports::OutcomeSink;

const PROGRESS_TEMPLATE: &str =
    "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg} (ETA: {eta})";

const PROGRESS_CHARS: &str = "█▓▒░ ";

/// Create a standard progress bar with ETA calculation
///
/// # Example
/// ```
/// use prompt_expander::cli::output::progress::create_progress_bar;
///
/// let pb = create_progress_bar(3);
/// pb.inc(1);
/// pb.finish_and_clear();
/// ```
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let style = ProgressStyle::default_bar()
        .template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars(PROGRESS_CHARS);

    let pb = ProgressBar::new(total);
    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Advances a progress bar as batch items resolve
///
/// Records are forwarded to `inner` with the bar suspended so log lines
/// are not interleaved with the bar.
pub struct ProgressOutcomeSink<S> {
    inner: S,
    bar: ProgressBar,
}

impl<S: OutcomeSink> ProgressOutcomeSink<S> {
    pub const fn new(inner: S, bar: ProgressBar) -> Self {
        Self { inner, bar }
    }
}

impl<S: OutcomeSink> OutcomeSink for ProgressOutcomeSink<S> {
    fn record(&self, event: &OutcomeEvent) {
        self.bar.suspend(|| self.inner.record(event));
        self.bar
            .set_message(format!("item {} {}", event.batch_index + 1, event.outcome));
        self.bar.inc(1);
    }

    fn record_conversion(&self, original: &str, merged: &MergedPrompt) {
        self.bar.suspend(|| self.inner.record_conversion(original, merged));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Outcome;
    use crate::domain::ports::NullOutcomeSink;
    use chrono::Utc;

    #[test]
    fn test_progress_sink_advances_bar() {
        let bar = ProgressBar::hidden();
        bar.set_length(2);
        let sink = ProgressOutcomeSink::new(NullOutcomeSink, bar.clone());

        let event = OutcomeEvent {
            timestamp: Utc::now(),
            batch_index: 0,
            batch_count: 2,
            attempts: 1,
            retry_count: 0,
            outcome: Outcome::Success,
            error_kind: None,
            error_detail: None,
            elapsed_ms: 12,
        };
        sink.record(&event);

        assert_eq!(bar.position(), 1);
        assert_eq!(bar.message(), "item 1 success");
    }
}
