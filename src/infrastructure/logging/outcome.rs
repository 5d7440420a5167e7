use tracing::{info, warn};

use super::secret_scrubbing::SecretScrubber;
use crate::domain::models::{LoggingSettings, MergedPrompt, Outcome, OutcomeEvent};
use crate::domain::ports::OutcomeSink;

/// Emits outcome events as structured tracing records
///
/// Success is logged at info, fallback and abort at warn. Error details are
/// scrubbed of credentials first.
#[derive(Debug, Clone, Default)]
pub struct TracingOutcomeSink {
    scrubber: SecretScrubber,
    log_prompt_conversion: bool,
}

impl TracingOutcomeSink {
    pub const fn new(log_prompt_conversion: bool) -> Self {
        Self {
            scrubber: SecretScrubber::new(),
            log_prompt_conversion,
        }
    }

    pub const fn from_settings(settings: &LoggingSettings) -> Self {
        Self::new(settings.log_prompt_conversion)
    }
}

impl OutcomeSink for TracingOutcomeSink {
    fn record(&self, event: &OutcomeEvent) {
        match event.outcome {
            Outcome::Success => info!(
                timestamp = %event.timestamp.to_rfc3339(),
                batch_index = event.batch_index,
                batch_count = event.batch_count,
                attempts = event.attempts,
                retry_count = event.retry_count,
                outcome = %event.outcome,
                elapsed_ms = event.elapsed_ms,
                "batch item expanded"
            ),
            Outcome::FallbackUsed | Outcome::Aborted => {
                let detail = event
                    .error_detail
                    .as_deref()
                    .map(|detail| self.scrubber.scrub(detail));
                warn!(
                    timestamp = %event.timestamp.to_rfc3339(),
                    batch_index = event.batch_index,
                    batch_count = event.batch_count,
                    attempts = event.attempts,
                    retry_count = event.retry_count,
                    outcome = %event.outcome,
                    error_kind = event.error_kind.map(|kind| kind.as_str()),
                    error_detail = detail.as_deref(),
                    elapsed_ms = event.elapsed_ms,
                    "batch item used original prompt"
                );
            }
        }
    }

    fn record_conversion(&self, original: &str, merged: &MergedPrompt) {
        if self.log_prompt_conversion {
            info!(
                batch_index = merged.batch_index,
                outcome = %merged.source_outcome,
                original = %original,
                merged = %merged.text,
                "prompt conversion"
            );
        }
    }
}
