use crate::domain::models::{MergedPrompt, OutcomeEvent};

/// Receiver for the structured per-item outcome stream
///
/// The orchestrator calls `record` exactly once per batch item, whichever
/// branch the item took. Sinks must not block for long; they run on the
/// orchestrator's task.
pub trait OutcomeSink: Send + Sync {
    fn record(&self, event: &OutcomeEvent);

    /// Called after `record` with the prompt text before and after merging
    fn record_conversion(&self, _original: &str, _merged: &MergedPrompt) {}
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOutcomeSink;

impl OutcomeSink for NullOutcomeSink {
    fn record(&self, _event: &OutcomeEvent) {}
}
