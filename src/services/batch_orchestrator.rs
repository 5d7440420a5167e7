//! Batch orchestration: one independent expansion per batch item.
//!
//! Items run strictly one after another in index order, each fully resolved
//! (retries included) before the next starts, so at most one exchange is in
//! flight. Nothing but the read-only `GenerationConfig` is shared between
//! items: every item builds its instruction from the unmodified original
//! prompt and owns its `ExpansionAttempt`.
//!
//! Retry exhaustion degrades only the affected item to the original prompt;
//! the caller always receives exactly `batch_count` results.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::domain::errors::{ErrorKind, ExpansionError};
use crate::domain::models::{
    BatchRequest, ExpansionAttempt, GenerationConfig, ItemState, MergedPrompt, Outcome,
    OutcomeEvent,
};
use crate::domain::ports::{OutcomeSink, TextGenerationService};
use crate::services::prompt_merger::PromptMerger;
use crate::services::response_parser::extract_expansion;
use crate::services::retry_policy::RetryPolicy;
use crate::services::template_builder::build_instruction;

/// Drives expansion attempts for a batch
pub struct BatchOrchestrator {
    config: Arc<GenerationConfig>,
    service: Arc<dyn TextGenerationService>,
    sink: Arc<dyn OutcomeSink>,
    merger: PromptMerger,
    retry_policy: RetryPolicy,
}

impl BatchOrchestrator {
    /// Create an orchestrator bound to one configuration snapshot
    ///
    /// # Errors
    /// `ExpansionError::Merge` if the exclusion terms cannot be compiled.
    pub fn new(
        config: Arc<GenerationConfig>,
        service: Arc<dyn TextGenerationService>,
        sink: Arc<dyn OutcomeSink>,
    ) -> Result<Self, ExpansionError> {
        let merger = PromptMerger::new(&config)?;
        let retry_policy = RetryPolicy::from_config(&config);
        Ok(Self {
            config,
            service,
            sink,
            merger,
            retry_policy,
        })
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Expand every item of `request`, in index order
    ///
    /// Always returns `batch_count` prompts. After `cancel` fires no new
    /// exchange is started; an exchange already in flight is allowed to finish
    /// or time out, and the remaining items are returned as `Aborted`.
    pub async fn run(
        &self,
        request: &BatchRequest,
        cancel: &CancellationToken,
    ) -> Vec<MergedPrompt> {
        let count = request.batch_count();
        let mut results = Vec::with_capacity(count);

        info!(batch_count = count, model = %self.config.model, "starting prompt expansion batch");

        for index in 0..count {
            if index > 0 {
                wait_or_cancel(self.config.request_interval(), cancel).await;
            }
            let merged = self
                .expand_item(request.original_prompt(), index, count, cancel)
                .await;
            results.push(merged);
        }

        let succeeded = results
            .iter()
            .filter(|merged| merged.source_outcome == Outcome::Success)
            .count();
        info!(
            batch_count = count,
            succeeded,
            degraded = count - succeeded,
            "prompt expansion batch finished"
        );

        results
    }

    /// Expand the single item at `request.batch_index()`
    pub async fn expand(&self, request: &BatchRequest, cancel: &CancellationToken) -> MergedPrompt {
        self.expand_item(
            request.original_prompt(),
            request.batch_index(),
            request.batch_count(),
            cancel,
        )
        .await
    }

    #[instrument(skip_all, fields(batch_index = index, batch_count = count))]
    async fn expand_item(
        &self,
        original_prompt: &str,
        index: usize,
        count: usize,
        cancel: &CancellationToken,
    ) -> MergedPrompt {
        let started = Instant::now();
        let mut attempt = ExpansionAttempt::new(index);

        let response = if cancel.is_cancelled() {
            attempt.record_error(ErrorKind::Cancelled, "batch cancelled before item started");
            attempt.outcome = Some(Outcome::Aborted);
            attempt.transition(ItemState::FallbackUsed);
            None
        } else {
            attempt.transition(ItemState::Building);
            attempt.instruction_text = build_instruction(original_prompt, &self.config).to_string();
            attempt.transition(ItemState::Calling);
            self.call_with_retries(&mut attempt, cancel).await
        };

        let merged = match response {
            Some(raw) => {
                let expansion = extract_expansion(&raw, original_prompt);
                attempt.raw_response = Some(raw);
                let merged = self.merger.merge(original_prompt, Some(&expansion));
                if merged.expanded {
                    attempt.outcome = Some(Outcome::Success);
                } else {
                    attempt.record_error(
                        ErrorKind::EmptyExpansion,
                        "response contained nothing usable after sanitization",
                    );
                    attempt.outcome = Some(Outcome::FallbackUsed);
                    attempt.transition(ItemState::FallbackUsed);
                }
                merged.text
            }
            None => self.merger.merge(original_prompt, None).text,
        };
        attempt.transition(ItemState::Merged);

        let outcome = attempt.outcome.unwrap_or(Outcome::FallbackUsed);
        let result = MergedPrompt {
            batch_index: index,
            text: merged,
            source_outcome: outcome,
            attempts: attempt.attempts,
        };

        let event = OutcomeEvent {
            timestamp: Utc::now(),
            batch_index: index,
            batch_count: count,
            attempts: attempt.attempts,
            retry_count: attempt.retry_count,
            outcome,
            error_kind: attempt.error_kind.filter(|_| outcome != Outcome::Success),
            error_detail: attempt
                .error_detail
                .clone()
                .filter(|_| outcome != Outcome::Success),
            elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        self.sink.record(&event);
        self.sink.record_conversion(original_prompt, &result);

        result
    }

    /// Call the service until it succeeds, retries run out, or `cancel` fires
    ///
    /// Leaves `attempt` in `Succeeded` (returning the response) or in
    /// `FallbackUsed` with `outcome` set (returning `None`).
    async fn call_with_retries(
        &self,
        attempt: &mut ExpansionAttempt,
        cancel: &CancellationToken,
    ) -> Option<String> {
        loop {
            attempt.attempts += 1;
            let err = match self.call_once(&attempt.instruction_text).await {
                Ok(response) => {
                    if attempt.retry_count > 0 {
                        debug!(retries = attempt.retry_count, "exchange succeeded after retries");
                    }
                    attempt.transition(ItemState::Succeeded);
                    return Some(response);
                }
                Err(err) => err,
            };
            attempt.record_error(err.kind(), err.to_string());

            if !self.retry_policy.should_retry(&err, attempt.retry_count) {
                let exhausted = ExpansionError::RetriesExhausted {
                    attempts: attempt.attempts,
                    last: Box::new(err),
                };
                warn!(attempts = attempt.attempts, error = %exhausted, "using original prompt");
                attempt.record_error(exhausted.kind(), exhausted.to_string());
                attempt.transition(ItemState::RetriesExhausted);
                attempt.transition(ItemState::FallbackUsed);
                attempt.outcome = Some(Outcome::FallbackUsed);
                return None;
            }

            attempt.transition(ItemState::Retrying);
            let backoff = self.retry_policy.backoff_for(attempt.retry_count);
            warn!(
                attempt = attempt.attempts,
                max_attempts = self.config.max_attempts(),
                error = %err,
                backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
                "exchange failed, retrying"
            );

            if !wait_or_cancel(backoff, cancel).await {
                attempt.record_error(
                    ErrorKind::Cancelled,
                    format!("batch cancelled after {} attempt(s): {err}", attempt.attempts),
                );
                attempt.transition(ItemState::FallbackUsed);
                attempt.outcome = Some(Outcome::Aborted);
                return None;
            }

            attempt.retry_count += 1;
            attempt.transition(ItemState::Calling);
        }
    }

    /// One exchange, bounded by the configured timeout
    async fn call_once(&self, instruction: &str) -> Result<String, ExpansionError> {
        let timeout = self.config.timeout();
        match tokio::time::timeout(timeout, self.service.exchange(instruction)).await {
            Ok(result) => result,
            Err(_elapsed) => Err(ExpansionError::Timeout(timeout)),
        }
    }
}

/// Sleep for `delay` unless cancelled first; returns false if cancelled
async fn wait_or_cancel(delay: Duration, cancel: &CancellationToken) -> bool {
    if cancel.is_cancelled() {
        return false;
    }
    if delay.is_zero() {
        return true;
    }
    tokio::select! {
        () = cancel.cancelled() => false,
        () = tokio::time::sleep(delay) => true,
    }
}
