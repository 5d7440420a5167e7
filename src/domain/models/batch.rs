//! Batch request, per-item attempt record and merged result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::errors::{BatchRequestError, ErrorKind};

/// One invocation of the batch orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    original_prompt: String,
    batch_count: usize,
    batch_index: usize,
}

impl BatchRequest {
    /// Create a request positioned at index 0
    pub fn new(
        original_prompt: impl Into<String>,
        batch_count: usize,
    ) -> Result<Self, BatchRequestError> {
        let original_prompt = original_prompt.into();
        if original_prompt.trim().is_empty() {
            return Err(BatchRequestError::EmptyPrompt);
        }
        if batch_count == 0 {
            return Err(BatchRequestError::ZeroBatchCount);
        }
        Ok(Self {
            original_prompt,
            batch_count,
            batch_index: 0,
        })
    }

    /// The same request positioned at another batch item
    pub fn at_index(&self, batch_index: usize) -> Result<Self, BatchRequestError> {
        if batch_index >= self.batch_count {
            return Err(BatchRequestError::IndexOutOfRange {
                index: batch_index,
                count: self.batch_count,
            });
        }
        Ok(Self {
            batch_index,
            ..self.clone()
        })
    }

    pub fn original_prompt(&self) -> &str {
        &self.original_prompt
    }

    pub const fn batch_count(&self) -> usize {
        self.batch_count
    }

    pub const fn batch_index(&self) -> usize {
        self.batch_index
    }
}

/// Terminal classification of one batch item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The service produced a usable expansion
    Success,
    /// Expansion unavailable; the original prompt is used
    FallbackUsed,
    /// Cancelled before the item could resolve; the original prompt is used
    Aborted,
}

impl Outcome {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::FallbackUsed => "fallback_used",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a single batch item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    Idle,
    Building,
    Calling,
    Retrying,
    Succeeded,
    RetriesExhausted,
    FallbackUsed,
    Merged,
}

impl ItemState {
    /// Whether `next` is a legal successor of `self`.
    ///
    /// `FallbackUsed` is also reachable from `Succeeded` (unusable expansion)
    /// and from `Idle`/`Retrying` (cancellation).
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Building | Self::FallbackUsed)
                | (Self::Building, Self::Calling)
                | (
                    Self::Calling,
                    Self::Succeeded | Self::Retrying | Self::RetriesExhausted
                )
                | (Self::Retrying, Self::Calling | Self::FallbackUsed)
                | (Self::RetriesExhausted | Self::Succeeded, Self::FallbackUsed)
                | (Self::Succeeded | Self::FallbackUsed, Self::Merged)
        )
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Merged)
    }
}

/// Record of one batch item's processing
///
/// Created at the start of an iteration and finalized when it completes.
/// Never shared across items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionAttempt {
    pub batch_index: usize,
    pub instruction_text: String,
    pub raw_response: Option<String>,
    pub retry_count: u32,
    pub attempts: u32,
    pub outcome: Option<Outcome>,
    pub error_kind: Option<ErrorKind>,
    pub error_detail: Option<String>,
    state: ItemState,
}

impl ExpansionAttempt {
    pub const fn new(batch_index: usize) -> Self {
        Self {
            batch_index,
            instruction_text: String::new(),
            raw_response: None,
            retry_count: 0,
            attempts: 0,
            outcome: None,
            error_kind: None,
            error_detail: None,
            state: ItemState::Idle,
        }
    }

    pub const fn state(&self) -> ItemState {
        self.state
    }

    /// Move to `next`, returning false (and staying put) on an illegal transition
    pub fn transition(&mut self, next: ItemState) -> bool {
        if !self.state.can_transition_to(next) {
            tracing::error!(
                batch_index = self.batch_index,
                from = ?self.state,
                to = ?next,
                "illegal batch item state transition"
            );
            return false;
        }
        tracing::trace!(batch_index = self.batch_index, from = ?self.state, to = ?next, "state transition");
        self.state = next;
        true
    }

    /// Record a failure detail without changing state
    pub fn record_error(&mut self, kind: ErrorKind, detail: impl Into<String>) {
        self.error_kind = Some(kind);
        self.error_detail = Some(detail.into());
    }
}

/// Final prompt handed back to the caller for one batch item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedPrompt {
    pub batch_index: usize,
    pub text: String,
    pub source_outcome: Outcome,
    pub attempts: u32,
}

impl MergedPrompt {
    pub const fn is_degraded(&self) -> bool {
        !matches!(self.source_outcome, Outcome::Success)
    }
}

/// Structured record emitted once per batch item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeEvent {
    pub timestamp: DateTime<Utc>,
    pub batch_index: usize,
    pub batch_count: usize,
    pub attempts: u32,
    pub retry_count: u32,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    pub elapsed_ms: u64,
}
