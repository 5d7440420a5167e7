//! Domain errors for the prompt expansion pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while obtaining or merging an expansion.
///
/// `Network`, `Timeout` and `ResponseFormat` are retryable and never escape
/// the batch orchestrator. `RetriesExhausted` is recorded as an outcome and
/// turned into a fallback prompt. `Merge` indicates a bug and is surfaced.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExpansionError {
    /// Connection-level failure or non-success HTTP status.
    #[error("Network error: {0}")]
    Network(String),

    /// The exchange did not finish within the configured timeout.
    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The service answered with a body that does not match the expected shape.
    #[error("Malformed response: {0}")]
    ResponseFormat(String),

    /// Every allowed attempt failed.
    #[error("Retries exhausted after {attempts} attempt(s): {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<ExpansionError>,
    },

    /// Sanitization could not be set up for the configured exclusions.
    #[error("Merge failure: {0}")]
    Merge(String),
}

impl ExpansionError {
    /// Returns true if another attempt may succeed.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout(_) | Self::ResponseFormat(_)
        )
    }

    /// Stable classification used in outcome events.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::Network,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::ResponseFormat(_) => ErrorKind::ResponseFormat,
            Self::RetriesExhausted { .. } => ErrorKind::RetriesExhausted,
            Self::Merge(_) => ErrorKind::Merge,
        }
    }
}

/// Serializable error classification carried by outcome events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Timeout,
    ResponseFormat,
    RetriesExhausted,
    EmptyExpansion,
    Cancelled,
    Merge,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::ResponseFormat => "response_format",
            Self::RetriesExhausted => "retries_exhausted",
            Self::EmptyExpansion => "empty_expansion",
            Self::Cancelled => "cancelled",
            Self::Merge => "merge",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected batch request parameters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BatchRequestError {
    #[error("Original prompt must not be empty")]
    EmptyPrompt,

    #[error("Batch count must be at least 1")]
    ZeroBatchCount,

    #[error("Batch index {index} is out of range for a batch of {count}")]
    IndexOutOfRange { index: usize, count: usize },
}
