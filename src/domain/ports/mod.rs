//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces the expansion core depends on:
//! - TextGenerationService: one request/response exchange with a text model
//! - OutcomeSink: receiver for per-item outcome events
//!
//! These traits keep the orchestrator independent of the HTTP client and of
//! any concrete log sink, so it can be tested against fakes.

pub mod outcome_sink;
pub mod text_generation;

pub use outcome_sink::{NullOutcomeSink, OutcomeSink};
pub use text_generation::TextGenerationService;
