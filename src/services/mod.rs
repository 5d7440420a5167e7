//! Service layer: the expansion pipeline proper.
//!
//! - `template_builder`: instruction text for the service
//! - `response_parser`: usable line from a raw model response
//! - `prompt_merger`: sanitization and merge with the original prompt
//! - `retry_policy`: backoff schedule between attempts
//! - `batch_orchestrator`: per-item retry/fallback state machine

pub mod batch_orchestrator;
pub mod prompt_merger;
pub mod response_parser;
pub mod retry_policy;
pub mod template_builder;
pub mod token_budget;

pub use batch_orchestrator::BatchOrchestrator;
pub use prompt_merger::{MergedText, PromptMerger};
pub use retry_policy::RetryPolicy;
pub use template_builder::{build_instruction, Instruction};
