//! prompt-expander - batch prompt expansion through a local Ollama model
//!
//! Takes one image prompt and produces `batch_count` independently enriched
//! variants. The original prompt is never rewritten: each variant is the
//! original followed by a sanitized, generated addition, or the original
//! alone when expansion is unavailable.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, errors and port traits
//! - **Service Layer** (`services`): Template building, merging and batch orchestration
//! - **Infrastructure Layer** (`infrastructure`): Ollama client, configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use prompt_expander::domain::ports::NullOutcomeSink;
//! use prompt_expander::{BatchOrchestrator, BatchRequest, ConfigLoader, OllamaClient};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let resolved = ConfigLoader::load()?;
//!     let config = Arc::new(resolved.generation);
//!     let client = OllamaClient::new(&config, false)?;
//!     let orchestrator = BatchOrchestrator::new(config, Arc::new(client), Arc::new(NullOutcomeSink))?;
//!
//!     let request = BatchRequest::new("a cat", 3)?;
//!     for merged in orchestrator.run(&request, &CancellationToken::new()).await {
//!         println!("{}", merged.text);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{BatchRequestError, ErrorKind, ExpansionError};
pub use domain::models::{
    BatchRequest, GenerationConfig, MergedPrompt, Outcome, OutcomeEvent, ResolvedConfig, Settings,
};
pub use domain::ports::{OutcomeSink, TextGenerationService};
pub use infrastructure::config::{ConfigError, ConfigLoader, SharedConfig};
pub use infrastructure::ollama::OllamaClient;
pub use services::BatchOrchestrator;
