//! Infrastructure layer module
//!
//! Adapters and ambient services behind the domain ports:
//! - Ollama HTTP client
//! - Configuration management
//! - Logging infrastructure
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod config;
pub mod logging;
pub mod ollama;
