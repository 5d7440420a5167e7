//! Domain layer for the prompt expansion pipeline
//!
//! This module contains the core data model, error taxonomy and the port
//! traits that infrastructure adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{BatchRequestError, ErrorKind, ExpansionError};
