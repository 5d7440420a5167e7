//! Ollama text-generation adapter

pub mod client;
pub mod types;

pub use client::OllamaClient;
pub use types::{ConnectionReport, GenerateOptions, GenerateRequest, GenerateResponse, TagsResponse};
