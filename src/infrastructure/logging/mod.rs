//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or text log formatting
//! - Optional rolling file output
//! - Secret scrubbing
//! - Outcome event sink

pub mod config;
pub mod logger;
pub mod outcome;
pub mod secret_scrubbing;

pub use config::{LogConfig, LogFormat, RotationPolicy};
pub use logger::LoggerImpl;
pub use outcome::TracingOutcomeSink;
pub use secret_scrubbing::SecretScrubber;
