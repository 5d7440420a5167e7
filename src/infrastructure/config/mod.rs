//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - Programmatic defaults
//! - JSON or YAML file loading
//! - Environment variable overrides
//! - Validation into an immutable `GenerationConfig`

pub mod loader;
pub mod shared;

pub use loader::{ConfigError, ConfigLoader, DEFAULT_CONFIG_PATH, ENV_PREFIX};
pub use shared::SharedConfig;
