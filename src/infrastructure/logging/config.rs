use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::models::LoggingSettings;

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn/warning, error, critical)
    pub level: String,

    pub format: LogFormat,

    pub include_timestamp: bool,

    /// Directory for log files (if None logs only to stderr)
    pub log_dir: Option<PathBuf>,

    /// Enable console logging
    pub enable_console: bool,

    pub rotation: RotationPolicy,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Text,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "pretty" => Ok(Self::Text),
            other => Err(format!("Invalid log format: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}

impl FromStr for RotationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "hourly" => Ok(Self::Hourly),
            "never" => Ok(Self::Never),
            other => Err(format!("Invalid rotation policy: {other}")),
        }
    }
}

impl LogConfig {
    /// Build from the `logging` configuration section
    ///
    /// An unknown format falls back to JSON and an unknown rotation to daily;
    /// validation rejects both earlier.
    pub fn from_settings(settings: &LoggingSettings) -> Self {
        Self {
            level: settings.level.clone(),
            format: settings.format.parse().unwrap_or(LogFormat::Json),
            include_timestamp: settings.include_timestamp,
            log_dir: settings.log_dir.as_ref().map(PathBuf::from),
            enable_console: settings.enable_console,
            rotation: settings.rotation.parse().unwrap_or_default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::from_settings(&LoggingSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings() {
        let settings = LoggingSettings {
            level: "WARNING".to_string(),
            format: "text".to_string(),
            include_timestamp: false,
            log_dir: Some("/var/log/prompt-expander".to_string()),
            enable_console: false,
            rotation: "Hourly".to_string(),
            ..LoggingSettings::default()
        };
        let config = LogConfig::from_settings(&settings);
        assert_eq!(config.level, "WARNING");
        assert_eq!(config.format, LogFormat::Text);
        assert!(!config.include_timestamp);
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/prompt-expander")));
        assert!(!config.enable_console);
        assert_eq!(config.rotation, RotationPolicy::Hourly);
    }

    #[test]
    fn test_default_is_json_info() {
        let config = LogConfig::default();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, "INFO");
        assert!(config.log_dir.is_none());
        assert!(config.enable_console);
        assert_eq!(config.rotation, RotationPolicy::Daily);
    }

    #[test]
    fn test_rotation_policy_from_str() {
        assert_eq!("never".parse::<RotationPolicy>(), Ok(RotationPolicy::Never));
        assert!("weekly".parse::<RotationPolicy>().is_err());
    }
}
