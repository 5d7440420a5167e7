//! Implementation of the `prompt-expander config` commands.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{GenerationConfig, Settings};
use crate::infrastructure::config::{ConfigError, ConfigLoader, DEFAULT_CONFIG_PATH};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(long, short)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
pub struct ShowOutput {
    pub settings: Settings,
    pub effective: GenerationConfig,
}

impl CommandOutput for ShowOutput {
    fn to_human(&self) -> String {
        serde_yaml::to_string(&self.settings).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub path: PathBuf,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }
}

pub fn show(config_path: Option<&Path>, json_mode: bool) -> Result<()> {
    let resolved = crate::cli::load_config(config_path)?;
    output(
        &ShowOutput {
            settings: resolved.settings,
            effective: resolved.generation,
        },
        json_mode,
    );
    Ok(())
}

pub fn init(args: &InitArgs, config_path: Option<&Path>, json_mode: bool) -> Result<()> {
    let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));

    let output_data = match ConfigLoader::write_default(path, args.force) {
        Ok(written) => InitOutput {
            success: true,
            message: format!("Wrote default configuration to {}", written.display()),
            path: written,
        },
        Err(ConfigError::AlreadyExists(existing)) => InitOutput {
            success: false,
            message: format!(
                "{} already exists. Use --force to overwrite.",
                existing.display()
            ),
            path: existing,
        },
        Err(err) => return Err(err).context("Failed to write default configuration"),
    };

    output(&output_data, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_then_refuses_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config").join("default_config.json");

        init(&InitArgs { force: false }, Some(&path), true).unwrap();
        let written: Settings =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, Settings::default());

        std::fs::write(&path, "{}").unwrap();
        init(&InitArgs { force: false }, Some(&path), true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");

        init(&InitArgs { force: true }, Some(&path), true).unwrap();
        assert_ne!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_show_output_human_is_yaml() {
        let resolved = ConfigLoader::resolve(Settings::default()).unwrap();
        let rendered = ShowOutput {
            settings: resolved.settings,
            effective: resolved.generation,
        }
        .to_human();
        assert!(rendered.contains("model: openhermes"));
    }
}
