//! Command-line interface

pub mod commands;
pub mod output;
pub mod types;

use anyhow::{Context, Result};
use std::path::Path;

pub use types::{Cli, Commands, ConfigCommands};

use crate::domain::models::ResolvedConfig;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::logging::{LogConfig, LoggerImpl};

/// Run the parsed command line
pub async fn dispatch(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Expand(args) => commands::expand::execute(args, config_path, cli.json).await,
        Commands::Check => commands::check::execute(config_path, cli.json).await,
        Commands::Config(ConfigCommands::Show) => commands::config::show(config_path, cli.json),
        Commands::Config(ConfigCommands::Init(args)) => {
            commands::config::init(&args, config_path, cli.json)
        }
    }
}

/// Load the configuration, then install logging according to it
///
/// Configuration problems are reported before any logging exists, so they
/// surface through the returned error.
pub(crate) fn prepare(config_path: Option<&Path>) -> Result<(ResolvedConfig, LoggerImpl)> {
    let resolved = load_config(config_path)?;
    let logger = LoggerImpl::init(&LogConfig::from_settings(&resolved.settings.logging))?;
    Ok((resolved, logger))
}

pub(crate) fn load_config(config_path: Option<&Path>) -> Result<ResolvedConfig> {
    match config_path {
        Some(path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => ConfigLoader::load().context("Failed to load configuration"),
    }
}

/// Report a failed command and exit non-zero
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({
            "error": err.to_string(),
            "causes": err.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
