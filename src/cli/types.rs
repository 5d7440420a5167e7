//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::config::InitArgs;
use super::commands::expand::ExpandArgs;

#[derive(Parser, Debug)]
#[command(name = "prompt-expander")]
#[command(about = "Expand image prompts through a local Ollama model", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (JSON or YAML); defaults to config/default_config.json
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Expand a prompt into one or more enriched variants
    Expand(ExpandArgs),

    /// Test the connection to Ollama and check the configured model
    Check,

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective, validated configuration
    Show,

    /// Write the default configuration file
    Init(InitArgs),
}
