//! Implementation of the `prompt-expander check` command.

use anyhow::Result;
use std::path::Path;

use crate::cli::output::table::TableFormatter;
use crate::cli::output::{output, CommandOutput};
use crate::infrastructure::ollama::{ConnectionReport, OllamaClient};

impl CommandOutput for ConnectionReport {
    fn to_human(&self) -> String {
        TableFormatter::new().format_connection_report(self)
    }
}

pub async fn execute(config_path: Option<&Path>, json_mode: bool) -> Result<()> {
    let (resolved, _logger) = crate::cli::prepare(config_path)?;
    let client = OllamaClient::new(
        &resolved.generation,
        resolved.settings.logging.log_api_communication,
    )?;

    let report = client.check_connection().await;
    output(&report, json_mode);

    if !report.reachable {
        anyhow::bail!("Ollama is not reachable at {}", report.endpoint);
    }
    Ok(())
}
