//! Implementation of the `prompt-expander expand` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::cli::output::progress::{create_progress_bar, ProgressOutcomeSink};
use crate::cli::output::table::TableFormatter;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{BatchRequest, MergedPrompt, Outcome};
use crate::domain::ports::OutcomeSink;
use crate::infrastructure::logging::TracingOutcomeSink;
use crate::infrastructure::ollama::OllamaClient;
use crate::services::BatchOrchestrator;

#[derive(Args, Debug)]
pub struct ExpandArgs {
    /// Original prompt to expand
    pub prompt: String,

    /// Number of independent expansions to produce
    #[arg(short = 'n', long, default_value_t = 1)]
    pub batch_count: usize,

    /// Expand only the item at this 0-based batch index
    #[arg(long, value_name = "INDEX")]
    pub index: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ExpandOutput {
    pub original_prompt: String,
    pub model: String,
    pub results: Vec<MergedPrompt>,
    #[serde(skip)]
    pub show_status: bool,
}

impl ExpandOutput {
    fn count(&self, outcome: Outcome) -> usize {
        self.results
            .iter()
            .filter(|merged| merged.source_outcome == outcome)
            .count()
    }
}

impl CommandOutput for ExpandOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![TableFormatter::new().format_merged_prompts(&self.results)];
        if self.show_status {
            lines.push(format!(
                "{} expanded, {} fell back, {} aborted",
                self.count(Outcome::Success),
                self.count(Outcome::FallbackUsed),
                self.count(Outcome::Aborted)
            ));
        }
        lines.join("\n")
    }
}

pub async fn execute(args: ExpandArgs, config_path: Option<&Path>, json_mode: bool) -> Result<()> {
    let (resolved, _logger) = crate::cli::prepare(config_path)?;

    let request = BatchRequest::new(args.prompt, args.batch_count).context("Invalid batch request")?;
    let request = match args.index {
        Some(index) => request.at_index(index).context("Invalid batch index")?,
        None => request,
    };
    let item_total = if args.index.is_some() { 1 } else { request.batch_count() };

    let logging = &resolved.settings.logging;
    let config = Arc::new(resolved.generation.clone());
    let client = OllamaClient::new(&config, logging.log_api_communication)?;

    let tracing_sink = TracingOutcomeSink::from_settings(logging);
    let progress = (resolved.settings.ui.show_progress && !json_mode)
        .then(|| create_progress_bar(item_total as u64));
    let sink: Arc<dyn OutcomeSink> = match &progress {
        Some(bar) => Arc::new(ProgressOutcomeSink::new(tracing_sink, bar.clone())),
        None => Arc::new(tracing_sink),
    };

    let orchestrator = BatchOrchestrator::new(Arc::clone(&config), Arc::new(client), sink)
        .context("Failed to set up prompt expansion")?;

    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    let results = if args.index.is_some() {
        vec![orchestrator.expand(&request, &cancel).await]
    } else {
        orchestrator.run(&request, &cancel).await
    };
    interrupt.abort();

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    let output_data = ExpandOutput {
        original_prompt: request.original_prompt().to_string(),
        model: config.model.clone(),
        results,
        show_status: resolved.settings.ui.show_status,
    };
    output(&output_data, json_mode);
    Ok(())
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("interrupt received, finishing the request in flight");
        cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_output_summary() {
        let merged = |index, outcome| MergedPrompt {
            batch_index: index,
            text: "a cat".to_string(),
            source_outcome: outcome,
            attempts: 1,
        };
        let output_data = ExpandOutput {
            original_prompt: "a cat".to_string(),
            model: "openhermes".to_string(),
            results: vec![
                merged(0, Outcome::Success),
                merged(1, Outcome::FallbackUsed),
                merged(2, Outcome::Success),
            ],
            show_status: true,
        };

        assert!(output_data.to_human().ends_with("2 expanded, 1 fell back, 0 aborted"));

        let json = output_data.to_json();
        assert_eq!(json["results"].as_array().map(Vec::len), Some(3));
        assert!(json.get("show_status").is_none());
    }
}
