//! Common test utilities for integration tests
//!
//! Provides scripted text-generation fakes, a collecting outcome sink and
//! configuration fixtures shared across the integration test files.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use prompt_expander::domain::models::{GenerationConfig, MergedPrompt, OutcomeEvent, Settings};
use prompt_expander::domain::ports::{OutcomeSink, TextGenerationService};
use prompt_expander::{ConfigLoader, ExpansionError};

/// Validated defaults with every delay removed
pub fn fast_config(max_retries: u32) -> GenerationConfig {
    let mut config = ConfigLoader::validate(&Settings::default()).expect("defaults are valid");
    config.max_retries = max_retries;
    config.initial_backoff_ms = 0;
    config.max_backoff_ms = 0;
    config.request_interval_ms = 0;
    config
}

/// Service that replays scripted results, then repeats a fallback result
pub struct ScriptedService {
    script: Mutex<VecDeque<Result<String, ExpansionError>>>,
    fallback: Result<String, ExpansionError>,
    instructions: Mutex<Vec<String>>,
    delay: Duration,
}

impl ScriptedService {
    /// Always answer with `response`
    pub fn always(response: &str) -> Self {
        Self::scripted(Vec::new(), Ok(response.to_string()))
    }

    /// Always fail with `err`
    pub fn always_failing(err: ExpansionError) -> Self {
        Self::scripted(Vec::new(), Err(err))
    }

    pub fn scripted(
        script: Vec<Result<String, ExpansionError>>,
        fallback: Result<String, ExpansionError>,
    ) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            instructions: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.instructions.lock().unwrap().len()
    }

    pub fn instructions(&self) -> Vec<String> {
        self.instructions.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerationService for ScriptedService {
    async fn exchange(&self, instruction: &str) -> Result<String, ExpansionError> {
        self.instructions.lock().unwrap().push(instruction.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Sink that keeps every event and conversion for inspection
#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<OutcomeEvent>>,
    conversions: Mutex<Vec<(String, MergedPrompt)>>,
}

impl CollectingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<OutcomeEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn conversions(&self) -> Vec<(String, MergedPrompt)> {
        self.conversions.lock().unwrap().clone()
    }
}

impl OutcomeSink for CollectingSink {
    fn record(&self, event: &OutcomeEvent) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn record_conversion(&self, original: &str, merged: &MergedPrompt) {
        self.conversions
            .lock()
            .unwrap()
            .push((original.to_string(), merged.clone()));
    }
}
