pub mod batch;
pub mod config;

pub use batch::{
    BatchRequest, ExpansionAttempt, ItemState, MergedPrompt, Outcome, OutcomeEvent,
};
pub use config::{
    GenerationConfig, LoggingSettings, OllamaSettings, PerformanceSettings, PromptSettings,
    ResolvedConfig, Settings, UiSettings,
};
