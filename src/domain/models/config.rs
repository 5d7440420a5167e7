use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Raw configuration as persisted on disk
///
/// Every field has a default so partial files are accepted, and unknown
/// keys are ignored. Numeric fields are signed so that out-of-range values
/// reach validation instead of failing deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Settings {
    /// Text-generation service connection
    #[serde(default)]
    pub ollama: OllamaSettings,

    /// Prompt composition rules
    #[serde(default)]
    pub prompt: PromptSettings,

    /// Host UI flags, passed through untouched
    #[serde(default)]
    pub ui: UiSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Advisory resource ceilings enforced by the host process
    #[serde(default)]
    pub performance: PerformanceSettings,
}

/// Connection and retry settings for the Ollama service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct OllamaSettings {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Upper bound for a single exchange
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: i64,

    /// Additional attempts after the first one fails
    #[serde(default = "default_max_retries")]
    pub max_retries: i64,

    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: i64,

    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: i64,

    /// Pause between consecutive batch items
    #[serde(default = "default_request_interval_ms")]
    pub request_interval_ms: i64,
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "openhermes".to_string()
}

const fn default_timeout_seconds() -> i64 {
    30
}

const fn default_max_retries() -> i64 {
    5
}

const fn default_initial_backoff_ms() -> i64 {
    1_000
}

const fn default_max_backoff_ms() -> i64 {
    8_000
}

const fn default_request_interval_ms() -> i64 {
    100
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            timeout_seconds: default_timeout_seconds(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            request_interval_ms: default_request_interval_ms(),
        }
    }
}

/// Prompt expansion settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct PromptSettings {
    /// Upper bound on the generated addition, in words
    #[serde(default = "default_max_response_tokens")]
    pub max_response_tokens: i64,

    /// Upper bound on the instruction directive, in words
    #[serde(default = "default_template_max_tokens")]
    pub template_max_tokens: i64,

    #[serde(default = "default_template_language")]
    pub template_language: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_top_p")]
    pub top_p: f64,

    /// Categories the service may add to
    #[serde(default = "default_expansion_targets")]
    pub expansion_targets: Vec<String>,

    /// Categories that must never be added or altered
    #[serde(default = "default_expansion_excludes")]
    pub expansion_excludes: Vec<String>,
}

const fn default_max_response_tokens() -> i64 {
    150
}

const fn default_template_max_tokens() -> i64 {
    50
}

fn default_template_language() -> String {
    "en".to_string()
}

const fn default_temperature() -> f64 {
    0.7
}

const fn default_top_p() -> f64 {
    0.9
}

fn default_expansion_targets() -> Vec<String> {
    [
        "scene",
        "background",
        "mood",
        "color_tone",
        "composition",
        "camera_angle",
        "lighting",
        "theme",
        "concept",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

fn default_expansion_excludes() -> Vec<String> {
    ["artist_name", "technique", "style_info"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            max_response_tokens: default_max_response_tokens(),
            template_max_tokens: default_template_max_tokens(),
            template_language: default_template_language(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            expansion_targets: default_expansion_targets(),
            expansion_excludes: default_expansion_excludes(),
        }
    }
}

/// UI flags consumed by the host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[allow(clippy::struct_excessive_bools)]
pub struct UiSettings {
    #[serde(default = "default_true")]
    pub show_progress: bool,

    #[serde(default = "default_true")]
    pub show_status: bool,

    #[serde(default)]
    pub show_preview: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            show_progress: true,
            show_status: true,
            show_preview: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[allow(clippy::struct_excessive_bools)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warning, error, critical
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or text
    #[serde(default = "default_log_format")]
    pub format: String,

    #[serde(default = "default_true")]
    pub include_timestamp: bool,

    /// Log request and response payloads exchanged with the service
    #[serde(default = "default_true")]
    pub log_api_communication: bool,

    /// Log original and merged prompt text for each batch item
    #[serde(default = "default_true")]
    pub log_prompt_conversion: bool,

    /// Directory for rolling log files; stderr only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,

    /// Write log lines to stderr
    #[serde(default = "default_true")]
    pub enable_console: bool,

    /// Log file rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "INFO".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

const fn default_true() -> bool {
    true
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            include_timestamp: true,
            log_api_communication: true,
            log_prompt_conversion: true,
            log_dir: None,
            enable_console: true,
            rotation: default_rotation(),
        }
    }
}

/// Advisory resource ceilings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct PerformanceSettings {
    #[serde(default = "default_memory_limit_gb")]
    pub memory_limit_gb: f64,

    #[serde(default = "default_cpu_limit_percent")]
    pub cpu_limit_percent: u32,
}

const fn default_memory_limit_gb() -> f64 {
    1.0
}

const fn default_cpu_limit_percent() -> u32 {
    50
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self {
            memory_limit_gb: default_memory_limit_gb(),
            cpu_limit_percent: default_cpu_limit_percent(),
        }
    }
}

/// Validated, immutable configuration consumed by the expansion core
///
/// Produced only by `ConfigLoader::validate`. Shared read-only between batch
/// items; a reload builds a new value rather than mutating this one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationConfig {
    pub endpoint: Url,
    pub model: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub max_response_tokens: usize,
    pub template_max_tokens: usize,
    pub expansion_targets: Vec<String>,
    pub expansion_excludes: Vec<String>,
    pub temperature: f64,
    pub top_p: f64,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub request_interval_ms: u64,
}

impl GenerationConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Total number of exchanges allowed per batch item
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub const fn request_interval(&self) -> Duration {
        Duration::from_millis(self.request_interval_ms)
    }
}

/// Validated configuration together with the raw sections it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedConfig {
    pub generation: GenerationConfig,
    pub settings: Settings,
}
