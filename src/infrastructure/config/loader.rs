use figment::providers::{Env, Format, Json, Serialized, Yaml};
use figment::Figment;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

use crate::domain::models::{GenerationConfig, ResolvedConfig, Settings};
use crate::infrastructure::logging::RotationPolicy;

/// Default location of the persisted configuration
pub const DEFAULT_CONFIG_PATH: &str = "config/default_config.json";

/// Prefix for environment overrides, e.g. `PROMPT_EXPANDER_OLLAMA__MODEL`
pub const ENV_PREFIX: &str = "PROMPT_EXPANDER_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Configuration file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Failed to extract configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    #[error("Failed to write configuration to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// Offending field for validation failures
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::Invalid { field, .. } => Some(*field),
            _ => None,
        }
    }
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. config/default_config.json (optional)
    /// 3. Environment variables (PROMPT_EXPANDER_* prefix, `__` between sections)
    pub fn load() -> Result<ResolvedConfig, ConfigError> {
        let figment = Self::layered(Path::new(DEFAULT_CONFIG_PATH));
        Self::extract_and_resolve(&figment)
    }

    /// Load configuration from a specific file, which must exist
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<ResolvedConfig, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        Self::extract_and_resolve(&Self::layered(path))
    }

    /// Write the default configuration as pretty JSON
    pub fn write_default(path: impl AsRef<Path>, force: bool) -> Result<PathBuf, ConfigError> {
        let path = path.as_ref();
        if path.exists() && !force {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let body = serde_json::to_string_pretty(&Settings::default())?;
        std::fs::write(path, body + "\n").map_err(write_err)?;
        Ok(path.to_path_buf())
    }

    /// Validate raw settings and keep them alongside the result
    pub fn resolve(settings: Settings) -> Result<ResolvedConfig, ConfigError> {
        let generation = Self::validate(&settings)?;
        Self::validate_ambient(&settings)?;
        Ok(ResolvedConfig {
            generation,
            settings,
        })
    }

    /// Validate the settings that drive expansion
    ///
    /// Runs once before any batch processing; failure is fatal.
    pub fn validate(settings: &Settings) -> Result<GenerationConfig, ConfigError> {
        let ollama = &settings.ollama;
        let prompt = &settings.prompt;

        let endpoint = parse_endpoint(&ollama.endpoint)?;

        let model = ollama.model.trim();
        if model.is_empty() {
            return Err(ConfigError::invalid("model", "must not be empty"));
        }

        let timeout_seconds = positive(ollama.timeout_seconds, "timeout_seconds")?;
        let max_retries = u32::try_from(non_negative(ollama.max_retries, "max_retries")?)
            .map_err(|_| ConfigError::invalid("max_retries", "is too large"))?;
        let initial_backoff_ms = non_negative(ollama.initial_backoff_ms, "initial_backoff_ms")?;
        let max_backoff_ms = non_negative(ollama.max_backoff_ms, "max_backoff_ms")?;
        if initial_backoff_ms > max_backoff_ms {
            return Err(ConfigError::invalid(
                "max_backoff_ms",
                format!("must be at least initial_backoff_ms ({initial_backoff_ms})"),
            ));
        }
        let request_interval_ms = non_negative(ollama.request_interval_ms, "request_interval_ms")?;

        let max_response_tokens = to_usize(
            positive(prompt.max_response_tokens, "max_response_tokens")?,
            "max_response_tokens",
        )?;

        if !(prompt.temperature.is_finite() && prompt.temperature > 0.0) {
            return Err(ConfigError::invalid(
                "temperature",
                "must be greater than 0 so repeated requests vary",
            ));
        }
        if !(prompt.top_p > 0.0 && prompt.top_p <= 1.0) {
            return Err(ConfigError::invalid("top_p", "must be in (0, 1]"));
        }

        let expansion_targets = normalize_categories(&prompt.expansion_targets, "expansion_targets")?;
        let expansion_excludes =
            normalize_categories(&prompt.expansion_excludes, "expansion_excludes")?;

        let target_keys: HashSet<String> = expansion_targets.iter().map(|c| category_key(c)).collect();
        if let Some(overlap) = expansion_excludes
            .iter()
            .find(|c| target_keys.contains(&category_key(c)))
        {
            return Err(ConfigError::invalid(
                "expansion_excludes",
                format!("`{overlap}` is also listed in expansion_targets"),
            ));
        }

        let template_max_tokens = to_usize(
            positive(prompt.template_max_tokens, "template_max_tokens")?,
            "template_max_tokens",
        )?;

        Ok(GenerationConfig {
            endpoint,
            model: model.to_string(),
            timeout_seconds,
            max_retries,
            max_response_tokens,
            template_max_tokens,
            expansion_targets,
            expansion_excludes,
            temperature: prompt.temperature,
            top_p: prompt.top_p,
            initial_backoff_ms,
            max_backoff_ms,
            request_interval_ms,
        })
    }

    /// Validate the sections passed through to the host and logger
    fn validate_ambient(settings: &Settings) -> Result<(), ConfigError> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "warning", "error", "critical"];
        if !valid_log_levels.contains(&settings.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::invalid(
                "level",
                format!(
                    "`{}` is not one of DEBUG, INFO, WARNING, ERROR, CRITICAL",
                    settings.logging.level
                ),
            ));
        }

        let valid_log_formats = ["json", "text"];
        if !valid_log_formats.contains(&settings.logging.format.as_str()) {
            return Err(ConfigError::invalid(
                "format",
                format!("`{}` is not one of json, text", settings.logging.format),
            ));
        }

        if settings.logging.rotation.parse::<RotationPolicy>().is_err() {
            return Err(ConfigError::invalid(
                "rotation",
                format!("`{}` is not one of daily, hourly, never", settings.logging.rotation),
            ));
        }

        let performance = &settings.performance;
        if !(performance.memory_limit_gb.is_finite() && performance.memory_limit_gb > 0.0) {
            return Err(ConfigError::invalid("memory_limit_gb", "must be positive"));
        }
        if !(1..=100).contains(&performance.cpu_limit_percent) {
            return Err(ConfigError::invalid("cpu_limit_percent", "must be between 1 and 100"));
        }

        Ok(())
    }

    fn layered(path: &Path) -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Settings::default()));
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
        let figment = if is_yaml {
            figment.merge(Yaml::file(path))
        } else {
            figment.merge(Json::file(path))
        };
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn extract_and_resolve(figment: &Figment) -> Result<ResolvedConfig, ConfigError> {
        let settings: Settings = figment.extract().map_err(Box::new)?;
        Self::resolve(settings)
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::invalid("endpoint", format!("`{raw}` is not an absolute URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::invalid(
            "endpoint",
            format!("scheme `{}` is not http or https", url.scheme()),
        ));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::invalid("endpoint", "missing host"));
    }
    Ok(url)
}

fn positive(value: i64, field: &'static str) -> Result<u64, ConfigError> {
    u64::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| ConfigError::invalid(field, format!("must be positive, got {value}")))
}

fn non_negative(value: i64, field: &'static str) -> Result<u64, ConfigError> {
    u64::try_from(value)
        .map_err(|_| ConfigError::invalid(field, format!("must not be negative, got {value}")))
}

fn to_usize(value: u64, field: &'static str) -> Result<usize, ConfigError> {
    usize::try_from(value).map_err(|_| ConfigError::invalid(field, "is too large"))
}

/// Comparison key: case-insensitive, `_`/`-`/whitespace treated alike
fn category_key(name: &str) -> String {
    name.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Trim names, reject blanks and drop later duplicates, keeping order
fn normalize_categories(
    names: &[String],
    field: &'static str,
) -> Result<Vec<String>, ConfigError> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(names.len());
    for name in names {
        let trimmed = name.trim();
        if category_key(trimmed).is_empty() {
            return Err(ConfigError::invalid(field, "category names must not be empty"));
        }
        if seen.insert(category_key(trimmed)) {
            normalized.push(trimmed.to_string());
        }
    }
    Ok(normalized)
}
