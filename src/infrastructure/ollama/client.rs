use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::types::{ConnectionReport, GenerateOptions, GenerateRequest, GenerateResponse, TagsResponse};
use crate::domain::errors::ExpansionError;
use crate::domain::models::GenerationConfig;
use crate::domain::ports::TextGenerationService;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Longest slice of an error body kept in error messages
const MAX_ERROR_BODY_CHARS: usize = 200;

/// HTTP client for a local Ollama server
///
/// Performs exactly one exchange per `exchange` call. Retry, backoff and
/// fallback are the orchestrator's concern.
pub struct OllamaClient {
    /// Reusable HTTP client with connection pooling
    http_client: ReqwestClient,
    endpoint: Url,
    generate_url: Url,
    tags_url: Url,
    model: String,
    options: GenerateOptions,
    timeout: Duration,
    /// Log request and response payloads at debug level
    log_api_communication: bool,
}

impl OllamaClient {
    /// Build a client for the configured endpoint
    ///
    /// # Errors
    /// Fails if the HTTP client cannot be built or the API URLs cannot be
    /// derived from the endpoint.
    pub fn new(config: &GenerationConfig, log_api_communication: bool) -> Result<Self> {
        let http_client = ReqwestClient::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .pool_max_idle_per_host(1)
            .tcp_nodelay(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
            generate_url: api_url(&config.endpoint, "api/generate")?,
            tags_url: api_url(&config.endpoint, "api/tags")?,
            model: config.model.clone(),
            options: GenerateOptions {
                temperature: config.temperature,
                top_p: config.top_p,
                max_tokens: config.max_response_tokens,
            },
            timeout: config.timeout(),
            log_api_communication,
        })
    }

    /// Names of the models installed on the server
    ///
    /// # Errors
    /// Same classification as `exchange`.
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    pub async fn list_models(&self) -> Result<Vec<String>, ExpansionError> {
        let response = self
            .http_client
            .get(self.tags_url.clone())
            .send()
            .await
            .map_err(|e| self.classify(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.classify(&e))?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let tags: TagsResponse = serde_json::from_str(&body)
            .map_err(|e| ExpansionError::ResponseFormat(format!("invalid tags payload: {e}")))?;
        Ok(tags.models.into_iter().map(|tag| tag.name).collect())
    }

    /// Check that the server answers and the configured model is installed
    ///
    /// Never fails; problems are reported in the returned value.
    pub async fn check_connection(&self) -> ConnectionReport {
        info!(endpoint = %self.endpoint, "testing Ollama API connection");
        match self.list_models().await {
            Ok(models) => {
                let model_available = models.iter().any(|name| model_matches(name, &self.model));
                if model_available {
                    info!(model = %self.model, "configured model is available");
                } else {
                    warn!(model = %self.model, available = ?models, "configured model not found");
                }
                ConnectionReport {
                    endpoint: self.endpoint.to_string(),
                    model: self.model.clone(),
                    reachable: true,
                    model_available,
                    models,
                    error: None,
                }
            }
            Err(err) => {
                warn!(error = %err, "connection test failed");
                ConnectionReport {
                    endpoint: self.endpoint.to_string(),
                    model: self.model.clone(),
                    reachable: false,
                    model_available: false,
                    models: Vec::new(),
                    error: Some(err.to_string()),
                }
            }
        }
    }

    fn classify(&self, err: &reqwest::Error) -> ExpansionError {
        if err.is_timeout() {
            ExpansionError::Timeout(self.timeout)
        } else {
            ExpansionError::Network(error_chain(err))
        }
    }
}

#[async_trait]
impl TextGenerationService for OllamaClient {
    async fn exchange(&self, instruction: &str) -> Result<String, ExpansionError> {
        let request = GenerateRequest::new(&self.model, instruction, self.options.clone());
        if self.log_api_communication {
            debug!(
                url = %self.generate_url,
                payload = %serde_json::to_string(&request).unwrap_or_default(),
                "sending generate request"
            );
        }

        let response = self
            .http_client
            .post(self.generate_url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| self.classify(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.classify(&e))?;
        if self.log_api_communication {
            debug!(status = status.as_u16(), body = %body, "received generate response");
        }

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| ExpansionError::ResponseFormat(format!("invalid generate payload: {e}")))?;
        if !parsed.done {
            return Err(ExpansionError::ResponseFormat(
                "generation reported done=false".to_string(),
            ));
        }

        Ok(parsed.response)
    }
}

/// Join `path` onto the endpoint, keeping any path prefix it already has
fn api_url(endpoint: &Url, path: &str) -> Result<Url> {
    let base = endpoint.as_str().trim_end_matches('/');
    Url::parse(&format!("{base}/{path}"))
        .with_context(|| format!("Failed to build API URL from endpoint {endpoint}"))
}

fn status_error(status: reqwest::StatusCode, body: &str) -> ExpansionError {
    let body: String = body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect();
    ExpansionError::Network(format!("HTTP {status}: {body}"))
}

fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// `openhermes` matches an installed `openhermes:latest`
fn model_matches(installed: &str, configured: &str) -> bool {
    installed == configured
        || (!configured.contains(':')
            && installed
                .strip_prefix(configured)
                .is_some_and(|tag| tag == ":latest"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_keeps_path_prefix() {
        let endpoint = Url::parse("http://gpu-box:8080/ollama/").unwrap();
        assert_eq!(
            api_url(&endpoint, "api/generate").unwrap().as_str(),
            "http://gpu-box:8080/ollama/api/generate"
        );

        let endpoint = Url::parse("http://localhost:11434").unwrap();
        assert_eq!(
            api_url(&endpoint, "api/tags").unwrap().as_str(),
            "http://localhost:11434/api/tags"
        );
    }

    #[test]
    fn test_model_matches_latest_tag() {
        assert!(model_matches("openhermes", "openhermes"));
        assert!(model_matches("openhermes:latest", "openhermes"));
        assert!(!model_matches("openhermes:7b", "openhermes"));
        assert!(!model_matches("openhermes2", "openhermes"));
    }

    #[test]
    fn test_status_error_truncates_body() {
        let body = "x".repeat(1_000);
        let err = status_error(reqwest::StatusCode::INTERNAL_SERVER_ERROR, &body);
        assert_eq!(err.kind(), crate::domain::errors::ErrorKind::Network);
        assert!(err.to_string().len() < 300);
    }
}
