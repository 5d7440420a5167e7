//! Wire types for the Ollama HTTP API
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/generate`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    /// Always false: the whole response is read in one exchange
    pub stream: bool,
    pub options: GenerateOptions,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>, options: GenerateOptions) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            stream: false,
            options,
        }
    }
}

/// Sampling options forwarded to the model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerateOptions {
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: usize,
}

/// Non-streaming reply of `POST /api/generate`
///
/// Any other fields the server adds (timings, context) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateResponse {
    pub model: String,
    pub created_at: DateTime<Utc>,
    pub response: String,
    pub done: bool,
}

/// Reply of `GET /api/tags`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelTag {
    pub name: String,
}

/// Result of a connection check against the configured endpoint
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConnectionReport {
    pub endpoint: String,
    pub model: String,
    pub reachable: bool,
    /// Whether `model` is among the installed models
    pub model_available: bool,
    pub models: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_without_streaming() {
        let request = GenerateRequest::new(
            "openhermes",
            "Suggest additions",
            GenerateOptions {
                temperature: 0.7,
                top_p: 0.9,
                max_tokens: 150,
            },
        );
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["max_tokens"], 150);
        assert_eq!(json["model"], "openhermes");
    }

    #[test]
    fn test_response_ignores_extra_fields() {
        let body = r#"{
            "model": "openhermes",
            "created_at": "2024-05-01T10:00:00.123456Z",
            "response": "soft morning light",
            "done": true,
            "total_duration": 123456,
            "context": [1, 2, 3]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.done);
        assert_eq!(parsed.response, "soft morning light");
    }

    #[test]
    fn test_response_missing_field_is_rejected() {
        let body = r#"{"model": "openhermes", "response": "x", "done": true}"#;
        assert!(serde_json::from_str::<GenerateResponse>(body).is_err());
    }

    #[test]
    fn test_tags_without_models() {
        let parsed: TagsResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.models.is_empty());
    }
}
