//! Boundary to the external schedule generator.
//!
//! The generator is a black box: it receives the structured request plus a
//! rendered prompt and returns JSON that is classified and reconciled by the
//! caller. Nothing it returns is trusted.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use serde::Serialize;
use serde_json::Value;

use super::prompt::render_prompt;
use super::request::GenerationRequest;

/// Failures talking to the generator. None of these reach the API caller;
/// they select the fallback path and an advisory.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("Generator transport error: {0}")]
    Transport(String),

    #[error("Generator timed out after {0:?}")]
    Timeout(Duration),

    #[error("Generator returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Generator unavailable: {0}")]
    Unavailable(String),

    #[error("Generator response could not be decoded: {0}")]
    Decode(String),
}

impl GenerationError {
    /// Whether the failure looks like the service shedding load.
    pub fn is_overloaded(&self) -> bool {
        if let GenerationError::Service { status: 503, .. } = self {
            return true;
        }
        let text = self.to_string().to_lowercase();
        let status_503 = text
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|word| word == "503");
        status_503 || text.contains("service unavailable") || text.contains("overloaded")
    }
}

#[async_trait]
pub trait ExternalScheduleGenerator: Send + Sync {
    /// Ask the generator for timetables. The returned value is untrusted.
    async fn generate(&self, request: &GenerationRequest) -> Result<Value, GenerationError>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}

#[derive(Serialize)]
struct GeneratorCall<'a> {
    model: &'a str,
    prompt: String,
    request: &'a GenerationRequest,
}

/// JSON-over-HTTP generator.
#[derive(Clone)]
pub struct HttpScheduleGenerator {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpScheduleGenerator {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        request_timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            api_key,
            client,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ExternalScheduleGenerator for HttpScheduleGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Value, GenerationError> {
        let call = GeneratorCall {
            model: &self.model,
            prompt: render_prompt(request),
            request,
        };

        info!(
            "Requesting timetables for {} class(es) from {}",
            request.class_names.len(),
            self.endpoint
        );

        let mut builder = self.client.post(&self.endpoint).json(&call);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Transport(format!("request timed out: {}", e))
            } else {
                GenerationError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Transport(format!("failed reading body: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| {
                    v.get("message")
                        .or_else(|| v.get("error"))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .unwrap_or(body);
            return Err(GenerationError::Service {
                status: status.as_u16(),
                message,
            });
        }

        debug!("Generator returned {} bytes", body.len());
        decode_body(&body)
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Decode a generator body. A JSON string payload is unwrapped and parsed
/// again, with Markdown code fences stripped.
pub fn decode_body(body: &str) -> Result<Value, GenerationError> {
    let value = parse_json_text(body)?;
    match value {
        Value::String(inner) => parse_json_text(&inner),
        other => Ok(other),
    }
}

fn parse_json_text(text: &str) -> Result<Value, GenerationError> {
    let trimmed = strip_code_fence(text.trim());
    serde_json::from_str(trimmed).map_err(|e| GenerationError::Decode(e.to_string()))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Generator used when no endpoint is configured. Always unavailable, so
/// every generation produces fallback grids.
#[derive(Debug, Clone, Default)]
pub struct OfflineGenerator;

#[async_trait]
impl ExternalScheduleGenerator for OfflineGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<Value, GenerationError> {
        Err(GenerationError::Unavailable(
            "no generator endpoint configured".to_string(),
        ))
    }

    fn name(&self) -> &str {
        "offline"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_overload_detection() {
        assert!(GenerationError::Service {
            status: 503,
            message: "busy".into()
        }
        .is_overloaded());
        assert!(GenerationError::Transport("model is overloaded".into()).is_overloaded());
        assert!(GenerationError::Service {
            status: 500,
            message: "Service Unavailable".into()
        }
        .is_overloaded());
        assert!(!GenerationError::Timeout(Duration::from_secs(60)).is_overloaded());
        assert!(!GenerationError::Decode("eof".into()).is_overloaded());
    }

    #[test]
    fn test_503_must_be_a_whole_word() {
        assert!(GenerationError::Transport("upstream returned 503".into()).is_overloaded());
        assert!(GenerationError::Transport("HTTP/1.1 503: busy".into()).is_overloaded());
        assert!(!GenerationError::Transport(
            "error sending request for url (http://gen.local:5030/generate)".into()
        )
        .is_overloaded());
        assert!(!GenerationError::Transport("request id 15031".into()).is_overloaded());
    }

    #[test]
    fn test_decode_body_variants() {
        assert_eq!(decode_body("{\"a\": 1}").unwrap(), json!({"a": 1}));
        assert_eq!(
            decode_body("```json\n{\"a\": 1}\n```").unwrap(),
            json!({"a": 1})
        );
        assert_eq!(decode_body("\"{\\\"a\\\": 1}\"").unwrap(), json!({"a": 1}));
        assert!(matches!(
            decode_body("sorry, I cannot"),
            Err(GenerationError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_offline_generator_is_unavailable() {
        let request = GenerationRequest {
            staff_roster: Vec::new(),
            class_names: vec!["Class 1".to_string()],
            periods_per_day: 8,
            days_per_week: 5,
            breaks_per_day: 2,
        };
        let result = OfflineGenerator.generate(&request).await;
        assert!(matches!(result, Err(GenerationError::Unavailable(_))));
    }
}
