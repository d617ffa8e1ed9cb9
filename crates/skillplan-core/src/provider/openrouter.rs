//! OpenRouter (OpenAI-compatible) chat completions provider.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use super::{ChatRequest, GenerationProvider, ProviderConfig};
use crate::error::PipelineError;

/// Longest body excerpt carried in an error message.
const ERROR_EXCERPT_CHARS: usize = 300;

#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Calls `POST {base_url}/chat/completions` once per request.
#[derive(Debug, Clone)]
pub struct OpenRouterProvider {
    client: Client,
    config: ProviderConfig,
}

impl OpenRouterProvider {
    /// Build a provider. Fails with `InvalidArgument` when the API key is
    /// blank.
    pub fn new(config: ProviderConfig) -> Result<Self, PipelineError> {
        if config.api_key.trim().is_empty() {
            return Err(PipelineError::invalid_argument(
                "generation provider API key is not set",
            ));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PipelineError::ProviderUnavailable {
                status: None,
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn body<'a>(&'a self, request: &'a ChatRequest) -> CompletionBody<'a> {
        CompletionBody {
            model: &self.config.model,
            messages: [
                Message {
                    role: "system",
                    content: &request.system,
                },
                Message {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            response_format: self
                .config
                .json_mode
                .then_some(ResponseFormat { kind: "json_object" }),
        }
    }
}

fn transport_error(e: reqwest::Error) -> PipelineError {
    let message = if e.is_timeout() {
        format!("request timed out: {e}")
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        format!("request failed: {e}")
    };
    PipelineError::ProviderUnavailable {
        status: None,
        message,
    }
}

fn excerpt(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(ERROR_EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[async_trait]
impl GenerationProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String, PipelineError> {
        debug!(model = %self.config.model, endpoint = %self.config.endpoint(), "sending chat completion");

        let mut builder = self
            .client
            .post(self.config.endpoint())
            .bearer_auth(&self.config.api_key)
            .header("Accept", "application/json")
            .json(&self.body(request));
        if let Some(referer) = &self.config.referer {
            builder = builder.header("HTTP-Referer", referer);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "generation provider returned an error status");
            return Err(PipelineError::ProviderUnavailable {
                status: Some(status.as_u16()),
                message: excerpt(&text),
            });
        }

        debug!(bytes = text.len(), "chat completion received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OpenRouterProvider {
        OpenRouterProvider::new(ProviderConfig::new("sk-test")).unwrap()
    }

    fn request() -> ChatRequest {
        ChatRequest {
            system: "be json".into(),
            user: "make a plan".into(),
        }
    }

    #[test]
    fn rejects_blank_api_key() {
        let err = OpenRouterProvider::new(ProviderConfig::new("  ")).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidArgument(_)));
    }

    #[test]
    fn body_carries_messages_and_json_hint() {
        let p = provider();
        let req = request();
        let body = serde_json::to_value(p.body(&req)).unwrap();
        assert_eq!(body["model"], ProviderConfig::DEFAULT_MODEL);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be json");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "make a plan");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["max_tokens"], ProviderConfig::DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn body_omits_json_hint_when_disabled() {
        let p = OpenRouterProvider::new(ProviderConfig {
            json_mode: false,
            ..ProviderConfig::new("sk-test")
        })
        .unwrap();
        let req = request();
        let body = serde_json::to_value(p.body(&req)).unwrap();
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn excerpt_truncates_long_bodies() {
        let long = "x".repeat(ERROR_EXCERPT_CHARS + 10);
        let short = excerpt(&long);
        assert!(short.ends_with("..."));
        assert_eq!(short.len(), ERROR_EXCERPT_CHARS + 3);
        assert_eq!(excerpt("short"), "short");
    }
}
