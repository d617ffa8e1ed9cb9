//! Generation provider interface.
//!
//! The orchestrator talks to a [`GenerationProvider`]; the production
//! implementation is [`OpenRouterProvider`], which speaks the OpenAI-style
//! chat completions protocol.
//!
//! ```text
//! PlanGenerator --complete(ChatRequest)--> dyn GenerationProvider
//!                                              |
//!                                              v
//!                       raw envelope body (JSON text) or ProviderUnavailable
//! ```

pub mod openrouter;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::PipelineError;

pub use openrouter::OpenRouterProvider;

/// A system/user message pair sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
}

/// Adapter interface for an external text generation service.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Human-readable name for logs (e.g. "openrouter").
    fn name(&self) -> &str;

    /// Issue exactly one request and return the raw response body.
    ///
    /// Transport failures, timeouts and non-success statuses map to
    /// [`PipelineError::ProviderUnavailable`]. Implementations must not
    /// retry.
    async fn complete(&self, request: &ChatRequest) -> Result<String, PipelineError>;
}

// Compile-time assertion: GenerationProvider must be usable as `dyn`.
const _: () = {
    fn _assert_object_safe(_: &dyn GenerationProvider) {}
};

#[async_trait]
impl<P: GenerationProvider + ?Sized> GenerationProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String, PipelineError> {
        (**self).complete(request).await
    }
}

/// Settings for an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    /// Bound on the whole request, connect through body.
    pub timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Send `response_format: {"type": "json_object"}`.
    pub json_mode: bool,
    /// Optional `HTTP-Referer` header identifying the calling app.
    pub referer: Option<String>,
}

impl ProviderConfig {
    pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
    pub const DEFAULT_MODEL: &str = "deepseek/deepseek-chat-v3-0324:free";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(85);
    pub const DEFAULT_TEMPERATURE: f32 = 0.3;
    pub const DEFAULT_MAX_TOKENS: u32 = 8000;

    /// Defaults for everything but the API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
            timeout: Self::DEFAULT_TIMEOUT,
            temperature: Self::DEFAULT_TEMPERATURE,
            max_tokens: Self::DEFAULT_MAX_TOKENS,
            json_mode: true,
            referer: None,
        }
    }

    /// `{base_url}/chat/completions`, tolerating a trailing slash.
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}
