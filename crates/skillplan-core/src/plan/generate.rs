//! Plan generation: one provider call piped through sanitize and validate.

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::prompt::build_chat_request;
use super::sanitize::sanitize;
use super::types::{GenerationRequest, Plan, PlanKind};
use super::validate::validate_with;
use crate::error::{MalformedResponse, PipelineError};
use crate::provider::GenerationProvider;

/// How much raw provider content to include in debug logs.
const LOG_PREVIEW_CHARS: usize = 500;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<EnvelopeError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Some providers report upstream failures inside a 200 response.
#[derive(Debug, Deserialize)]
struct EnvelopeError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Extract `choices[0].message.content` from a chat completion body.
pub fn extract_message_content(body: &str) -> Result<String, PipelineError> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| MalformedResponse::InvalidEnvelope(e.to_string()))?;

    if envelope.choices.is_empty() {
        if let Some(error) = envelope.error {
            return Err(PipelineError::ProviderUnavailable {
                status: error
                    .code
                    .as_ref()
                    .and_then(serde_json::Value::as_u64)
                    .and_then(|c| u16::try_from(c).ok()),
                message: error
                    .message
                    .unwrap_or_else(|| "provider reported an error".to_string()),
            });
        }
    }

    envelope
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .ok_or(PipelineError::MalformedResponse(
            MalformedResponse::MissingEnvelopeField("choices[0].message.content"),
        ))
}

fn preview(text: &str) -> &str {
    match text.char_indices().nth(LOG_PREVIEW_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Generates validated plans through a [`GenerationProvider`].
///
/// Holds no state between calls; concurrent calls share nothing but the
/// provider.
#[derive(Debug, Clone)]
pub struct PlanGenerator<P> {
    provider: P,
}

impl<P: GenerationProvider> PlanGenerator<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Generate a flat-schema plan for `topic`.
    ///
    /// A blank topic, or one outside [`TOPIC_CHARS`](super::TOPIC_CHARS),
    /// fails with `InvalidArgument` before the provider is contacted.
    pub async fn generate(&self, topic: &str, kind: PlanKind) -> Result<Plan, PipelineError> {
        let request = GenerationRequest::new(topic, kind)?;
        self.generate_request(&request).await
    }

    /// Generate a plan for a fully specified request.
    pub async fn generate_request(&self, request: &GenerationRequest) -> Result<Plan, PipelineError> {
        let chat = build_chat_request(request);
        info!(
            topic = request.topic(),
            kind = %request.kind(),
            variant = %request.variant(),
            difficulty = ?request.difficulty(),
            provider = self.provider.name(),
            "requesting plan generation"
        );

        let body = self.provider.complete(&chat).await?;
        let content = extract_message_content(&body)?;
        debug!(content = preview(&content), "raw provider content");

        let outcome = sanitize(&content)
            .map_err(PipelineError::from)
            .and_then(|candidate| validate_with(candidate, request.variant()));

        match outcome {
            Ok(plan) => {
                info!(topic = request.topic(), days = plan.len(), "plan validated");
                Ok(plan)
            }
            Err(e) => {
                warn!(topic = request.topic(), error = %e, "generated plan rejected");
                Err(e)
            }
        }
    }
}
