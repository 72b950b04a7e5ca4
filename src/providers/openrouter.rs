//! Aggregator backend.
//!
//! Posts a chat-style payload (system + user messages) to the aggregator's
//! completion endpoint over bearer-authenticated HTTP. The configured model
//! must resolve through [`models::resolve_routed_model`] at construction
//! time; a billing rejection in the error envelope (code 402) is reported as
//! [`CompletionError::InsufficientCredits`] so callers can tell it apart
//! from other faults.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::error::CompletionError;
use crate::settings::OpenRouterSettings;

use super::{CompletionBackend, http_client, models, validate_completion_state};

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
/// Error-envelope code the aggregator uses for exhausted credits.
const INSUFFICIENT_CREDITS_CODE: i64 = 402;
/// Stop signal the aggregator reports for a normally-terminated completion.
const NATURAL_END: &str = "end_turn";

/// Adapter for the aggregator's routing endpoint.
#[derive(Debug)]
pub struct OpenRouterBackend {
    settings: OpenRouterSettings,
    /// Vendor-prefixed identifier, resolved once at construction.
    routed_model: &'static str,
    base_url: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    error: Option<ErrorEnvelope>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    code: Option<i64>,
    message: Option<String>,
}

impl OpenRouterBackend {
    /// Fails fast when the configured model is not in the resolver table;
    /// an unroutable model must never reach request time.
    pub fn new(settings: OpenRouterSettings) -> Result<Self, CompletionError> {
        settings.validate()?;
        let routed_model = models::resolve_routed_model(&settings.model).ok_or_else(|| {
            CompletionError::Configuration(format!(
                "model {} is not supported on the aggregator",
                settings.model
            ))
        })?;
        Ok(Self {
            settings,
            routed_model,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: http_client()?,
        })
    }

    /// Point the adapter at a non-standard endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl CompletionBackend for OpenRouterBackend {
    async fn complete(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<String, CompletionError> {
        let system = match system_prompt {
            Some(s) => s.to_string(),
            None => self.context_prompt(),
        };
        let body = ChatRequest {
            model: self.routed_model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.settings.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(CompletionError::Unreachable)?;

        let payload: ChatResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

        if let Some(envelope) = payload.error {
            if envelope.code == Some(INSUFFICIENT_CREDITS_CODE) {
                tracing::warn!(model = self.routed_model, "aggregator reports insufficient credits");
                return Err(CompletionError::InsufficientCredits);
            }
            return Err(CompletionError::Api {
                status: envelope.code.and_then(|c| u16::try_from(c).ok()).unwrap_or(500),
                message: envelope
                    .message
                    .unwrap_or_else(|| "aggregator error".to_string()),
            });
        }

        let choice = payload.choices.into_iter().next().ok_or_else(|| {
            CompletionError::MalformedResponse("response carries no choices".to_string())
        })?;

        validate_completion_state(choice.finish_reason.as_deref(), NATURAL_END, None)?;

        choice.message.content.ok_or_else(|| {
            CompletionError::MalformedResponse("choice carries no message content".to_string())
        })
    }

    fn model(&self) -> String {
        self.routed_model.to_string()
    }

    fn max_tokens(&self) -> u32 {
        self.settings.max_tokens
    }
}
