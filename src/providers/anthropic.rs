//! Direct Anthropic backend.
//!
//! Calls the Messages API with the configured model, token budget,
//! temperature, system prompt, and a single user message, then concatenates
//! the response's text blocks into the answer. A completion is accepted only
//! when it stopped with `end_turn` and no stop sequence was hit.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::error::CompletionError;
use crate::settings::AnthropicSettings;

use super::{CompletionBackend, http_client, validate_completion_state};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
/// The Messages API's natural-end signal.
const NATURAL_END: &str = "end_turn";

/// Adapter for Anthropic's native completion endpoint.
#[derive(Debug)]
pub struct AnthropicBackend {
    settings: AnthropicSettings,
    base_url: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    stop_sequence: Option<String>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

impl AnthropicBackend {
    pub fn new(settings: AnthropicSettings) -> Result<Self, CompletionError> {
        settings.validate()?;
        Ok(Self {
            settings,
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
impl CompletionBackend for AnthropicBackend {
    async fn complete(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<String, CompletionError> {
        let system = match system_prompt {
            Some(s) => s.to_string(),
            None => self.context_prompt(),
        };
        let body = MessagesRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            system: &system,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", self.settings.api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(CompletionError::Unreachable)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message: envelope_message(&text),
            });
        }

        let message: MessagesResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

        validate_completion_state(
            message.stop_reason.as_deref(),
            NATURAL_END,
            message.stop_sequence.as_deref(),
        )?;

        Ok(message
            .content
            .iter()
            .map(|block| block.text.as_str())
            .collect())
    }

    fn model(&self) -> String {
        self.settings.model.clone()
    }

    fn max_tokens(&self) -> u32 {
        self.settings.max_tokens
    }
}

/// Pulls the human-readable message out of an error body, falling back to
/// the raw text when it is not the documented envelope.
fn envelope_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")?
                .get("message")?
                .as_str()
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}
