//! OpenAI backend.
//!
//! Chat-completions adapter against a configurable base URL. When the caller
//! supplies no system prompt the adapter substitutes its own default context
//! prompt; the completion is accepted only when it finished with `stop`,
//! that endpoint's natural-end signal.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::error::CompletionError;
use crate::settings::OpenAiSettings;

use super::{CompletionBackend, http_client, validate_completion_state};

const NATURAL_END: &str = "stop";

/// Adapter for OpenAI's chat-completions endpoint.
pub struct OpenAiBackend {
    settings: OpenAiSettings,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
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

impl OpenAiBackend {
    pub fn new(settings: OpenAiSettings) -> Result<Self, CompletionError> {
        settings.validate()?;
        Ok(Self {
            settings,
            http: http_client()?,
        })
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
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
            model: &self.settings.model,
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
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.settings.base_url))
            .bearer_auth(self.settings.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(CompletionError::Unreachable)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let payload: ChatResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

        let choice = payload.choices.into_iter().next().ok_or_else(|| {
            CompletionError::MalformedResponse("response carries no choices".to_string())
        })?;

        validate_completion_state(choice.finish_reason.as_deref(), NATURAL_END, None)?;

        choice.message.content.ok_or_else(|| {
            CompletionError::MalformedResponse("choice carries no message content".to_string())
        })
    }

    fn model(&self) -> String {
        self.settings.model.clone()
    }

    fn max_tokens(&self) -> u32 {
        self.settings.max_tokens
    }
}
