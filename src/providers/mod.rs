//! Backend adapters.
//!
//! Every remote backend implements [`CompletionBackend`]: a single
//! `complete` call that runs one generation, validates the completion state,
//! and returns either a full answer or a [`CompletionError`]. Adapters are
//! selected at construction time from the resolved configuration; nothing in
//! the node inspects adapter types at runtime.

mod anthropic;
pub mod models;
mod openai;
mod openrouter;

pub use anthropic::AnthropicBackend;
pub use openai::OpenAiBackend;
pub use openrouter::OpenRouterBackend;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::CompletionError;

/// Fixed persona instruction prepended to every default system prompt.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a supreme polymath renowned for your ability to explain \
complex concepts effectively to any audience from laypeople \
to fellow top experts. \
By principle, you always ensure factual accuracy. \
You are master at adapting your explanation strategy as needed \
based on the field and target audience, using a wide array of \
tools such as examples, analogies and metaphors whenever and \
only when appropriate. Your goal is their comprehension of the \
explanation, according to their background expertise. \
You always structure your explanations coherently and express \
yourself clear and concisely, crystallizing thoughts and \
key concepts. You only respond with the explanations themselves, \
eliminating redundant conversational additions. ";

/// Client-side ceiling on a single backend call. A call that outlives this
/// surfaces as [`CompletionError::Unreachable`] instead of hanging.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Uniform contract every backend adapter satisfies.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Run one completion. `system_prompt` overrides the default context
    /// prompt when given; adapters substitute [`Self::context_prompt`]
    /// otherwise. Incomplete generations (any stop condition other than the
    /// backend's natural end, or a stop-sequence hit) are errors, never
    /// partial answers.
    async fn complete(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<String, CompletionError>;

    /// The effective model identifier, after any aggregator name resolution.
    fn model(&self) -> String;

    /// The configured output token budget.
    fn max_tokens(&self) -> u32;

    /// Default system prompt: the persona instruction plus a length
    /// instruction derived from the current token budget. Recomputed on
    /// every call so a changed budget is always reflected.
    fn context_prompt(&self) -> String {
        format!(
            "{DEFAULT_SYSTEM_PROMPT}Keep your answer below {} tokens",
            self.max_tokens() * 3 / 4
        )
    }
}

/// Builds the HTTP client shared by the adapters: bounded total timeout,
/// rustls transport.
pub(crate) fn http_client() -> Result<reqwest::Client, CompletionError> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| CompletionError::Configuration(format!("failed to build HTTP client: {e}")))
}

/// Completion-state validation shared by every adapter.
///
/// A raw completion is accepted only when the backend-reported stop
/// condition equals the backend's natural-end signal and no truncating stop
/// sequence was hit. Anything else is reported, never silently returned.
pub(crate) fn validate_completion_state(
    stop_reason: Option<&str>,
    natural_end: &str,
    stop_sequence: Option<&str>,
) -> Result<(), CompletionError> {
    if stop_sequence.is_some() {
        return Err(CompletionError::Incomplete {
            stop_reason: "stop_sequence".to_string(),
        });
    }
    match stop_reason {
        Some(reason) if reason == natural_end => Ok(()),
        Some(reason) => Err(CompletionError::Incomplete {
            stop_reason: reason.to_string(),
        }),
        None => Err(CompletionError::Incomplete {
            stop_reason: "unknown".to_string(),
        }),
    }
}
