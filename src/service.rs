//! Completion service.
//!
//! The unit the HTTP boundary invokes: one backend adapter composed with one
//! response shaper. Handles a single request-to-completion cycle at a time
//! per invocation; the only cross-request state is the shaper's phrase-bank
//! cache.

use std::sync::Arc;

use crate::error::CompletionError;
use crate::providers::CompletionBackend;
use crate::shaping::{ResponseShaper, ShapingCriteria};

pub struct CompletionService {
    backend: Arc<dyn CompletionBackend>,
    shaper: ResponseShaper,
}

impl CompletionService {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self::with_shaper(backend, ResponseShaper::new())
    }

    /// Compose with a specific shaper (e.g. a seeded one in tests).
    pub fn with_shaper(backend: Arc<dyn CompletionBackend>, shaper: ResponseShaper) -> Self {
        Self { backend, shaper }
    }

    /// Run one generation and return the validated answer.
    pub async fn generate(&self, prompt: &str) -> Result<String, CompletionError> {
        if prompt.trim().is_empty() {
            return Err(CompletionError::InvalidInput(
                "prompt must not be empty".to_string(),
            ));
        }
        tracing::debug!(model = %self.backend.model(), prompt_chars = prompt.len(), "running completion");
        let answer = self.backend.complete(prompt, None).await?;
        tracing::debug!(answer_chars = answer.len(), "completion accepted");
        Ok(answer)
    }

    /// Run one generation, then reshape the answer to the given criteria
    /// and target word count.
    pub async fn generate_shaped(
        &self,
        prompt: &str,
        criteria: &ShapingCriteria,
        target_words: Option<usize>,
    ) -> Result<String, CompletionError> {
        let answer = self.generate(prompt).await?;
        if let Some(subject_type) = criteria.subject_type.as_deref() {
            let style = self.shaper.select_explanation_style(subject_type);
            tracing::debug!(subject_type, style, "selected explanation style");
        }
        Ok(self.shaper.format(&answer, criteria, target_words))
    }

    /// The backend's effective model identifier.
    pub fn describe_model(&self) -> String {
        self.backend.model()
    }
}
