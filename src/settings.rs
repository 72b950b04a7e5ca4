//! Per-backend settings.
//!
//! One immutable settings struct per backend: credential, model identifier,
//! output token budget, and sampling temperature (plus a base-URL override
//! for the OpenAI-style endpoint). Each struct loads from environment
//! variables under its own prefix (`ANTHROPIC_`, `OPENROUTER_`, `OPENAI_`)
//! with the shared defaults below; a missing credential fails loading, so a
//! misconfigured node aborts at startup rather than on the first request.
//!
//! Credentials are held as [`SecretString`] and never appear in `Debug`
//! output.

use secrecy::SecretString;

use crate::error::CompletionError;

/// Default output token budget shared by every backend.
pub const DEFAULT_MAX_TOKENS: u32 = 3000;
/// Default sampling temperature shared by every backend.
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

/// Default model for the direct Anthropic backend.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20240620";
/// Default model for the aggregator backend (already vendor-prefixed).
pub const DEFAULT_OPENROUTER_MODEL: &str = "anthropic/claude-3.5-sonnet";
/// Default model for the OpenAI backend.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4-1106-preview";
/// Default base URL for the OpenAI backend.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Settings for the direct Anthropic backend.
#[derive(Debug, Clone)]
pub struct AnthropicSettings {
    pub api_key: SecretString,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Settings for the aggregator backend.
#[derive(Debug, Clone)]
pub struct OpenRouterSettings {
    pub api_key: SecretString,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Settings for the OpenAI backend.
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl AnthropicSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into().into(),
            model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Load from `ANTHROPIC_*` environment variables.
    pub fn from_env() -> Result<Self, CompletionError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, CompletionError> {
        let settings = Self {
            api_key: required(&lookup, "ANTHROPIC_API_KEY")?.into(),
            model: lookup("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string()),
            max_tokens: parsed(&lookup, "ANTHROPIC_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
            temperature: parsed(&lookup, "ANTHROPIC_TEMPERATURE", DEFAULT_TEMPERATURE)?,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn validate(&self) -> Result<(), CompletionError> {
        validate_sampling(self.max_tokens, self.temperature)
    }
}

impl OpenRouterSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into().into(),
            model: DEFAULT_OPENROUTER_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Load from `OPENROUTER_*` environment variables.
    pub fn from_env() -> Result<Self, CompletionError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, CompletionError> {
        let settings = Self {
            api_key: required(&lookup, "OPENROUTER_API_KEY")?.into(),
            model: lookup("OPENROUTER_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENROUTER_MODEL.to_string()),
            max_tokens: parsed(&lookup, "OPENROUTER_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
            temperature: parsed(&lookup, "OPENROUTER_TEMPERATURE", DEFAULT_TEMPERATURE)?,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn validate(&self) -> Result<(), CompletionError> {
        validate_sampling(self.max_tokens, self.temperature)
    }
}

impl OpenAiSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into().into(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Load from `OPENAI_*` environment variables.
    pub fn from_env() -> Result<Self, CompletionError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, CompletionError> {
        let settings = Self {
            api_key: required(&lookup, "OPENAI_API_KEY")?.into(),
            base_url: lookup("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            model: lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            max_tokens: parsed(&lookup, "OPENAI_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
            temperature: parsed(&lookup, "OPENAI_TEMPERATURE", DEFAULT_TEMPERATURE)?,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn validate(&self) -> Result<(), CompletionError> {
        validate_sampling(self.max_tokens, self.temperature)
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<String, CompletionError> {
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(CompletionError::Configuration(format!(
            "{key} is not set"
        ))),
    }
}

fn parsed<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, CompletionError> {
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            CompletionError::Configuration(format!("{key} has an unparseable value: {raw}"))
        }),
        None => Ok(default),
    }
}

fn validate_sampling(max_tokens: u32, temperature: f32) -> Result<(), CompletionError> {
    if max_tokens == 0 {
        return Err(CompletionError::Configuration(
            "max_tokens must be positive".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&temperature) {
        return Err(CompletionError::Configuration(format!(
            "temperature must be within 0.0..=1.0, got {temperature}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn missing_credential_fails_loading() {
        let err = AnthropicSettings::from_lookup(env(&[])).unwrap_err();
        assert!(matches!(err, CompletionError::Configuration(_)));
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn defaults_apply_when_only_credential_is_set() {
        let settings =
            OpenRouterSettings::from_lookup(env(&[("OPENROUTER_API_KEY", "sk-or-test")])).unwrap();
        assert_eq!(settings.model, DEFAULT_OPENROUTER_MODEL);
        assert_eq!(settings.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(settings.temperature, DEFAULT_TEMPERATURE);
    }

    #[test]
    fn overrides_are_read_from_the_prefixed_variables() {
        let settings = OpenAiSettings::from_lookup(env(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:9999/v1"),
            ("OPENAI_MODEL", "gpt-4o"),
            ("OPENAI_MAX_TOKENS", "1200"),
            ("OPENAI_TEMPERATURE", "0.2"),
        ]))
        .unwrap();
        assert_eq!(settings.base_url, "http://localhost:9999/v1");
        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(settings.max_tokens, 1200);
        assert_eq!(settings.temperature, 0.2);
    }

    #[test]
    fn unparseable_budget_is_a_configuration_error() {
        let err = AnthropicSettings::from_lookup(env(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("ANTHROPIC_MAX_TOKENS", "lots"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("ANTHROPIC_MAX_TOKENS"));
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        let err = AnthropicSettings::from_lookup(env(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("ANTHROPIC_TEMPERATURE", "1.5"),
        ]))
        .unwrap_err();
        assert!(matches!(err, CompletionError::Configuration(_)));
    }

    #[test]
    fn zero_token_budget_is_rejected() {
        let err = AnthropicSettings::from_lookup(env(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("ANTHROPIC_MAX_TOKENS", "0"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("max_tokens"));
    }

    #[test]
    fn credentials_do_not_leak_through_debug() {
        let settings = AnthropicSettings::new("sk-very-secret");
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("sk-very-secret"));
    }
}
