//! Text-generation collaborators.
//!
//! The memory engine never talks to a model; the `draft` command does, through
//! the one-method [`CompletionProvider`] trait. [`create_provider`] picks the
//! backend from [`ProviderKind`].

pub mod anthropic;
pub mod ollama;
pub mod openai;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{ProviderConfig, ProviderKind};

/// Failures from a completion backend. Reported upward unchanged.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no API key for {provider}: set {env_var} or provider.api_key in config.toml")]
    MissingApiKey {
        provider: &'static str,
        env_var: &'static str,
    },

    #[error("{provider} request failed: {source}")]
    Request {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} API error {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} returned an unexpected response: {reason}")]
    MalformedResponse {
        provider: &'static str,
        reason: String,
    },
}

/// Generation settings shared by every backend.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send an assembled prompt and return the generated text.
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Backend name, for logs.
    fn name(&self) -> &'static str;

    fn model(&self) -> &str;
}

/// Create a provider from config. API keys fall back to the backend's
/// environment variable (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`).
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn CompletionProvider>, ProviderError> {
    let kind = config.kind;
    let settings = GenerationSettings {
        model: if config.model.trim().is_empty() {
            kind.default_model().to_string()
        } else {
            config.model.clone()
        },
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    };
    let timeout = Duration::from_secs(config.timeout_secs);

    match kind {
        ProviderKind::OpenAi => {
            let api_key = resolve_api_key(config)?;
            Ok(Box::new(openai::OpenAiProvider::new(settings, api_key, timeout)?))
        }
        ProviderKind::Anthropic => {
            let api_key = resolve_api_key(config)?;
            Ok(Box::new(anthropic::AnthropicProvider::new(settings, api_key, timeout)?))
        }
        ProviderKind::Ollama => Ok(Box::new(ollama::OllamaProvider::new(
            settings,
            config.host.clone(),
            timeout,
        )?)),
    }
}

fn resolve_api_key(config: &ProviderConfig) -> Result<String, ProviderError> {
    let env_var = config.kind.api_key_env().unwrap_or("API_KEY");
    config
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| std::env::var(env_var).ok().filter(|k| !k.trim().is_empty()))
        .ok_or(ProviderError::MissingApiKey {
            provider: config.kind.as_str(),
            env_var,
        })
}

pub(crate) fn http_client(
    provider: &'static str,
    timeout: Duration,
) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|source| ProviderError::Request { provider, source })
}

/// Turn a non-2xx response into [`ProviderError::Status`].
pub(crate) async fn check_status(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Status {
        provider,
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_api_key_wins() {
        let config = ProviderConfig {
            kind: ProviderKind::Anthropic,
            api_key: Some("sk-test".into()),
            ..ProviderConfig::default()
        };
        assert_eq!(resolve_api_key(&config).unwrap(), "sk-test");
    }

    #[test]
    fn ollama_needs_no_key() {
        let config = ProviderConfig {
            kind: ProviderKind::Ollama,
            ..ProviderConfig::default()
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.name(), "ollama");
        assert_eq!(provider.model(), "llama2");
    }

    #[test]
    fn configured_model_overrides_default() {
        let config = ProviderConfig {
            kind: ProviderKind::OpenAi,
            model: "gpt-4o-mini".into(),
            api_key: Some("sk-test".into()),
            ..ProviderConfig::default()
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.model(), "gpt-4o-mini");
    }

    #[test]
    fn missing_key_error_names_env_var() {
        let err = ProviderError::MissingApiKey {
            provider: "openai",
            env_var: "OPENAI_API_KEY",
        };
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
