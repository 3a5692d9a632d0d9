use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{check_status, http_client, CompletionProvider, GenerationSettings, ProviderError};

const PROVIDER: &str = "ollama";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Local model served by Ollama's `/api/generate` endpoint.
pub struct OllamaProvider {
    settings: GenerationSettings,
    endpoint: String,
    http_client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(
        settings: GenerationSettings,
        host: String,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let endpoint = format!("{}/api/generate", host.trim_end_matches('/'));
        Ok(Self {
            settings,
            endpoint,
            http_client: http_client(PROVIDER, timeout)?,
        })
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            model: &self.settings.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.settings.temperature,
                num_predict: self.settings.max_tokens,
            },
        }
    }
}

#[async_trait]
impl CompletionProvider for OllamaProvider {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|source| ProviderError::Request {
                provider: PROVIDER,
                source,
            })?;

        let response = check_status(PROVIDER, response).await?;
        let parsed: GenerateResponse =
            response
                .json()
                .await
                .map_err(|e| ProviderError::MalformedResponse {
                    provider: PROVIDER,
                    reason: e.to_string(),
                })?;
        Ok(parsed.response)
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.settings.model
    }
}
