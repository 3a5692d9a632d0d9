use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{check_status, http_client, CompletionProvider, GenerationSettings, ProviderError};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const PROVIDER: &str = "anthropic";

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

pub struct AnthropicProvider {
    settings: GenerationSettings,
    api_key: String,
    http_client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(
        settings: GenerationSettings,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            settings,
            api_key,
            http_client: http_client(PROVIDER, timeout)?,
        })
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        }
    }
}

/// Concatenate the text blocks of a response.
fn extract_text(response: MessagesResponse) -> Result<String, ProviderError> {
    let text: String = response
        .content
        .into_iter()
        .filter(|block| block.block_type == "text")
        .map(|block| block.text)
        .collect();
    if text.is_empty() {
        return Err(ProviderError::MalformedResponse {
            provider: PROVIDER,
            reason: "no text content blocks".into(),
        });
    }
    Ok(text)
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let response = self
            .http_client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|source| ProviderError::Request {
                provider: PROVIDER,
                source,
            })?;

        let response = check_status(PROVIDER, response).await?;
        let parsed: MessagesResponse =
            response
                .json()
                .await
                .map_err(|e| ProviderError::MalformedResponse {
                    provider: PROVIDER,
                    reason: e.to_string(),
                })?;
        extract_text(parsed)
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.settings.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_messages_format() {
        let provider = AnthropicProvider::new(
            GenerationSettings {
                model: "claude-3-5-sonnet-20241022".into(),
                temperature: 0.5,
                max_tokens: 1024,
            },
            "sk-ant-test".into(),
            Duration::from_secs(60),
        )
        .unwrap();
        let json = serde_json::to_value(provider.request_body("Rewrite this.")).unwrap();
        assert_eq!(json["model"], "claude-3-5-sonnet-20241022");
        assert_eq!(json["max_tokens"], 1024);
        assert_eq!(json["messages"][0]["role"], "user");
        let temp = json["temperature"].as_f64().unwrap();
        assert!((temp - 0.5).abs() < 1e-6);
    }

    #[test]
    fn joins_text_blocks_and_skips_others() {
        let response: MessagesResponse = serde_json::from_str(
            r#"{"content":[{"type":"text","text":"Rain "},{"type":"tool_use","id":"x"},{"type":"text","text":"fell."}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), "Rain fell.");
    }

    #[test]
    fn no_text_is_malformed() {
        let response: MessagesResponse = serde_json::from_str(r#"{"content":[]}"#).unwrap();
        assert!(extract_text(response).is_err());
    }
}
