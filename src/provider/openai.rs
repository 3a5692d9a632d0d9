use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{check_status, http_client, CompletionProvider, GenerationSettings, ProviderError};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const PROVIDER: &str = "openai";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
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
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub struct OpenAiProvider {
    settings: GenerationSettings,
    api_key: String,
    http_client: reqwest::Client,
}

impl OpenAiProvider {
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

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.settings.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        }
    }
}

fn extract_text(response: ChatResponse) -> Result<String, ProviderError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| ProviderError::MalformedResponse {
            provider: PROVIDER,
            reason: "no message content in choices".into(),
        })
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let response = self
            .http_client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|source| ProviderError::Request {
                provider: PROVIDER,
                source,
            })?;

        let response = check_status(PROVIDER, response).await?;
        let parsed: ChatResponse =
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

    fn provider() -> OpenAiProvider {
        OpenAiProvider::new(
            GenerationSettings {
                model: "gpt-4".into(),
                temperature: 0.8,
                max_tokens: 2000,
            },
            "sk-test".into(),
            Duration::from_secs(60),
        )
        .unwrap()
    }

    #[test]
    fn request_body_matches_chat_format() {
        let p = provider();
        let json = serde_json::to_value(p.request_body("Continue the scene.")).unwrap();
        assert_eq!(json["model"], "gpt-4");
        assert_eq!(json["max_tokens"], 2000);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Continue the scene.");
    }

    #[test]
    fn extracts_first_choice() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"The door creaked."}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), "The door creaked.");
    }

    #[test]
    fn empty_choices_is_malformed() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            extract_text(response),
            Err(ProviderError::MalformedResponse { .. })
        ));
    }
}
