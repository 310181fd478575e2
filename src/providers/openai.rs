//! OpenAI-compatible chat-completions provider.
//!
//! Speaks the `/chat/completions` wire format, which also covers DeepSeek
//! and other compatible gateways via the configurable base URL. Every
//! generation is a single-turn chat: a fixed system message plus the
//! assembled prompt as the sole user message.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::config::{Config, ProviderKind};
use crate::error::{Result, WeaveError};

use super::{default_model, AssistantMessage, LlmProvider, LlmReply};

/// Default chat-completions endpoint base.
const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// System message sent with every generation.
const SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

/// OpenAI-compatible provider.
pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl OpenAiProvider {
    /// Build from configuration.
    ///
    /// Fails when no API key is available in either the config file or the
    /// `OPENAI_API_KEY` environment variable.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.provider.resolve_api_key().ok_or_else(|| {
            WeaveError::Config(
                "No API key configured; set provider.api_key or OPENAI_API_KEY".to_string(),
            )
        })?;

        let base_url = if config.provider.base_url.is_empty() {
            OPENAI_API_BASE.to_string()
        } else {
            config.provider.base_url.trim_end_matches('/').to_string()
        };

        let model = if config.provider.model.is_empty() {
            default_model(ProviderKind::OpenAi).to_string()
        } else {
            config.provider.model.clone()
        };

        Ok(Self {
            client: build_client(config.provider.timeout_secs),
            base_url,
            api_key,
            model,
            temperature: config.generation.temperature,
            max_tokens: config.generation.max_tokens,
        })
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt }
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        })
    }

    /// Pull the assistant message out of a chat-completions response body.
    fn extract_message(response: &Value) -> Option<AssistantMessage> {
        let message = &response["choices"][0]["message"];
        Some(AssistantMessage {
            content: message["content"].as_str()?.to_string(),
            role: message["role"].as_str().unwrap_or("assistant").to_string(),
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, prompt: &str) -> Result<LlmReply> {
        debug!(model = %self.model, "Chat-completions request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            // Surface the API's own message when the error body is JSON.
            let detail = serde_json::from_str::<Value>(&error_text)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(String::from))
                .unwrap_or(error_text);
            return Err(WeaveError::Provider(format!(
                "Chat API returned status {}: {}",
                status, detail
            )));
        }

        let body: Value = response.json().await?;
        let message = Self::extract_message(&body).ok_or_else(|| {
            WeaveError::Provider("Chat response carried no assistant message".to_string())
        })?;
        Ok(LlmReply::Message(message))
    }
}

fn build_client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_message() {
        let body = json!({
            "choices": [{
                "message": { "role": "assistant", "content": "generated text" }
            }]
        });
        let message = OpenAiProvider::extract_message(&body).unwrap();
        assert_eq!(message.content, "generated text");
        assert_eq!(message.role, "assistant");
    }

    #[test]
    fn test_extract_message_missing_content() {
        let body = json!({ "choices": [] });
        assert!(OpenAiProvider::extract_message(&body).is_none());
    }

    #[test]
    fn test_from_config_uses_config_key_and_defaults() {
        let mut config = Config::default();
        config.provider.api_key = "sk-test".to_string();
        let provider = OpenAiProvider::from_config(&config).unwrap();
        assert_eq!(provider.base_url, OPENAI_API_BASE);
        assert_eq!(provider.model, "gpt-4o");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let mut config = Config::default();
        config.provider.api_key = "sk-test".to_string();
        config.provider.base_url = "https://gateway.example/v1/".to_string();
        let provider = OpenAiProvider::from_config(&config).unwrap();
        assert_eq!(provider.base_url, "https://gateway.example/v1");
    }

    #[test]
    fn test_request_body_shape() {
        let mut config = Config::default();
        config.provider.api_key = "sk-test".to_string();
        config.provider.model = "gpt-4o".to_string();
        let provider = OpenAiProvider::from_config(&config).unwrap();

        let body = provider.request_body("draft this");
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "draft this");
        assert_eq!(body["temperature"], 0.0);
    }
}
