//! Ollama provider, speaking the local `/api/generate` endpoint.
//!
//! Non-streaming: one blocking completion per request, matching the
//! request-per-interaction execution model of the drafting flow.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::{Config, ProviderKind};
use crate::error::{Result, WeaveError};

use super::{default_model, LlmProvider, LlmReply};

/// Default local Ollama server.
const OLLAMA_API_BASE: &str = "http://localhost:11434";

/// Ollama generate request body.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f64,
}

/// Ollama generate response body (the fields this crate consumes).
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Provider for a local or remote Ollama server.
#[derive(Debug)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    temperature: f64,
}

impl OllamaProvider {
    /// Build from configuration. Ollama needs no credentials, so this is
    /// infallible.
    pub fn from_config(config: &Config) -> Self {
        let base_url = if config.provider.base_url.is_empty() {
            OLLAMA_API_BASE.to_string()
        } else {
            config.provider.base_url.trim_end_matches('/').to_string()
        };
        let model = if config.provider.model.is_empty() {
            default_model(ProviderKind::Ollama).to_string()
        } else {
            config.provider.model.clone()
        };
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.provider.timeout_secs))
                .build()
                .unwrap_or_default(),
            base_url,
            model,
            temperature: config.generation.temperature,
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, prompt: &str) -> Result<LlmReply> {
        debug!(model = %self.model, "Ollama generate request");

        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<serde_json::Value>(&error_text)
                .ok()
                .and_then(|v| v["error"].as_str().map(String::from))
                .unwrap_or(error_text);
            return Err(WeaveError::Provider(format!(
                "Ollama returned status {}: {}",
                status, detail
            )));
        }

        let parsed: GenerateResponse = response.json().await?;
        Ok(LlmReply::Text(parsed.response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_defaults() {
        let provider = OllamaProvider::from_config(&Config::default());
        assert_eq!(provider.base_url, OLLAMA_API_BASE);
        assert_eq!(provider.model, "qwen3:latest");
        assert_eq!(provider.temperature, 0.0);
    }

    #[test]
    fn test_from_config_overrides() {
        let mut config = Config::default();
        config.provider.base_url = "http://10.0.0.2:11434/".to_string();
        config.provider.model = "llama3:70b".to_string();
        let provider = OllamaProvider::from_config(&config);
        assert_eq!(provider.base_url, "http://10.0.0.2:11434");
        assert_eq!(provider.model, "llama3:70b");
    }

    #[test]
    fn test_request_body_serialization() {
        let body = GenerateRequest {
            model: "qwen3:latest",
            prompt: "hello",
            stream: false,
            options: GenerateOptions { temperature: 0.0 },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "qwen3:latest");
        assert_eq!(value["stream"], false);
        assert_eq!(value["options"]["temperature"], 0.0);
    }

    #[test]
    fn test_response_deserialization() {
        let parsed: GenerateResponse =
            serde_json::from_str(r#"{"model":"qwen3:latest","response":"text","done":true}"#)
                .unwrap();
        assert_eq!(parsed.response, "text");
    }
}
