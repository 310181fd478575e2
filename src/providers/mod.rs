//! LLM backend abstraction and reply normalization.
//!
//! Providers are constructed once from configuration and injected where
//! generation is needed; there is no global provider instance. Each
//! provider returns an [`LlmReply`] in whatever shape its wire format
//! naturally produces; [`normalize_reply`] folds every shape to plain text
//! before the response reaches the cache.

pub mod ollama;
pub mod openai;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::config::{Config, ProviderKind};
use crate::error::Result;

/// Known chat models per backend family.
///
/// Used to warn about likely typos in configuration; an unlisted model is
/// still forwarded as-is so new releases work without a code change.
const KNOWN_MODELS: &[(ProviderKind, &[&str])] = &[
    (
        ProviderKind::Ollama,
        &["llama3:8b", "llama3:70b", "qwen3:latest", "qwq:latest"],
    ),
    (
        ProviderKind::OpenAi,
        &[
            "gpt-4o",
            "gpt-4.1",
            "gpt-4-1106-preview",
            "deepseek-chat",
            "claude-3-7-sonnet-latest",
        ],
    ),
];

/// A chat message object as returned by chat-style APIs.
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantMessage {
    /// Final message text.
    pub content: String,
    /// Role label reported by the backend, usually `assistant`.
    #[serde(default)]
    pub role: String,
}

/// The reply shapes a backend may produce.
///
/// Backends disagree about the envelope around the generated text: plain
/// completion endpoints return a bare string, retrieval chains return a map
/// carrying an `answer` or `content` field, chat endpoints return a message
/// object. The set is closed; normalization is a plain `match`, not runtime
/// type inspection.
#[derive(Debug, Clone)]
pub enum LlmReply {
    /// Bare completion text.
    Text(String),
    /// A keyed map, e.g. `{"answer": "..."}`.
    Keyed(Map<String, Value>),
    /// A chat message object.
    Message(AssistantMessage),
}

/// Fold a reply into plain text.
///
/// Keyed maps prefer `answer`, then `content`; a map with neither is
/// serialized whole rather than dropped, so nothing is silently lost.
pub fn normalize_reply(reply: LlmReply) -> String {
    match reply {
        LlmReply::Text(text) => text,
        LlmReply::Keyed(map) => match map.get("answer").or_else(|| map.get("content")) {
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => Value::Object(map).to_string(),
        },
        LlmReply::Message(message) => message.content,
    }
}

/// A language-model backend that turns a prompt into a reply.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Human-readable backend name for logs and status output.
    fn name(&self) -> &str;

    /// Generate a reply for `prompt`.
    ///
    /// Errors (network, authentication, quota) propagate unchanged; the
    /// caching layer neither retries nor caches a failed call.
    async fn generate(&self, prompt: &str) -> Result<LlmReply>;
}

/// Build the configured provider.
pub fn build_provider(config: &Config) -> Result<Arc<dyn LlmProvider>> {
    warn_on_unknown_model(config);
    match config.provider.kind {
        ProviderKind::Ollama => Ok(Arc::new(OllamaProvider::from_config(config))),
        ProviderKind::OpenAi => Ok(Arc::new(OpenAiProvider::from_config(config)?)),
    }
}

/// Default model per backend family, used when the config leaves it empty.
pub fn default_model(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::Ollama => "qwen3:latest",
        ProviderKind::OpenAi => "gpt-4o",
    }
}

fn warn_on_unknown_model(config: &Config) {
    let model = config.provider.model.as_str();
    if model.is_empty() {
        return;
    }
    let known = KNOWN_MODELS
        .iter()
        .find(|(kind, _)| *kind == config.provider.kind)
        .map(|(_, models)| models.contains(&model))
        .unwrap_or(false);
    if !known {
        tracing::warn!(
            model = %model,
            "Model is not in the known-model table; forwarding as-is"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keyed(value: Value) -> LlmReply {
        match value {
            Value::Object(map) => LlmReply::Keyed(map),
            _ => panic!("test fixture must be an object"),
        }
    }

    #[test]
    fn test_normalize_plain_text() {
        let text = normalize_reply(LlmReply::Text("plain".into()));
        assert_eq!(text, "plain");
    }

    #[test]
    fn test_normalize_answer_field() {
        let reply = keyed(json!({"answer": "from answer", "content": "ignored"}));
        assert_eq!(normalize_reply(reply), "from answer");
    }

    #[test]
    fn test_normalize_content_field() {
        let reply = keyed(json!({"content": "from content"}));
        assert_eq!(normalize_reply(reply), "from content");
    }

    #[test]
    fn test_normalize_unrecognized_map_serialized_whole() {
        let reply = keyed(json!({"text": "elsewhere"}));
        assert_eq!(normalize_reply(reply), r#"{"text":"elsewhere"}"#);
    }

    #[test]
    fn test_normalize_message_object() {
        let reply = LlmReply::Message(AssistantMessage {
            content: "assistant text".into(),
            role: "assistant".into(),
        });
        assert_eq!(normalize_reply(reply), "assistant text");
    }

    #[test]
    fn test_default_models() {
        assert_eq!(default_model(ProviderKind::Ollama), "qwen3:latest");
        assert_eq!(default_model(ProviderKind::OpenAi), "gpt-4o");
    }
}
