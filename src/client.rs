//! Cached request orchestration around the LLM call.
//!
//! `CachedClient` ties the key deriver, the persistent store, and an
//! injected provider together. It is constructed once and passed where
//! generation is needed — there is no module-level provider or cache
//! singleton anywhere in the crate.

use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::key::derive_key;
use crate::cache::store::ResponseStore;
use crate::error::Result;
use crate::providers::{normalize_reply, LlmProvider};

/// Orchestrates cache lookup, LLM invocation, and cache population.
pub struct CachedClient {
    provider: Arc<dyn LlmProvider>,
    store: ResponseStore,
}

impl CachedClient {
    /// Build a client from an injected provider and store.
    pub fn new(provider: Arc<dyn LlmProvider>, store: ResponseStore) -> Self {
        Self { provider, store }
    }

    /// The underlying store, for history listing and eviction.
    pub fn store(&self) -> &ResponseStore {
        &self.store
    }

    /// Resolve `prompt` to a response, via the cache when `use_cache` is set.
    ///
    /// The key is derived from the prompt text alone; model and sampling
    /// parameters deliberately do not participate, so switching models does
    /// not invalidate cached responses (see DESIGN.md). On a hit the stored
    /// value is returned and the provider is never invoked. On a miss (or
    /// with `use_cache` off) the provider runs once, its reply is normalized
    /// to plain text and stored, and the text is returned.
    ///
    /// Always returns the derived key alongside the response so the caller
    /// can record the originating prompt under the same key stem. Provider
    /// errors propagate unchanged and never produce a cache entry.
    pub async fn request(&self, prompt: &str, use_cache: bool) -> Result<(String, String)> {
        let key = derive_key(prompt);

        if use_cache {
            if let Some(cached) = self.store.get(&key)? {
                debug!(key = %key, "Cache hit");
                return Ok((key, cached));
            }
            debug!(key = %key, "Cache miss");
        }

        let reply = self.provider.generate(prompt).await?;
        let text = normalize_reply(reply);
        self.store.put(&key, &text)?;
        info!(
            key = %key,
            provider = self.provider.name(),
            "Stored generated response"
        );
        Ok((key, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WeaveError;
    use crate::providers::{AssistantMessage, LlmReply};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Counts invocations and returns a fixed reply shape.
    struct StubProvider {
        calls: AtomicUsize,
        reply: fn() -> LlmReply,
        fail: bool,
    }

    #[async_trait]
    impl LlmProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        async fn generate(&self, _prompt: &str) -> crate::error::Result<LlmReply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(WeaveError::Provider("backend unavailable".into()));
            }
            Ok((self.reply)())
        }
    }

    fn client_with(provider: StubProvider) -> (TempDir, CachedClient, Arc<StubProvider>) {
        let dir = TempDir::new().unwrap();
        let store = ResponseStore::new(dir.path());
        let provider = Arc::new(provider);
        let client = CachedClient::new(provider.clone(), store);
        (dir, client, provider)
    }

    fn stub(reply: fn() -> LlmReply) -> StubProvider {
        StubProvider {
            calls: AtomicUsize::new(0),
            reply,
            fail: false,
        }
    }

    fn failing_stub() -> StubProvider {
        StubProvider {
            calls: AtomicUsize::new(0),
            reply: || LlmReply::Text(String::new()),
            fail: true,
        }
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let (_dir, client, provider) = client_with(stub(|| {
            LlmReply::Text("Photosynthesis converts light to chemical energy.".into())
        }));

        let (key, first) = client.request("Summarize photosynthesis", true).await.unwrap();
        assert_eq!(key.len(), 32);
        assert_eq!(first, "Photosynthesis converts light to chemical energy.");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        let (key2, second) = client.request("Summarize photosynthesis", true).await.unwrap();
        assert_eq!(key2, key);
        assert_eq!(second, first);
        assert_eq!(
            provider.calls.load(Ordering::SeqCst),
            1,
            "cache hit must not invoke the provider again"
        );
    }

    #[tokio::test]
    async fn test_no_cache_bypasses_lookup() {
        let (_dir, client, provider) =
            client_with(stub(|| LlmReply::Text("fresh".into())));

        client.request("p", true).await.unwrap();
        client.request("p", false).await.unwrap();
        assert_eq!(
            provider.calls.load(Ordering::SeqCst),
            2,
            "use_cache=false must invoke the provider"
        );
    }

    #[tokio::test]
    async fn test_failed_call_caches_nothing() {
        let (_dir, client, provider) = client_with(failing_stub());

        let err = client.request("will fail", true).await.unwrap_err();
        assert!(matches!(err, WeaveError::Provider(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert!(
            !client.store().exists(&derive_key("will fail")),
            "a failed call must never produce a cache entry"
        );
    }

    #[tokio::test]
    async fn test_normalizes_keyed_reply_before_caching() {
        let (_dir, client, _provider) = client_with(stub(|| {
            match json!({"answer": "normalized"}) {
                serde_json::Value::Object(map) => LlmReply::Keyed(map),
                _ => unreachable!(),
            }
        }));

        let (key, text) = client.request("p", true).await.unwrap();
        assert_eq!(text, "normalized");
        // The stored value is the normalized plain string, not the envelope.
        assert_eq!(client.store().get(&key).unwrap().as_deref(), Some("normalized"));
    }

    #[tokio::test]
    async fn test_normalizes_message_reply() {
        let (_dir, client, _provider) = client_with(stub(|| {
            LlmReply::Message(AssistantMessage {
                content: "assistant text".into(),
                role: "assistant".into(),
            })
        }));

        let (_key, text) = client.request("p", true).await.unwrap();
        assert_eq!(text, "assistant text");
    }

    #[tokio::test]
    async fn test_distinct_prompts_distinct_keys() {
        let (_dir, client, _provider) =
            client_with(stub(|| LlmReply::Text("same".into())));

        let (k1, _) = client.request("prompt one", true).await.unwrap();
        let (k2, _) = client.request("prompt two", true).await.unwrap();
        assert_ne!(k1, k2);
        assert!(client.store().exists(&k1));
        assert!(client.store().exists(&k2));
    }
}
