//! TOML configuration: provider selection, cache bounds, generation knobs.
//!
//! Loaded from `<config_dir>/paperweave/config.toml`. A missing file yields
//! defaults; a malformed file is an error (never silently replaced). API
//! keys may live in the config file or in the environment — the environment
//! is consulted as a fallback, so secrets can stay out of the file entirely.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WeaveError};

/// Application name used for config/cache/data directory segments.
const APP_DIR: &str = "paperweave";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// LLM backend selection and connection settings.
    pub provider: ProviderConfig,
    /// Response cache behavior.
    pub cache: CacheConfig,
    /// Sampling parameters forwarded to the backend.
    pub generation: GenerationConfig,
}

/// Which backend family to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Local Ollama server (`/api/generate`).
    #[default]
    Ollama,
    /// Any OpenAI-compatible chat-completions endpoint.
    OpenAi,
}

/// LLM backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Backend family.
    pub kind: ProviderKind,
    /// Model name. Empty means the family's default model.
    pub model: String,
    /// Base URL override. Empty means the family's default endpoint.
    pub base_url: String,
    /// API key for hosted backends. The `OPENAI_API_KEY` environment
    /// variable is consulted when this is empty.
    pub api_key: String,
    /// Request timeout in seconds for the blocking generation call.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            model: String::new(),
            base_url: String::new(),
            api_key: String::new(),
            timeout_secs: 300,
        }
    }
}

impl ProviderConfig {
    /// Resolve the API key: config value first, environment fallback.
    pub fn resolve_api_key(&self) -> Option<String> {
        if !self.api_key.is_empty() {
            return Some(self.api_key.clone());
        }
        std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
    }
}

/// Response cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether generation consults the cache at all.
    pub enabled: bool,
    /// Cache directory override. Empty means the platform cache dir.
    pub dir: String,
    /// Upper bound on entry files kept on disk (LRU-evicted beyond this).
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: String::new(),
            max_entries: 1000,
        }
    }
}

/// Sampling parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Sampling temperature. Zero keeps repeated generations comparable.
    pub temperature: f64,
    /// Completion token cap forwarded to hosted backends.
    pub max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: 8192,
        }
    }
}

impl Config {
    /// Default config file path: `<config_dir>/paperweave/config.toml`.
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.toml")
    }

    /// Load from the default path. Missing file yields defaults.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::path())
    }

    /// Load from an explicit path. Missing file yields defaults; a file
    /// that exists but does not parse is an error.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };
        toml::from_str(&raw).map_err(|err| {
            WeaveError::Config(format!("Failed to parse {}: {}", path.display(), err))
        })
    }

    /// Write this configuration to `path` as pretty TOML.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let rendered = toml::to_string_pretty(self)
            .map_err(|err| WeaveError::Config(format!("Failed to serialize config: {}", err)))?;
        std::fs::write(path, rendered)?;
        Ok(())
    }

    /// Resolve the cache directory: config override, else the platform
    /// cache dir (`<cache_dir>/paperweave/responses`).
    pub fn cache_dir(&self) -> PathBuf {
        if !self.cache.dir.is_empty() {
            return PathBuf::from(&self.cache.dir);
        }
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("responses")
    }

    /// Resolve the data directory holding the wizard draft.
    pub fn data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.provider.kind, ProviderKind::Ollama);
        assert!(config.cache.enabled);
        assert_eq!(config.cache.max_entries, 1000);
        assert_eq!(config.generation.temperature, 0.0);
        assert_eq!(config.generation.max_tokens, 8192);
        assert_eq!(config.provider.timeout_secs, 300);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from_path(&dir.path().join("absent.toml")).unwrap();
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[provider]\nkind = \"openai\"\nmodel = \"gpt-4o\"\n").unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.provider.kind, ProviderKind::OpenAi);
        assert_eq!(config.provider.model, "gpt-4o");
        assert_eq!(config.cache.max_entries, 1000);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [valid").unwrap();
        assert!(Config::load_from_path(&path).is_err());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.provider.kind = ProviderKind::OpenAi;
        config.cache.max_entries = 42;
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.provider.kind, ProviderKind::OpenAi);
        assert_eq!(loaded.cache.max_entries, 42);
    }

    #[test]
    fn test_cache_dir_override() {
        let mut config = Config::default();
        config.cache.dir = "/tmp/paperweave-test-cache".to_string();
        assert_eq!(
            config.cache_dir(),
            PathBuf::from("/tmp/paperweave-test-cache")
        );
    }
}
