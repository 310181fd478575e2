//! Error types for paperweave.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, WeaveError>;

/// Errors surfaced by the library.
///
/// Corrupted cache entries never show up here — the store heals them in
/// place and reports the key as absent instead.
#[derive(Error, Debug)]
pub enum WeaveError {
    /// Storage-layer failure (permissions, disk full, path problems).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file missing a required value or failing to parse.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The LLM backend rejected or failed the request.
    #[error("Provider error: {0}")]
    Provider(String),

    /// Transport-level failure talking to the LLM backend.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON encoding/decoding failure outside the self-healing read path.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
