//! Cache key derivation.
//!
//! A cache key is the SHA-256 digest of the request content, truncated to
//! 128 bits and rendered as 32 lowercase hex characters. Content-derived
//! keys make the cache deduplicate identical requests across sessions and
//! processes without any coordination.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Digest bytes kept in a rendered key (128 bits, 32 hex characters).
const KEY_BYTES: usize = 16;

/// Derive the cache key for a request's identifying content.
///
/// Pure function: same input always yields the same output, and any finite
/// string is valid input.
pub fn derive_key(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    digest[..KEY_BYTES]
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// Derive a cache key from a set of identifying fields.
///
/// The fields are canonicalized through [`serde_json::Value`], whose object
/// maps are ordered by key, so semantically identical inputs produce
/// byte-identical serializations regardless of original field order.
pub fn derive_params_key<T: Serialize>(params: &T) -> Result<String> {
    let canonical = serde_json::to_value(params)?;
    Ok(derive_key(&canonical.to_string()))
}
