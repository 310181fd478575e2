//! Disk-backed LLM response caching: key derivation, compressed storage,
//! and LRU eviction.

pub mod eviction;
pub mod key;
pub mod store;

pub use eviction::enforce_bound;
pub use key::{derive_key, derive_params_key};
pub use store::{EntryMeta, Namespace, ResponseStore, StoreStats};
