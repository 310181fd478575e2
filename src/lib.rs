//! Step-wise article drafting assistant with a disk-backed LLM response cache.
//!
//! The flow: collect a topic, an outline, and per-section reference text;
//! assemble a prompt; resolve it through [`client::CachedClient`], which
//! consults a compressed on-disk cache before invoking the configured LLM
//! backend; show or save the article, with past generations browsable via
//! [`history`].
//!
//! The cache is content-addressed: a request's key is a digest of its
//! prompt text ([`cache::derive_key`]), entries are one gzip-compressed
//! file each ([`cache::ResponseStore`]), and the store is bounded by LRU
//! eviction ([`cache::enforce_bound`]).

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod history;
pub mod providers;
pub mod wizard;

pub use client::CachedClient;
pub use error::{Result, WeaveError};
