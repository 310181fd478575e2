//! Least-recently-used eviction over the on-disk store.
//!
//! Invoked opportunistically after a generation writes new entries, not on
//! every store operation. Two concurrent passes may target the same oldest
//! file; deletes tolerate an already-missing file, so that race is benign.

use tracing::{debug, warn};

use crate::cache::store::ResponseStore;
use crate::error::Result;

/// Delete least-recently-accessed entry files until at most `max_entries`
/// remain. Returns the number of files removed.
///
/// Both response and prompt files count toward the bound; each is an
/// independent file on disk. A per-file delete failure is logged and
/// skipped, never aborting the rest of the pass. A store already within
/// bound is a no-op, so repeated invocation is idempotent.
pub fn enforce_bound(store: &ResponseStore, max_entries: usize) -> Result<usize> {
    let mut entries = store.list_all()?;
    if entries.len() <= max_entries {
        return Ok(0);
    }

    // Oldest access first — true LRU by recency, not insertion order.
    entries.sort_by_key(|entry| entry.accessed_at);

    let excess = entries.len() - max_entries;
    let mut evicted = 0usize;
    for entry in entries.into_iter().take(excess) {
        match store.remove_entry(&entry.key, entry.namespace) {
            Ok(()) => {
                debug!(key = %entry.key, "Evicted cache entry");
                evicted += 1;
            }
            Err(err) => {
                warn!(
                    key = %entry.key,
                    error = %err,
                    "Skipping cache entry that could not be evicted"
                );
            }
        }
    }

    Ok(evicted)
}
