//! Cache command handlers.

use anyhow::{Context, Result};

use paperweave::cache::{enforce_bound, ResponseStore};
use paperweave::config::Config;

use super::CacheAction;

/// Inspect and manage the response cache.
pub(crate) async fn cmd_cache(action: CacheAction) -> Result<()> {
    let config = Config::load().with_context(|| "Failed to load configuration")?;
    let store = ResponseStore::new(config.cache_dir());

    match action {
        CacheAction::Stats => {
            let stats = store.stats()?;
            println!("Cache directory: {}", store.dir().display());
            println!("Entries:         {}", stats.total_entries);
            println!("Disk usage:      {} bytes", stats.total_bytes);
            println!("Entry bound:     {}", config.cache.max_entries);
        }
        CacheAction::Evict => {
            let evicted = enforce_bound(&store, config.cache.max_entries)
                .with_context(|| "Eviction pass failed")?;
            println!("Evicted {} entr{}.", evicted, if evicted == 1 { "y" } else { "ies" });
        }
        CacheAction::Clear => {
            let removed = store.clear().with_context(|| "Failed to clear cache")?;
            println!("Removed {} file(s).", removed);
        }
    }

    Ok(())
}
