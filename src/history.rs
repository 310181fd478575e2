//! History view over the response store.
//!
//! Lists past generations (or their prompts) newest first, with short
//! previews for terminal display. Unreadable entries are skipped with a
//! warning — a damaged file must never break the whole listing.

use std::time::SystemTime;

use tracing::warn;

use crate::cache::store::{Namespace, ResponseStore};
use crate::error::Result;

/// One row in the history listing.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Cache key identifying the generation.
    pub key: String,
    /// When the entry was written.
    pub modified_at: SystemTime,
    /// Compressed size on disk.
    pub bytes: u64,
}

/// List entries of one namespace, newest first.
pub fn list(store: &ResponseStore, namespace: Namespace) -> Result<Vec<HistoryEntry>> {
    let mut entries: Vec<HistoryEntry> = store
        .list_all()?
        .into_iter()
        .filter(|entry| entry.namespace == namespace)
        .map(|entry| HistoryEntry {
            key: entry.key,
            modified_at: entry.modified_at,
            bytes: entry.bytes,
        })
        .collect();
    entries.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
    Ok(entries)
}

/// Load the stored text for a history entry, skipping unreadable ones.
///
/// Returns `None` both for a missing entry and for one the store healed
/// away as corrupt; either way there is nothing to display.
pub fn load_text(store: &ResponseStore, key: &str, namespace: Namespace) -> Result<Option<String>> {
    let text = match namespace {
        Namespace::Response => store.get(key)?,
        Namespace::Prompt => store.get_prompt(key)?,
    };
    if text.is_none() {
        warn!(key = %key, "History entry could not be read");
    }
    Ok(text)
}

/// Char-safe preview of the first `max_chars` characters, with an ellipsis
/// when the text continues.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push_str("...");
    }
    // Newlines collapse so a preview stays a single listing row.
    out.replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use tempfile::TempDir;

    fn store_with_entries() -> (TempDir, ResponseStore) {
        let dir = TempDir::new().unwrap();
        let store = ResponseStore::new(dir.path());
        for (i, key) in ["old", "mid", "new"].iter().enumerate() {
            store.put(key, &format!("article {key}")).unwrap();
            store.put_prompt(key, &format!("prompt {key}")).unwrap();
            let mtime = FileTime::from_unix_time(1_700_000_000 + i as i64 * 3600, 0);
            for suffix in [".json.gz", ".json.gz.prompt"] {
                filetime::set_file_mtime(dir.path().join(format!("{key}{suffix}")), mtime)
                    .unwrap();
            }
        }
        (dir, store)
    }

    #[test]
    fn test_list_newest_first_per_namespace() {
        let (_dir, store) = store_with_entries();

        let responses = list(&store, Namespace::Response).unwrap();
        let keys: Vec<&str> = responses.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, ["new", "mid", "old"]);

        let prompts = list(&store, Namespace::Prompt).unwrap();
        assert_eq!(prompts.len(), 3);
    }

    #[test]
    fn test_load_text_both_namespaces() {
        let (_dir, store) = store_with_entries();
        assert_eq!(
            load_text(&store, "mid", Namespace::Response).unwrap().as_deref(),
            Some("article mid")
        );
        assert_eq!(
            load_text(&store, "mid", Namespace::Prompt).unwrap().as_deref(),
            Some("prompt mid")
        );
        assert_eq!(load_text(&store, "gone", Namespace::Response).unwrap(), None);
    }

    #[test]
    fn test_preview_truncation() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("0123456789abc", 10), "0123456789...");
        assert_eq!(preview("multi\nline", 20), "multi line");
        // Multi-byte characters truncate on char boundaries.
        assert_eq!(preview("光合作用工作原理", 4), "光合作用...");
    }

    #[test]
    fn test_corrupt_entry_skipped_not_fatal() {
        let (dir, store) = store_with_entries();
        std::fs::write(dir.path().join("mid.json.gz"), b"garbage").unwrap();
        assert_eq!(load_text(&store, "mid", Namespace::Response).unwrap(), None);
        // The listing still works; the healed entry is simply gone.
        let responses = list(&store, Namespace::Response).unwrap();
        assert_eq!(responses.len(), 2);
    }
}
