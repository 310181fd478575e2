//! Disk-backed response store with gzip-compressed entries.
//!
//! One file per entry under a single cache directory. The filename is
//! derived solely from the cache key: `<key>.json.gz` for a response,
//! `<key>.json.gz.prompt` for the prompt that produced it. File content is
//! a gzip stream whose decompressed form is the JSON-encoded value string.
//!
//! A corrupted entry (bad gzip data, bad JSON) is treated as absent and the
//! offending file is removed on read, so a bad write can never leave a key
//! in a permanent failed-read state. Storage I/O errors propagate.

use std::fs::{self, File};
use std::io::{self, ErrorKind, Read as _, Write as _};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use filetime::FileTime;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::{debug, warn};

use crate::error::Result;

/// Filename suffix for response entries.
const RESPONSE_SUFFIX: &str = ".json.gz";

/// Filename suffix for prompt entries (same key stem, extra suffix).
const PROMPT_SUFFIX: &str = ".json.gz.prompt";

/// The two logical namespaces sharing one cache directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    /// LLM responses, keyed by the digest of the prompt that produced them.
    Response,
    /// The originating prompt text, stored under the same key stem.
    Prompt,
}

impl Namespace {
    fn file_name(self, key: &str) -> String {
        match self {
            Self::Response => format!("{key}{RESPONSE_SUFFIX}"),
            Self::Prompt => format!("{key}{PROMPT_SUFFIX}"),
        }
    }

    /// Recover `(key, namespace)` from a filename.
    ///
    /// Returns `None` for foreign files (temp files, stray artifacts), which
    /// enumeration skips. Prompt entries must be tried first since their
    /// suffix extends the response suffix.
    fn parse(file_name: &str) -> Option<(String, Self)> {
        if let Some(stem) = file_name.strip_suffix(PROMPT_SUFFIX) {
            return Some((stem.to_string(), Self::Prompt));
        }
        file_name
            .strip_suffix(RESPONSE_SUFFIX)
            .map(|stem| (stem.to_string(), Self::Response))
    }
}

/// Metadata for one on-disk entry, as returned by [`ResponseStore::list_all`].
#[derive(Debug, Clone)]
pub struct EntryMeta {
    /// Key stem shared by both namespaces.
    pub key: String,
    /// Which namespace the file belongs to.
    pub namespace: Namespace,
    /// Last access time; eviction evicts the oldest of these first.
    pub accessed_at: SystemTime,
    /// Modification time; history listings show the newest of these first.
    pub modified_at: SystemTime,
    /// Compressed size on disk.
    pub bytes: u64,
}

/// Aggregate store statistics.
#[derive(Debug, Clone)]
pub struct StoreStats {
    /// Number of entry files currently on disk (both namespaces).
    pub total_entries: usize,
    /// Total compressed bytes on disk.
    pub total_bytes: u64,
}

/// Persistent cache store mapping keys to compressed value files.
///
/// All operations touch durable storage directly; there is no in-memory
/// index. Entries are immutable once written — a repeated `put` for the
/// same key overwrites the same file, it never edits in place.
pub struct ResponseStore {
    dir: PathBuf,
}

impl ResponseStore {
    /// Create a store over `dir`. The directory is created lazily on the
    /// first write, so constructing a store is free and infallible.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the entry files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// True iff a readable response entry file is present for `key`.
    pub fn exists(&self, key: &str) -> bool {
        self.entry_path(key, Namespace::Response).is_file()
    }

    /// Read the cached response for `key`, or `None` when absent.
    ///
    /// A corrupted file is removed and reported as absent. On a successful
    /// read the entry's access time is refreshed so LRU ordering holds even
    /// on `noatime` mounts.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.read_entry(key, Namespace::Response)
    }

    /// Store a response under `key`.
    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        self.write_entry(key, Namespace::Response, value)
    }

    /// Read the recorded prompt for `key`, or `None` when absent.
    pub fn get_prompt(&self, key: &str) -> Result<Option<String>> {
        self.read_entry(key, Namespace::Prompt)
    }

    /// Record the prompt that produced the response stored under `key`.
    pub fn put_prompt(&self, key: &str, prompt: &str) -> Result<()> {
        self.write_entry(key, Namespace::Prompt, prompt)
    }

    /// Enumerate every entry file on disk, in no particular order.
    ///
    /// Callers sort as needed: eviction by access time, history by
    /// modification time. A missing cache directory is an empty store.
    pub fn list_all(&self) -> Result<Vec<EntryMeta>> {
        let mut entries = Vec::new();
        let dir_iter = match fs::read_dir(&self.dir) {
            Ok(iter) => iter,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(entries),
            Err(err) => return Err(err.into()),
        };

        for dir_entry in dir_iter {
            let dir_entry = dir_entry?;
            let file_name = dir_entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            let Some((key, namespace)) = Namespace::parse(name) else {
                continue;
            };
            let metadata = dir_entry.metadata()?;
            let modified_at = metadata.modified()?;
            // Fall back to mtime where the platform does not report atime.
            let accessed_at = metadata.accessed().unwrap_or(modified_at);
            entries.push(EntryMeta {
                key,
                namespace,
                accessed_at,
                modified_at,
                bytes: metadata.len(),
            });
        }

        Ok(entries)
    }

    /// Remove the entry for `key`, including its prompt-namespace sibling.
    ///
    /// Idempotent: missing files are not an error.
    pub fn delete(&self, key: &str) -> Result<()> {
        self.remove_entry(key, Namespace::Response)?;
        self.remove_entry(key, Namespace::Prompt)?;
        Ok(())
    }

    /// Remove a single entry file. Idempotent, like [`ResponseStore::delete`].
    pub fn remove_entry(&self, key: &str, namespace: Namespace) -> Result<()> {
        match fs::remove_file(self.entry_path(key, namespace)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Remove every entry file. Returns the number of files removed.
    pub fn clear(&self) -> Result<usize> {
        let entries = self.list_all()?;
        let mut removed = 0usize;
        for entry in &entries {
            self.remove_entry(&entry.key, entry.namespace)?;
            removed += 1;
        }
        Ok(removed)
    }

    /// Aggregate statistics over the current on-disk state.
    pub fn stats(&self) -> Result<StoreStats> {
        let entries = self.list_all()?;
        Ok(StoreStats {
            total_entries: entries.len(),
            total_bytes: entries.iter().map(|entry| entry.bytes).sum(),
        })
    }

    // -- private helpers ---------------------------------------------------

    fn entry_path(&self, key: &str, namespace: Namespace) -> PathBuf {
        self.dir.join(namespace.file_name(key))
    }

    fn read_entry(&self, key: &str, namespace: Namespace) -> Result<Option<String>> {
        let path = self.entry_path(key, namespace);
        let compressed = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        match decode_entry(&compressed) {
            Ok(value) => {
                touch_accessed(&path);
                Ok(Some(value))
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "Removing corrupted cache entry"
                );
                if let Err(remove_err) = fs::remove_file(&path) {
                    if remove_err.kind() != ErrorKind::NotFound {
                        warn!(
                            path = %path.display(),
                            error = %remove_err,
                            "Could not remove corrupted cache entry"
                        );
                    }
                }
                Ok(None)
            }
        }
    }

    /// Compress and write `value`, atomically: the bytes land in a temp file
    /// in the same directory which is then renamed over the final path, so a
    /// concurrent reader never observes a half-written entry.
    fn write_entry(&self, key: &str, namespace: Namespace, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let json = serde_json::to_string(value)?;
        let path = self.entry_path(key, namespace);
        let tmp = self.dir.join(format!("{}.tmp", namespace.file_name(key)));

        let file = File::create(&tmp)?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(json.as_bytes())?;
        encoder.finish()?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Decompress and JSON-decode an entry payload.
///
/// Both failure modes are folded into `InvalidData`-flavored I/O errors so
/// the read path can treat them uniformly as corruption.
fn decode_entry(compressed: &[u8]) -> io::Result<String> {
    let mut decoder = GzDecoder::new(compressed);
    let mut json = String::new();
    decoder.read_to_string(&mut json)?;
    serde_json::from_str(&json).map_err(|err| io::Error::new(ErrorKind::InvalidData, err))
}

/// Refresh the access timestamp after a successful read.
fn touch_accessed(path: &Path) {
    if let Err(err) = filetime::set_file_atime(path, FileTime::now()) {
        debug!(
            path = %path.display(),
            error = %err,
            "Could not update entry access time"
        );
    }
}
