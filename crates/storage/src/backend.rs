//! Byte-level persistence behind [`crate::CacheStore`].

use async_trait::async_trait;
use lru::LruCache;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::CacheResult;

/// Stores serialized entries by key.
///
/// Backends know nothing about entry layout; decoding and corruption
/// handling live in the store.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Short name for log fields.
    fn name(&self) -> &'static str;

    async fn read(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    async fn write(&self, key: &str, bytes: Vec<u8>) -> CacheResult<()>;

    /// Remove `key`; removing an absent key is not an error.
    async fn remove(&self, key: &str) -> CacheResult<()>;
}

/// One JSON file per key under a cache directory.
///
/// File names are the SHA-256 of the key, so arbitrary URLs map to safe,
/// fixed-length names that stay stable across runs.
pub struct FileBackend {
    dir: PathBuf,
    /// Distinguishes temp files of overlapping writes.
    write_seq: AtomicU64,
}

impl FileBackend {
    /// Open (and create if needed) a cache directory.
    pub async fn open(dir: impl Into<PathBuf>) -> CacheResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        debug!(dir = %dir.display(), "opened file cache");
        Ok(Self {
            dir,
            write_seq: AtomicU64::new(0),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that holds `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.dir.join(format!("{:x}.json", digest))
    }
}

#[async_trait]
impl CacheBackend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn read(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, key: &str, bytes: Vec<u8>) -> CacheResult<()> {
        // Write then rename so a crash never leaves a half-written entry.
        // Each write owns its temp file; concurrent writers to one key race
        // only on the rename, and the last rename wins.
        let path = self.path_for(key);
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        let tmp = path.with_extension(format!("json.{}.{}.tmp", std::process::id(), seq));
        tokio::fs::write(&tmp, bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> CacheResult<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Bounded in-process backend; least recently used entries are evicted.
pub struct MemoryBackend {
    entries: Mutex<LruCache<String, Vec<u8>>>,
}

impl MemoryBackend {
    /// Capacity is clamped to at least one entry.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn read(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn write(&self, key: &str, bytes: Vec<u8>) -> CacheResult<()> {
        self.entries.lock().await.put(key.to_string(), bytes);
        Ok(())
    }

    async fn remove(&self, key: &str) -> CacheResult<()> {
        self.entries.lock().await.pop(key);
        Ok(())
    }
}
