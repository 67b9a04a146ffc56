//! Layered response cache.
//!
//! A small in-memory LRU tier sits in front of a persistent [`CacheBackend`].
//! Reads check the memory tier first and promote persistent hits into it.
//! Writes go to both tiers, unless the serialized entry exceeds the size
//! ceiling, in which case neither tier is touched.
//!
//! The store never fails a read: missing, unreadable and undecodable entries
//! all come back as `None`.

use lru::LruCache;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::backend::CacheBackend;
use crate::entry::{CacheEntry, CatalogEntry, PutOutcome};
use crate::error::{CacheError, CacheResult};

/// Key prefix for typed catalog entries.
const CATALOG_PREFIX: &str = "catalog-ids:";

/// Store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Largest serialized entry that will be persisted.
    pub ceiling_bytes: usize,
    /// Capacity of the memory tier; zero disables it.
    pub memory_entries: usize,
    /// Declared catalog size, used by the catalog read guard.
    pub catalog_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ceiling_bytes: 4 * 1024 * 1024,
            memory_entries: 64,
            catalog_size: 2465,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub memory_hits: u64,
    pub misses: u64,
    pub stores: u64,
    pub skips: u64,
    pub corrupt_reads: u64,
    pub invalidations: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Response cache shared by the fetch coordinator and its background refreshes.
pub struct CacheStore {
    backend: Arc<dyn CacheBackend>,
    memory: Option<Mutex<LruCache<String, CacheEntry>>>,
    config: CacheConfig,
    stats: Mutex<CacheStats>,
}

impl CacheStore {
    pub fn new(backend: Arc<dyn CacheBackend>, config: CacheConfig) -> Self {
        let memory = NonZeroUsize::new(config.memory_entries).map(|n| Mutex::new(LruCache::new(n)));
        Self {
            backend,
            memory,
            config,
            stats: Mutex::new(CacheStats::default()),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Persist `raw_text` under `key` if it fits under the ceiling.
    ///
    /// An oversized value is not an error: the write is skipped and the
    /// outcome says so. Backend failures are returned for the caller to log.
    pub async fn put(&self, key: &str, raw_text: &str) -> CacheResult<PutOutcome> {
        let entry = CacheEntry::new(key, raw_text);
        let bytes = serde_json::to_vec(&entry)?;
        let outcome = self.write_bytes(key, bytes).await?;
        if let (PutOutcome::Stored { .. }, Some(memory)) = (outcome, &self.memory) {
            memory.lock().await.put(key.to_string(), entry);
        }
        Ok(outcome)
    }

    /// Cached entry for `key`, or `None` if absent or unreadable.
    pub async fn get(&self, key: &str) -> Option<CacheEntry> {
        if let Some(memory) = &self.memory {
            if let Some(entry) = memory.lock().await.get(key) {
                let mut stats = self.stats.lock().await;
                stats.hits += 1;
                stats.memory_hits += 1;
                return Some(entry.clone());
            }
        }

        let entry: Option<CacheEntry> = self.read_decoded(key).await;
        let entry = match entry {
            Some(entry) if entry.key != key => {
                let err = CacheError::KeyMismatch {
                    requested: key.to_string(),
                    stored: entry.key,
                };
                self.discard_corrupt(key, &err).await;
                None
            }
            other => other,
        };

        let mut stats = self.stats.lock().await;
        match entry {
            Some(entry) => {
                stats.hits += 1;
                drop(stats);
                if let Some(memory) = &self.memory {
                    memory.lock().await.put(key.to_string(), entry.clone());
                }
                Some(entry)
            }
            None => {
                stats.misses += 1;
                None
            }
        }
    }

    /// Remove `key` from both tiers.
    pub async fn invalidate(&self, key: &str) -> CacheResult<()> {
        if let Some(memory) = &self.memory {
            memory.lock().await.pop(key);
        }
        self.backend.remove(key).await?;
        self.stats.lock().await.invalidations += 1;
        debug!(key, "invalidated cache entry");
        Ok(())
    }

    /// Persist a parsed identifier list next to its raw response.
    pub async fn put_catalog(&self, key: &str, ids: &[i64]) -> CacheResult<PutOutcome> {
        let entry = CatalogEntry {
            timestamp: chrono::Utc::now(),
            ids: ids.to_vec(),
        };
        let bytes = serde_json::to_vec(&entry)?;
        self.write_bytes(&catalog_key(key), bytes).await
    }

    /// Stored identifier list, with a leading declared-size artifact removed.
    pub async fn get_catalog(&self, key: &str) -> Option<Vec<i64>> {
        let mut entry: CatalogEntry = self.read_decoded(&catalog_key(key)).await?;
        if entry.ids.first() == Some(&(self.config.catalog_size as i64)) {
            debug!(key, "dropping leading catalog size from stored catalog");
            entry.ids.remove(0);
        }
        Some(entry.ids)
    }

    /// Remove a stored identifier list.
    pub async fn invalidate_catalog(&self, key: &str) -> CacheResult<()> {
        self.backend.remove(&catalog_key(key)).await?;
        self.stats.lock().await.invalidations += 1;
        Ok(())
    }

    pub async fn stats(&self) -> CacheStats {
        self.stats.lock().await.clone()
    }

    async fn write_bytes(&self, key: &str, bytes: Vec<u8>) -> CacheResult<PutOutcome> {
        let size = bytes.len();
        let ceiling = self.config.ceiling_bytes;
        if size > ceiling {
            warn!(key, size, ceiling, "value exceeds cache ceiling, not persisted");
            self.stats.lock().await.skips += 1;
            return Ok(PutOutcome::Skipped { size, ceiling });
        }

        self.backend.write(key, bytes).await?;
        self.stats.lock().await.stores += 1;
        debug!(key, size, backend = self.backend.name(), "stored cache entry");
        Ok(PutOutcome::Stored { size })
    }

    /// Read and decode `key` from the persistent tier.
    ///
    /// Undecodable entries are removed so the next write starts clean.
    async fn read_decoded<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = match self.backend.read(key).await {
            Ok(bytes) => bytes?,
            Err(e) => {
                warn!(key, error = %e, "cache read failed, treating as absent");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                self.discard_corrupt(key, &CacheError::from(e)).await;
                None
            }
        }
    }

    async fn discard_corrupt(&self, key: &str, err: &CacheError) {
        warn!(key, error = %err, "discarding corrupted cache entry");
        self.stats.lock().await.corrupt_reads += 1;
        if let Err(e) = self.backend.remove(key).await {
            debug!(key, error = %e, "could not remove corrupted entry");
        }
    }
}

fn catalog_key(key: &str) -> String {
    format!("{}{}", CATALOG_PREFIX, key)
}
