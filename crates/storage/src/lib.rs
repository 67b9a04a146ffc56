//! Response caching for the coastal transect client.
//!
//! Provides:
//! - [`CacheStore`]: size-capped, corruption-tolerant cache of raw responses
//! - [`CacheBackend`]: persistence seam, with file and in-memory backends
//! - Typed catalog entries guarded against the known size artifact

pub mod backend;
pub mod entry;
pub mod error;
pub mod store;

pub use backend::{CacheBackend, FileBackend, MemoryBackend};
pub use entry::{CacheEntry, CatalogEntry, PutOutcome};
pub use error::{CacheError, CacheResult};
pub use store::{CacheConfig, CacheStats, CacheStore};
