//! Persisted entry layouts.

use chrono::{DateTime, Utc};
use coastal_common::CoastalError;
use serde::{Deserialize, Serialize};

/// One cached response: the raw text exactly as fetched.
///
/// Parsed structures are never persisted; readers re-run the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub timestamp: DateTime<Utc>,
    pub raw_text: String,
}

impl CacheEntry {
    pub fn new(key: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            timestamp: Utc::now(),
            raw_text: raw_text.into(),
        }
    }

    /// Seconds since the entry was written.
    pub fn age_secs(&self) -> i64 {
        (Utc::now() - self.timestamp).num_seconds()
    }
}

/// Identifier list kept alongside the raw catalog response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub timestamp: DateTime<Utc>,
    pub ids: Vec<i64>,
}

/// Result of a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Stored { size: usize },
    /// Serialized value exceeded the ceiling; nothing was written.
    Skipped { size: usize, ceiling: usize },
}

impl PutOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, PutOutcome::Skipped { .. })
    }

    /// Overflow warning for the caller, if the write was skipped.
    pub fn overflow(&self, key: &str) -> Option<CoastalError> {
        match *self {
            PutOutcome::Skipped { size, ceiling } => Some(CoastalError::CacheOverflow {
                key: key.to_string(),
                size,
                ceiling,
            }),
            PutOutcome::Stored { .. } => None,
        }
    }
}
