//! Errors raised inside cache backends.
//!
//! These never leave [`crate::CacheStore`] as failures of a read: a broken
//! entry is reported as absent and logged.

use coastal_common::CoastalError;
use thiserror::Error;

pub type CacheResult<T> = Result<T, CacheError>;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("entry stored under '{stored}' was read for '{requested}'")]
    KeyMismatch { requested: String, stored: String },
}

impl CacheError {
    pub fn into_coastal(self, key: &str) -> CoastalError {
        CoastalError::CacheCorruption {
            key: key.to_string(),
            message: self.to_string(),
        }
    }
}
