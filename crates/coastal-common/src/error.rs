//! Error types for coastal transect services.

use thiserror::Error;

/// Result type alias using CoastalError.
pub type CoastalResult<T> = Result<T, CoastalError>;

/// Primary error type returned across crate boundaries.
#[derive(Debug, Error)]
pub enum CoastalError {
    // === Parse Errors ===
    #[error("Failed to parse {dataset}: {message}")]
    Parse { dataset: String, message: String },

    // === Network Errors ===
    #[error("Request to {url} failed{}: {message}", status_suffix(.status))]
    Network {
        url: String,
        status: Option<u16>,
        message: String,
    },

    // === Cache Errors ===
    #[error("Corrupted cache entry '{key}': {message}")]
    CacheCorruption { key: String, message: String },

    #[error("Value for '{key}' is {size} bytes, above the cache ceiling of {ceiling} bytes")]
    CacheOverflow {
        key: String,
        size: usize,
        ceiling: usize,
    },

    // === Coordination ===
    #[error("Request superseded by a newer request")]
    Cancelled,

    // === Infrastructure Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status
        .map(|s| format!(" with status {}", s))
        .unwrap_or_default()
}

impl CoastalError {
    /// Build a network error from a URL, optional HTTP status and message.
    pub fn network(url: impl Into<String>, status: Option<u16>, message: impl Into<String>) -> Self {
        CoastalError::Network {
            url: url.into(),
            status,
            message: message.into(),
        }
    }

    /// Build a parse error for the named dataset.
    pub fn parse(dataset: impl Into<String>, message: impl Into<String>) -> Self {
        CoastalError::Parse {
            dataset: dataset.into(),
            message: message.into(),
        }
    }

    /// Whether the error must be shown to the user.
    ///
    /// Network failures are the only class that needs user action (a manual retry).
    pub fn is_user_visible(&self) -> bool {
        matches!(self, CoastalError::Network { .. })
    }

    /// Whether the error is recovered locally and never reported.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            CoastalError::Cancelled | CoastalError::CacheCorruption { .. }
        )
    }
}

// Conversion from common error types
impl From<std::io::Error> for CoastalError {
    fn from(err: std::io::Error) -> Self {
        CoastalError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for CoastalError {
    fn from(err: serde_json::Error) -> Self {
        CoastalError::Internal(format!("JSON error: {}", err))
    }
}
