//! Fetcher configuration.
//!
//! Values come from, in increasing precedence: built-in defaults, a YAML
//! file, `COASTAL_*` environment variables, then command-line flags (applied
//! by the binary).

use std::path::{Path, PathBuf};
use std::time::Duration;

use coastal_common::{CoastalError, CoastalResult};
use opendap_parser::ParserConfig;
use serde::{Deserialize, Serialize};
use storage::CacheConfig;
use tracing::{debug, warn};

/// Axis lengths of the transect grid, used to build slice expressions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionConfig {
    pub time_len: usize,
    pub cross_shore_len: usize,
    pub alongshore_len: usize,
}

impl Default for DimensionConfig {
    fn default() -> Self {
        Self {
            time_len: 58,
            cross_shore_len: 2463,
            alongshore_len: 2465,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Dataset URL without the `.ascii` suffix.
    pub endpoint: String,
    pub cache_dir: PathBuf,
    pub cache_ceiling_bytes: usize,
    /// Memory tier capacity; zero disables the tier.
    pub memory_entries: usize,
    pub request_timeout_secs: u64,
    pub parser: ParserConfig,
    pub dimensions: DimensionConfig,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://opendap.deltares.nl/thredds/dodsC/opendap/rijkswaterstaat/jarkus/profiles/transect.nc".to_string(),
            cache_dir: PathBuf::from(".coastal-cache"),
            cache_ceiling_bytes: 4 * 1024 * 1024,
            memory_entries: 64,
            request_timeout_secs: 60,
            parser: ParserConfig::default(),
            dimensions: DimensionConfig::default(),
        }
    }
}

impl FetcherConfig {
    /// Load from a YAML file; fields missing from the file keep their defaults.
    pub fn from_file(path: &Path) -> CoastalResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CoastalError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_yaml::from_str(&text)
            .map_err(|e| CoastalError::Config(format!("invalid {}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "loaded fetcher configuration");
        Ok(config)
    }

    /// Defaults or the given file, then environment overrides, then validation.
    pub fn load(path: Option<&Path>) -> CoastalResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate().map_err(CoastalError::Config)?;
        Ok(config)
    }

    /// Apply `COASTAL_*` environment overrides. Unparseable values are ignored.
    pub fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("COASTAL_ENDPOINT") {
            self.endpoint = val;
        }
        if let Ok(val) = std::env::var("COASTAL_CACHE_DIR") {
            self.cache_dir = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("COASTAL_CACHE_CEILING_BYTES") {
            match val.parse() {
                Ok(n) => self.cache_ceiling_bytes = n,
                Err(_) => warn!(value = %val, "ignoring invalid COASTAL_CACHE_CEILING_BYTES"),
            }
        }
        if let Ok(val) = std::env::var("COASTAL_REQUEST_TIMEOUT_SECS") {
            match val.parse() {
                Ok(n) => self.request_timeout_secs = n,
                Err(_) => warn!(value = %val, "ignoring invalid COASTAL_REQUEST_TIMEOUT_SECS"),
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.trim().is_empty() {
            return Err("endpoint must not be empty".to_string());
        }
        if self.cache_ceiling_bytes == 0 {
            return Err("cache_ceiling_bytes must be > 0".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be > 0".to_string());
        }
        let dims = &self.dimensions;
        if dims.time_len == 0 || dims.cross_shore_len == 0 || dims.alongshore_len == 0 {
            return Err("dimension lengths must be > 0".to_string());
        }
        self.parser.validate()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            ceiling_bytes: self.cache_ceiling_bytes,
            memory_entries: self.memory_entries,
            catalog_size: self.parser.catalog_size,
        }
    }
}
