//! HTTP access to the dataset server.

use std::time::Duration;

use async_trait::async_trait;
use coastal_common::{CoastalError, CoastalResult};
use reqwest::Client;
use tracing::{debug, instrument};

/// Retrieves raw response text for a URL.
///
/// Implementations must map non-success responses and transport failures to
/// [`CoastalError::Network`].
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> CoastalResult<String>;
}

/// reqwest-backed fetcher.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> CoastalResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| CoastalError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> CoastalResult<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CoastalError::network(url, e.status().map(|s| s.as_u16()), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoastalError::network(
                url,
                Some(status.as_u16()),
                status.canonical_reason().unwrap_or("unexpected status"),
            ));
        }

        let text = response
            .text()
            .await
            .map_err(|e| CoastalError::network(url, Some(status.as_u16()), e.to_string()))?;
        debug!(bytes = text.len(), "fetched response");
        Ok(text)
    }
}
