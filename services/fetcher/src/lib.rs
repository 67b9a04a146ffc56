//! Fetch coordination for coastal transect datasets.
//!
//! Ties together request construction, HTTP access, the response cache and
//! the ASCII parsers. Callers build one [`FetchCoordinator`] per session and
//! share it; there is no global state.
//!
//! Request, cache and failure counters go through the `metrics` facade. The
//! `fetcher` binary is short-lived and installs no recorder, so they are only
//! collected when the library is embedded in a host that installs one.

pub mod client;
pub mod config;
pub mod coordinator;
pub mod requests;

pub use client::{Fetcher, HttpFetcher};
pub use config::{DimensionConfig, FetcherConfig};
pub use coordinator::{FetchCoordinator, Outcome, ParseFn, Resolved, SlotStatus, Source};
pub use requests::RequestBuilder;
