//! Cache-first resolution of dataset requests.
//!
//! Each dataset kind owns one slot. Starting a foreground request on a slot
//! supersedes whatever was in flight there: the older request's token is
//! cancelled and its result, if it still arrives, is dropped without touching
//! the cache or the slot status.
//!
//! Cache hits are returned immediately and refreshed in a spawned task.
//! Refresh failures are logged and dropped; the cached value stays
//! authoritative.
//!
//! Counters are emitted through the `metrics` facade and are no-ops until the
//! host process installs a recorder.

use std::collections::HashMap;
use std::sync::Arc;

use coastal_common::{CoastalError, CoastalResult, DatasetKind, ResourceRequest};
use metrics::counter;
use opendap_parser::{
    Area, DatasetParser, IdCatalog, ParseResult, ProfileResult, ReferencePoint, TimeSeries,
};
use storage::CacheStore;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::client::Fetcher;
use crate::requests::RequestBuilder;

/// Turns raw response text into a typed dataset result.
pub type ParseFn<T> = fn(&DatasetParser, &str) -> ParseResult<T>;

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cache,
    Network,
}

/// A value that was applied to its slot.
#[derive(Debug)]
pub struct Resolved<T> {
    pub key: String,
    pub value: T,
    pub source: Source,
    /// Set when a fresh response was too large to persist.
    pub overflow: Option<CoastalError>,
    /// Background refresh started for a cache hit.
    pub refresh: Option<JoinHandle<()>>,
}

#[derive(Debug)]
pub enum Outcome<T> {
    Applied(Resolved<T>),
    /// A newer request on the same slot started first; nothing was applied.
    Superseded,
}

impl<T> Outcome<T> {
    pub fn applied(self) -> Option<Resolved<T>> {
        match self {
            Outcome::Applied(resolved) => Some(resolved),
            Outcome::Superseded => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Outcome::Superseded)
    }
}

/// Visible state of one slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotStatus {
    /// A value has been applied and no later foreground request failed.
    pub ready: bool,
    pub in_flight: bool,
    pub last_error: Option<String>,
    /// Cache key of the value currently applied.
    pub applied_key: Option<String>,
    pub generation: u64,
}

struct Slot {
    generation: u64,
    token: CancellationToken,
    status: SlotStatus,
}

impl Slot {
    fn new() -> Self {
        Self {
            generation: 0,
            token: CancellationToken::new(),
            status: SlotStatus::default(),
        }
    }
}

/// Identifies one foreground request on a slot.
struct Ticket {
    kind: DatasetKind,
    generation: u64,
    token: CancellationToken,
}

pub struct FetchCoordinator {
    fetcher: Arc<dyn Fetcher>,
    store: Arc<CacheStore>,
    parser: Arc<DatasetParser>,
    requests: RequestBuilder,
    slots: Mutex<HashMap<DatasetKind, Slot>>,
}

impl FetchCoordinator {
    /// The store is created by the caller and lives as long as the coordinator.
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        store: Arc<CacheStore>,
        parser: DatasetParser,
        requests: RequestBuilder,
    ) -> Self {
        Self {
            fetcher,
            store,
            parser: Arc::new(parser),
            requests,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<CacheStore> {
        &self.store
    }

    pub fn requests(&self) -> &RequestBuilder {
        &self.requests
    }

    pub async fn profile(&self, index: usize) -> CoastalResult<Outcome<ProfileResult>> {
        let request = self.requests.for_profile(index)?;
        self.resolve::<ProfileResult>(&request, DatasetParser::profile).await
    }

    /// The identifier catalog; fresh catalogs are also kept as a typed list.
    pub async fn catalog(&self) -> CoastalResult<Outcome<IdCatalog>> {
        let request = self.requests.for_catalog();
        let outcome = self
            .resolve::<IdCatalog>(&request, DatasetParser::catalog)
            .await?;
        if let Outcome::Applied(resolved) = &outcome {
            if resolved.source == Source::Network {
                if let Err(e) = self.store.put_catalog(&resolved.key, resolved.value.ids()).await {
                    warn!(error = %e, "failed to store identifier list");
                }
            }
        }
        Ok(outcome)
    }

    /// Identifier list from an earlier catalog fetch, without touching the network.
    pub async fn cached_catalog(&self) -> Option<IdCatalog> {
        let key = self.requests.for_catalog().cache_key();
        self.store.get_catalog(&key).await.map(IdCatalog::new)
    }

    pub async fn areas(&self) -> CoastalResult<Outcome<Vec<Area>>> {
        let request = self.requests.for_areas();
        self.resolve::<Vec<Area>>(&request, DatasetParser::areas).await
    }

    pub async fn reference_points(&self, index: usize) -> CoastalResult<Outcome<Vec<ReferencePoint>>> {
        let request = self.requests.for_reference_points(index)?;
        self.resolve::<Vec<ReferencePoint>>(&request, DatasetParser::reference_points)
            .await
    }

    pub async fn water_levels(&self, index: usize) -> CoastalResult<Outcome<TimeSeries>> {
        let request = self.requests.for_water_levels(index)?;
        self.resolve::<TimeSeries>(&request, DatasetParser::water_levels)
            .await
    }

    pub async fn coastline(&self, index: usize) -> CoastalResult<Outcome<TimeSeries>> {
        let request = self.requests.for_coastline(index)?;
        self.resolve::<TimeSeries>(&request, DatasetParser::coastline)
            .await
    }

    /// Resolve `request` on its dataset's slot.
    ///
    /// Returns `Ok(Outcome::Superseded)` when a newer request on the same slot
    /// started before this one could apply its result.
    #[instrument(skip(self, request, parse), fields(dataset = %request.kind, key = %request.cache_key()))]
    pub async fn resolve<T: Send + 'static>(
        &self,
        request: &ResourceRequest,
        parse: ParseFn<T>,
    ) -> CoastalResult<Outcome<T>> {
        let key = request.cache_key();
        let kind = request.kind;
        counter!("coastal_fetch_requests_total", "dataset" => kind.as_str()).increment(1);
        let ticket = self.begin(kind).await;

        if let Some(entry) = self.store.get(&key).await {
            match parse(&self.parser, &entry.raw_text) {
                Ok(value) => {
                    if !self.apply(&ticket, &key).await {
                        return Ok(self.superseded(kind));
                    }
                    counter!("coastal_cache_hits_total", "dataset" => kind.as_str()).increment(1);
                    debug!(age_secs = entry.age_secs(), "serving cached response");
                    let refresh = self.spawn_refresh(request.url(), key.clone(), parse);
                    return Ok(Outcome::Applied(Resolved {
                        key,
                        value,
                        source: Source::Cache,
                        overflow: None,
                        refresh: Some(refresh),
                    }));
                }
                Err(e) => {
                    warn!(error = %e, "cached response no longer parses, refetching");
                    if let Err(e) = self.store.invalidate(&key).await {
                        debug!(error = %e, "could not drop unparseable entry");
                    }
                }
            }
        }
        counter!("coastal_cache_misses_total", "dataset" => kind.as_str()).increment(1);

        let url = request.url();
        let fetched = tokio::select! {
            _ = ticket.token.cancelled() => return Ok(self.superseded(kind)),
            result = self.fetcher.fetch(&url) => result,
        };
        let raw = match fetched {
            Ok(raw) => raw,
            Err(e) => return self.foreground_failure(&ticket, e).await,
        };
        let value = match parse(&self.parser, &raw) {
            Ok(value) => value,
            Err(e) => return self.foreground_failure(&ticket, e.into()).await,
        };
        // Apply before persisting so a superseded request never writes.
        if !self.apply(&ticket, &key).await {
            return Ok(self.superseded(kind));
        }
        let overflow = self.persist(&key, &raw).await;
        info!(bytes = raw.len(), "resolved from network");
        Ok(Outcome::Applied(Resolved {
            key,
            value,
            source: Source::Network,
            overflow,
            refresh: None,
        }))
    }

    /// Drop the cached response for `request`.
    pub async fn invalidate(&self, request: &ResourceRequest) -> CoastalResult<()> {
        let key = request.cache_key();
        self.store
            .invalidate(&key)
            .await
            .map_err(|e| e.into_coastal(&key))?;
        if request.kind == DatasetKind::Catalog {
            self.store
                .invalidate_catalog(&key)
                .await
                .map_err(|e| e.into_coastal(&key))?;
        }
        Ok(())
    }

    pub async fn status(&self, kind: DatasetKind) -> SlotStatus {
        self.slots
            .lock()
            .await
            .get(&kind)
            .map(|slot| slot.status.clone())
            .unwrap_or_default()
    }

    /// Start a foreground request, superseding the slot's previous one.
    async fn begin(&self, kind: DatasetKind) -> Ticket {
        let mut slots = self.slots.lock().await;
        let slot = slots.entry(kind).or_insert_with(Slot::new);
        slot.token.cancel();
        slot.generation += 1;
        slot.token = CancellationToken::new();
        slot.status.in_flight = true;
        slot.status.generation = slot.generation;
        Ticket {
            kind,
            generation: slot.generation,
            token: slot.token.clone(),
        }
    }

    /// Mark the slot ready with `key` if `ticket` is still the latest request.
    async fn apply(&self, ticket: &Ticket, key: &str) -> bool {
        let mut slots = self.slots.lock().await;
        match slots.get_mut(&ticket.kind) {
            Some(slot) if slot.generation == ticket.generation => {
                slot.status.ready = true;
                slot.status.in_flight = false;
                slot.status.last_error = None;
                slot.status.applied_key = Some(key.to_string());
                true
            }
            _ => false,
        }
    }

    async fn foreground_failure<T>(
        &self,
        ticket: &Ticket,
        err: CoastalError,
    ) -> CoastalResult<Outcome<T>> {
        {
            let mut slots = self.slots.lock().await;
            match slots.get_mut(&ticket.kind) {
                Some(slot) if slot.generation == ticket.generation => {
                    slot.status.ready = false;
                    slot.status.in_flight = false;
                    slot.status.last_error = Some(err.to_string());
                }
                _ => return Ok(self.superseded(ticket.kind)),
            }
        }
        counter!("coastal_fetch_failures_total", "dataset" => ticket.kind.as_str()).increment(1);
        error!(error = %err, "foreground request failed");
        Err(err)
    }

    fn superseded<T>(&self, kind: DatasetKind) -> Outcome<T> {
        counter!("coastal_fetch_superseded_total", "dataset" => kind.as_str()).increment(1);
        debug!(dataset = %kind, "request superseded, discarding result");
        Outcome::Superseded
    }

    /// Write through to the cache; returns the overflow warning, if any.
    async fn persist(&self, key: &str, raw: &str) -> Option<CoastalError> {
        match self.store.put(key, raw).await {
            Ok(outcome) => {
                let overflow = outcome.overflow(key);
                if overflow.is_some() {
                    counter!("coastal_cache_overflow_total").increment(1);
                }
                overflow
            }
            Err(e) => {
                warn!(error = %e, "failed to persist response");
                None
            }
        }
    }

    fn spawn_refresh<T: Send + 'static>(
        &self,
        url: String,
        key: String,
        parse: ParseFn<T>,
    ) -> JoinHandle<()> {
        let fetcher = Arc::clone(&self.fetcher);
        let store = Arc::clone(&self.store);
        let parser = Arc::clone(&self.parser);
        tokio::spawn(async move {
            match refresh(fetcher.as_ref(), &store, &parser, &url, &key, parse).await {
                Ok(()) => debug!(key = %key, "background refresh stored"),
                Err(e) => {
                    counter!("coastal_background_refresh_failures_total").increment(1);
                    warn!(key = %key, error = %e, "background refresh failed, keeping cached value");
                }
            }
        })
    }
}

/// Fetch, parse and persist without touching any slot.
async fn refresh<T>(
    fetcher: &dyn Fetcher,
    store: &CacheStore,
    parser: &DatasetParser,
    url: &str,
    key: &str,
    parse: ParseFn<T>,
) -> CoastalResult<()> {
    let raw = fetcher.fetch(url).await?;
    parse(parser, &raw)?;
    let outcome = store.put(key, &raw).await.map_err(|e| e.into_coastal(key))?;
    match outcome.overflow(key) {
        Some(overflow) => Err(overflow),
        None => Ok(()),
    }
}
