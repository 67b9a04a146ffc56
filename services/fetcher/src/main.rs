//! Coastal transect fetcher.
//!
//! Resolves one dataset per invocation through the response cache and prints
//! it as JSON on stdout:
//! - Cache hits print immediately, then refresh the cache before exiting
//! - Cache misses fetch, parse and persist
//! - Logs go to stderr

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use coastal_common::DatasetKind;
use fetcher::{FetchCoordinator, FetcherConfig, HttpFetcher, Outcome, RequestBuilder};
use opendap_parser::DatasetParser;
use serde::Serialize;
use storage::{CacheStore, FileBackend};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "fetcher")]
#[command(about = "Fetch and parse coastal transect datasets")]
struct Args {
    /// YAML configuration file
    #[arg(long, env = "COASTAL_CONFIG")]
    config: Option<PathBuf>,

    /// Dataset endpoint (overrides config and environment)
    #[arg(long)]
    endpoint: Option<String>,

    /// Cache directory (overrides config and environment)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Log level, used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Print the cached value without waiting for the background refresh
    #[arg(long)]
    no_refresh: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Altitude profile of the transect at a catalog position
    Profile { index: usize },
    /// Transect identifier catalog
    Catalog {
        /// Print the stored identifier list without fetching
        #[arg(long)]
        cached: bool,
    },
    /// Area codes and names
    Areas,
    /// Reference point of the transect at a catalog position
    ReferencePoints { index: usize },
    /// Mean high and low water series
    WaterLevels { index: usize },
    /// Momentary coastline series
    Coastline { index: usize },
    /// Profile as a row-labeled table
    Export { index: usize },
    /// Drop cached responses for a catalog position
    Invalidate {
        index: usize,
        /// Also drop the catalog and area responses
        #[arg(long)]
        all: bool,
    },
}

#[derive(Serialize)]
struct Envelope<'a, T> {
    dataset: DatasetKind,
    key: &'a str,
    source: &'static str,
    value: &'a T,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing on stderr; stdout carries the JSON result
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if args.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    let mut config =
        FetcherConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(endpoint) = &args.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(dir) = &args.cache_dir {
        config.cache_dir = dir.clone();
    }
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid configuration")?;

    info!(endpoint = %config.endpoint, cache_dir = %config.cache_dir.display(), "Starting fetcher");

    let backend = FileBackend::open(&config.cache_dir)
        .await
        .with_context(|| format!("Failed to open cache at {}", config.cache_dir.display()))?;
    let store = Arc::new(CacheStore::new(Arc::new(backend), config.cache_config()));
    let http = HttpFetcher::new(config.request_timeout())?;
    let coordinator = FetchCoordinator::new(
        Arc::new(http),
        store.clone(),
        DatasetParser::new(config.parser.clone()),
        RequestBuilder::from_config(&config),
    );

    let refresh = match args.command {
        Command::Profile { index } => emit(DatasetKind::Profile, coordinator.profile(index).await?)?,
        Command::Catalog { cached: true } => {
            let catalog = coordinator
                .cached_catalog()
                .await
                .context("No stored catalog; run `fetcher catalog` first")?;
            println!("{}", serde_json::to_string_pretty(&catalog)?);
            None
        }
        Command::Catalog { cached: false } => emit(DatasetKind::Catalog, coordinator.catalog().await?)?,
        Command::Areas => emit(DatasetKind::Areas, coordinator.areas().await?)?,
        Command::ReferencePoints { index } => emit(
            DatasetKind::ReferencePoints,
            coordinator.reference_points(index).await?,
        )?,
        Command::WaterLevels { index } => {
            emit(DatasetKind::WaterLevels, coordinator.water_levels(index).await?)?
        }
        Command::Coastline { index } => {
            emit(DatasetKind::Coastline, coordinator.coastline(index).await?)?
        }
        Command::Export { index } => {
            let Some(resolved) = coordinator.profile(index).await?.applied() else {
                bail!("profile request was superseded");
            };
            println!("{}", serde_json::to_string_pretty(&resolved.value.to_table())?);
            resolved.refresh
        }
        Command::Invalidate { index, all } => {
            let requests = coordinator.requests();
            let mut targets = vec![
                requests.for_profile(index)?,
                requests.for_reference_points(index)?,
                requests.for_water_levels(index)?,
                requests.for_coastline(index)?,
            ];
            if all {
                targets.push(requests.for_catalog());
                targets.push(requests.for_areas());
            }
            for request in &targets {
                coordinator.invalidate(request).await?;
            }
            info!(count = targets.len(), "Invalidated cache entries");
            None
        }
    };

    if let Some(handle) = refresh {
        if args.no_refresh {
            handle.abort();
        } else if let Err(e) = handle.await {
            warn!(error = %e, "Background refresh task did not complete");
        }
    }

    let stats = store.stats().await;
    info!(
        hits = stats.hits,
        misses = stats.misses,
        stores = stats.stores,
        skips = stats.skips,
        corrupt_reads = stats.corrupt_reads,
        "Cache statistics"
    );

    Ok(())
}

/// Print an applied value; returns its background refresh, if one was started.
fn emit<T: Serialize>(dataset: DatasetKind, outcome: Outcome<T>) -> Result<Option<JoinHandle<()>>> {
    let Some(resolved) = outcome.applied() else {
        bail!("{} request was superseded", dataset);
    };
    if let Some(overflow) = &resolved.overflow {
        warn!(error = %overflow, "Response not cached");
    }
    let envelope = Envelope {
        dataset,
        key: &resolved.key,
        source: match resolved.source {
            fetcher::Source::Cache => "cache",
            fetcher::Source::Network => "network",
        },
        value: &resolved.value,
    };
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(resolved.refresh)
}
