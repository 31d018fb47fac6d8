//! LRU TTL Cache - demo driver
//!
//! Runs a synthetic workload against the cache and reports its statistics
//! until interrupted.

use std::time::Duration;

use anyhow::Context;
use chrono::TimeDelta;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lru_ttl_cache::{Config, LruCache};

/// Keys written per workload round
const BATCH_SIZE: u64 = 1000;

/// Main entry point for the cache demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache and start its background sweeper
/// 4. Write a batch of keys every second, half of them short-lived
/// 5. Log statistics as JSON after each round
/// 6. Stop on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lru_ttl_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting LRU TTL cache demo");

    let config = Config::from_env().context("loading configuration")?;
    info!(
        "Configuration loaded: max_memory={} bytes, gc_period={:?}, sweep_interval={:?}",
        config.max_memory, config.gc_period, config.sweep_interval
    );

    let cache: LruCache<u64> = LruCache::start(&config).context("starting cache")?;
    info!("Cache initialized with background sweeper");

    let workload = run_workload(&cache);
    tokio::select! {
        result = workload => result?,
        _ = shutdown_signal() => {}
    }

    let stats = serde_json::to_string_pretty(&cache.stats())?;
    info!("Final statistics:\n{}", stats);
    drop(cache);
    info!("Shutdown complete");
    Ok(())
}

/// Writes and reads batches of keys forever.
async fn run_workload(cache: &LruCache<u64>) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    let mut next_key: u64 = 0;

    loop {
        ticker.tick().await;

        for _ in 0..BATCH_SIZE {
            let ttl = if next_key % 2 == 0 {
                TimeDelta::seconds(2)
            } else {
                TimeDelta::zero()
            };
            cache.set(format!("key:{}", next_key), next_key, ttl)?;
            next_key += 1;
        }
        for offset in (1..=BATCH_SIZE).step_by(10) {
            cache.get(&format!("key:{}", next_key.saturating_sub(offset)));
        }

        let stats = serde_json::to_string(&cache.stats())?;
        info!("Round complete: {}", stats);
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
