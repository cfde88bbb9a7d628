//! LRU TTL Cache - demo driver
//!
//! Fills a small cache with a fixed sequence of keys and logs the recency
//! order after every step.

use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lru_ttl_cache::{Cache, CacheConfig};

/// Capacity used by the scripted run, overriding the configured one.
const DEMO_CAPACITY: usize = 5;

/// Keys set in order; "3" is set twice to show a recency refresh.
const DEMO_SEQUENCE: [u32; 7] = [1, 2, 3, 4, 3, 5, 8];

/// Main entry point for the demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load the sweep interval from environment variables
/// 3. Create the cache and its background sweeper
/// 4. Replay the scripted sets, dumping the cache after each
/// 5. Log final statistics and stop the sweeper
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

    let config = CacheConfig {
        capacity: DEMO_CAPACITY,
        ..CacheConfig::from_env()
    };
    info!(
        "Configuration loaded: capacity={}, sweep_interval={}ms",
        config.capacity, config.sweep_interval_ms
    );

    let cache: Cache<u32> = Cache::from_config(&config).context("failed to create cache")?;

    for n in DEMO_SEQUENCE {
        if let Some((key, _)) = cache.set(n.to_string(), n) {
            info!("evicted {}", key);
        }
        info!("{}", cache.dump());
    }

    // Give the sweeper a chance to run once before shutting down
    tokio::time::sleep(Duration::from_millis(config.sweep_interval_ms.min(1000))).await;

    let stats = serde_json::to_string(&cache.stats()).context("failed to serialize stats")?;
    info!("stats: {}", stats);

    cache.shutdown();
    info!("Demo complete");
    Ok(())
}
