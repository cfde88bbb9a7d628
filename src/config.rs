//! Configuration Module
//!
//! Handles loading and validating cache configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::duration_to_ms_ceil;
use crate::error::{CacheError, Result};

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
    /// Interval in milliseconds between expiration sweeps
    pub sweep_interval_ms: u64,
}

impl CacheConfig {
    /// Creates a config with explicit values.
    ///
    /// The interval is kept in whole milliseconds, rounded up, so any
    /// positive duration stays valid.
    pub fn new(capacity: usize, sweep_interval: Duration) -> Self {
        Self {
            capacity,
            sweep_interval_ms: duration_to_ms_ceil(sweep_interval),
        }
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 1000)
    /// - `SWEEP_INTERVAL_MS` - Sweep frequency in milliseconds (default: 1000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity: env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.capacity),
            sweep_interval_ms: env::var("SWEEP_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.sweep_interval_ms),
        }
    }

    /// Returns the sweep interval as a Duration.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    /// Rejects configurations that would produce an unusable cache.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidCapacity(self.capacity));
        }
        if self.sweep_interval_ms == 0 {
            return Err(CacheError::InvalidSweepInterval);
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            sweep_interval_ms: 1000,
        }
    }
}
