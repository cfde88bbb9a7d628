//! Shared Cache Module
//!
//! Thread-safe cache handle: one lock around the store plus the background
//! expiration sweeper bound to the handle's lifetime.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tracing::info;

use crate::cache::{CacheStats, CacheStore, Clock, SystemClock};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::Sweeper;

// == Cache ==
/// Concurrency-safe LRU cache with TTL expiration.
///
/// All operations go through a single mutex guarding the recency queue and
/// the key index together, so no caller can observe one updated without the
/// other, and `len() <= capacity()` holds after every `set`.
///
/// Creating a cache spawns an expiration sweeper on the current tokio
/// runtime. Dropping the cache (or calling [`Cache::shutdown`]) stops it.
/// Share a cache between tasks or threads with `Arc<Cache<V>>`.
pub struct Cache<V> {
    store: Arc<Mutex<CacheStore<V>>>,
    sweeper: Sweeper,
}

impl<V: Send + 'static> Cache<V> {
    // == Constructors ==
    /// Creates a cache holding at most `capacity` entries, sweeping expired
    /// entries every `sweep_interval`.
    ///
    /// # Errors
    /// - `InvalidCapacity` if `capacity` is zero
    /// - `InvalidSweepInterval` if `sweep_interval` is zero
    /// - `NoRuntime` if called outside a tokio runtime
    pub fn new(capacity: usize, sweep_interval: Duration) -> Result<Self> {
        Self::from_config(&CacheConfig::new(capacity, sweep_interval))
    }

    /// Creates a cache from a loaded configuration.
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a cache that reads time from `clock`.
    pub fn with_clock(config: &CacheConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| CacheError::NoRuntime)?;

        let store = Arc::new(Mutex::new(CacheStore::with_clock(config.capacity, clock)?));
        let sweeper = Sweeper::start(&runtime, store.clone(), config.sweep_interval());
        info!(capacity = config.capacity, "cache created");

        Ok(Self { store, sweeper })
    }
}

impl<V> Cache<V> {
    // == Set ==
    /// Stores a value with no expiration.
    ///
    /// Returns the entry evicted to make room, if any.
    pub fn set(&self, key: impl Into<String>, value: V) -> Option<(String, V)> {
        self.store.lock().set(key.into(), value, None)
    }

    /// Stores a value that expires `ttl` from now.
    ///
    /// Setting an existing key replaces its value, restarts its TTL and marks
    /// it most recently used.
    pub fn set_with_ttl(
        &self,
        key: impl Into<String>,
        value: V,
        ttl: Duration,
    ) -> Option<(String, V)> {
        self.store.lock().set(key.into(), value, Some(ttl))
    }

    // == Get ==
    /// Returns a clone of the value for `key` if present and unexpired.
    pub fn get(&self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        self.store.lock().get(key)
    }

    /// Checks for a live entry without changing its recency.
    pub fn contains(&self, key: &str) -> bool {
        self.store.lock().contains(key)
    }

    // == Remove ==
    /// Removes `key`, returning its value. Absent keys are ignored.
    pub fn remove(&self, key: &str) -> Option<V> {
        self.store.lock().remove(key)
    }

    /// Runs one expiration pass now. Returns the number of entries removed.
    pub fn remove_expired(&self) -> usize {
        self.store.lock().remove_expired()
    }

    // == Len ==
    /// Number of entries currently held, expired or not.
    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    /// Maximum number of entries the cache will hold.
    pub fn capacity(&self) -> usize {
        self.store.lock().capacity()
    }

    // == Inspection ==
    /// Keys from most to least recently used.
    pub fn keys(&self) -> Vec<String> {
        self.store.lock().keys()
    }

    /// Time left before `key` expires.
    ///
    /// Returns `None` for an absent key or one without a TTL, and zero for an
    /// expired entry not yet removed. Does not change recency.
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        self.store.lock().ttl_remaining(key)
    }

    // == Stats ==
    /// Snapshot of hit, miss, eviction and expiration counters.
    pub fn stats(&self) -> CacheStats {
        self.store.lock().stats()
    }

    /// See [`CacheStore::is_consistent`].
    pub fn is_consistent(&self) -> bool {
        self.store.lock().is_consistent()
    }

    /// Renders the current recency order for debugging.
    pub fn dump(&self) -> String
    where
        V: fmt::Debug,
    {
        self.store.lock().to_string()
    }

    // == Lifecycle ==
    /// Stops the background sweeper. Explicit `remove_expired` calls and
    /// lazy expiration on `get` keep working.
    pub fn shutdown(&self) {
        self.sweeper.stop();
    }

    /// Returns true while the background sweeper task is alive.
    pub fn sweeper_running(&self) -> bool {
        !self.sweeper.is_finished()
    }
}

impl<V> fmt::Debug for Cache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let store = self.store.lock();
        f.debug_struct("Cache")
            .field("len", &store.len())
            .field("capacity", &store.capacity())
            .finish()
    }
}
