//! Cache Store Module
//!
//! Single-owner cache engine: the recency queue, the key index and the
//! capacity bound. Each `&mut self` method applies a queue change together
//! with the matching index change, so wrapping the store in one lock makes
//! every operation indivisible for concurrent callers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::entry::expiration_from;
use crate::cache::{CacheEntry, CacheStats, Clock, NodeId, OrderedQueue, SystemClock};
use crate::error::{CacheError, Result};

// == Cache Store ==
/// LRU cache storage with optional per-entry TTL.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Recency order, most recently used first
    queue: OrderedQueue<V>,
    /// Key to queue node; holds exactly the keys linked in `queue`
    index: HashMap<String, NodeId>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    capacity: usize,
    /// Time source for expirations
    clock: Arc<dyn Clock>,
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates a store bounded to `capacity` entries, using wall-clock time.
    ///
    /// # Errors
    /// `CacheError::InvalidCapacity` if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_clock(capacity, Arc::new(SystemClock))
    }

    /// Creates a store that reads time from `clock`.
    pub fn with_clock(capacity: usize, clock: Arc<dyn Clock>) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::InvalidCapacity(capacity));
        }
        Ok(Self {
            queue: OrderedQueue::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            stats: CacheStats::new(),
            capacity,
            clock,
        })
    }

    // == Set ==
    /// Stores a value under `key`, optionally expiring after `ttl`.
    ///
    /// An existing key keeps its entry: the value and expiration are replaced
    /// and the entry moves to the most recently used position, which also
    /// restarts its TTL. If the insert pushes the store over capacity the
    /// least recently used entry is evicted and returned.
    pub fn set(&mut self, key: String, value: V, ttl: Option<Duration>) -> Option<(String, V)> {
        let expires_at = expiration_from(self.clock.now_ms(), ttl);

        match self.index.get(&key) {
            Some(&id) => {
                if let Some(entry) = self.queue.get_mut(id) {
                    entry.overwrite(value, expires_at);
                }
                self.queue.move_to_front(id);
            }
            None => {
                let id = self
                    .queue
                    .push_front(CacheEntry::new(key.clone(), value, expires_at));
                self.index.insert(key, id);
            }
        }

        let mut evicted = None;
        while self.queue.len() > self.capacity {
            let Some(lru) = self.queue.peek_lru() else {
                break;
            };
            if let Some(entry) = self.detach(lru) {
                debug!(key = entry.key(), "evicted least recently used entry");
                self.stats.record_eviction();
                evicted = Some(entry);
            }
        }

        self.stats.set_total_entries(self.queue.len());
        evicted.map(|entry| {
            let key = entry.key().to_string();
            (key, entry.value)
        })
    }

    // == Get ==
    /// Retrieves a value by key, marking it most recently used.
    ///
    /// An expired entry is removed on the spot and reported as absent.
    pub fn get(&mut self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        let Some(&id) = self.index.get(key) else {
            self.stats.record_miss();
            return None;
        };

        let now = self.clock.now_ms();
        if self.queue.get(id).is_some_and(|entry| entry.is_expired(now)) {
            self.detach(id);
            debug!(key, "removed expired entry on access");
            self.stats.record_expiration();
            self.stats.record_miss();
            self.stats.set_total_entries(self.queue.len());
            return None;
        }

        self.queue.move_to_front(id);
        self.stats.record_hit();
        self.queue.get(id).map(|entry| entry.value.clone())
    }

    // == Contains ==
    /// Checks whether `key` is present and unexpired, without touching recency.
    pub fn contains(&self, key: &str) -> bool {
        let now = self.clock.now_ms();
        self.index
            .get(key)
            .and_then(|&id| self.queue.get(id))
            .is_some_and(|entry| !entry.is_expired(now))
    }

    // == Remove ==
    /// Removes an entry by key and returns its value.
    ///
    /// Removing an absent key does nothing.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let id = *self.index.get(key)?;
        let entry = self.detach(id)?;
        self.stats.set_total_entries(self.queue.len());
        Some(entry.value)
    }

    // == Remove Expired ==
    /// Removes every expired entry, walking from most to least recently used.
    ///
    /// The walk is bounded by the length at the start of the pass. Entries
    /// without a TTL are skipped. Returns the number of entries removed.
    pub fn remove_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let mut cursor = self.queue.peek_mru();
        let mut removed = 0;

        for _ in 0..self.queue.len() {
            let Some(id) = cursor else {
                break;
            };
            cursor = self.queue.next_of(id);

            if self.queue.get(id).is_some_and(|entry| entry.is_expired(now)) {
                self.detach(id);
                self.stats.record_expiration();
                removed += 1;
            }
        }

        self.stats.set_total_entries(self.queue.len());
        removed
    }

    // == Inspection ==
    /// Returns keys from most to least recently used.
    pub fn keys(&self) -> Vec<String> {
        self.queue
            .iter()
            .map(|(_, entry)| entry.key().to_string())
            .collect()
    }

    /// Returns remaining TTL for `key`, or None if absent or without TTL.
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let id = *self.index.get(key)?;
        let remaining = self.queue.get(id)?.ttl_remaining_ms(self.clock.now_ms())?;
        Some(Duration::from_millis(remaining))
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.queue.len());
        stats
    }

    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Checks that queue links, length counter and index all agree.
    ///
    /// Holds whenever no operation is mid-flight; a false result is a bug.
    pub fn is_consistent(&self) -> bool {
        self.queue.links_consistent()
            && self.index.len() == self.queue.len()
            && self.queue.len() <= self.capacity
            && self
                .queue
                .iter()
                .all(|(id, entry)| self.index.get(entry.key()) == Some(&id))
    }

    /// Unlinks a node, drops its key from the index and frees the slot.
    fn detach(&mut self, id: NodeId) -> Option<CacheEntry<V>> {
        let entry = self.queue.remove(id)?;
        self.index.remove(entry.key());
        Some(entry)
    }
}

// == Debug Dump ==
/// Renders the recency order, e.g. `Len: 2 -> b=2 -> a=1`.
impl<V: fmt::Debug> fmt::Display for CacheStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Len: {}", self.queue.len())?;
        for (_, entry) in self.queue.iter() {
            write!(f, " -> {}={:?}", entry.key(), entry.value)?;
            if let Some(expires) = entry.expires_at_rfc3339() {
                write!(f, " (expires {})", expires)?;
            }
        }
        Ok(())
    }
}
