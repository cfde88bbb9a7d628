//! Cache Entry Module
//!
//! Defines the record stored for each key, with optional expiration.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::cache::clock::duration_to_ms_ceil;

// == Cache Entry ==
/// A single cached key/value pair and its expiration metadata.
///
/// The key never changes once the entry is created. Value and expiration are
/// overwritten in place when the key is set again.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The key this entry is indexed under
    key: String,
    /// The stored value
    pub value: V,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry.
    ///
    /// # Arguments
    /// * `key` - The key the entry is stored under
    /// * `value` - The value to store
    /// * `expires_at` - Absolute expiration in Unix milliseconds, if any
    pub fn new(key: String, value: V, expires_at: Option<u64>) -> Self {
        Self {
            key,
            value,
            expires_at,
        }
    }

    /// Returns the entry's key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Replaces value and expiration, keeping the key.
    pub fn overwrite(&mut self, value: V, expires_at: Option<u64>) -> V {
        self.expires_at = expires_at;
        std::mem::replace(&mut self.value, value)
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// An entry is expired once the current time is greater than or equal to
    /// its expiration time. Entries without an expiration never expire.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        match self.expires_at {
            Some(expires) => now_ms >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(0)` if the entry has expired
    /// - `Some(remaining_ms)` if the entry has TTL and hasn't expired
    /// - `None` if the entry never expires
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.expires_at.map(|expires| expires.saturating_sub(now_ms))
    }

    /// Renders the expiration instant as RFC 3339, for debug output.
    pub fn expires_at_rfc3339(&self) -> Option<String> {
        self.expires_at
            .and_then(|ms| i64::try_from(ms).ok())
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

/// Computes the absolute expiration for a TTL starting at `now_ms`.
///
/// Partial milliseconds round up, so any positive TTL outlives `now_ms`.
/// Overflow saturates to the far future.
pub fn expiration_from(now_ms: u64, ttl: Option<Duration>) -> Option<u64> {
    ttl.map(|ttl| now_ms.saturating_add(duration_to_ms_ceil(ttl)))
}
