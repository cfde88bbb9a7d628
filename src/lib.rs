//! LRU TTL Cache - a concurrency-safe in-process cache
//!
//! Bounded by entry count with least-recently-used eviction, optional
//! per-entry TTL, and a background sweeper that removes expired entries.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Cache, CacheStats, CacheStore, Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
