//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and LRU eviction.

mod clock;
mod concurrent;
mod entry;
mod queue;
mod stats;
mod store;


// Re-export public types
pub use clock::{current_timestamp_ms, duration_to_ms_ceil, Clock, ManualClock, SystemClock};
pub use concurrent::Cache;
pub use entry::CacheEntry;
pub use queue::{NodeId, OrderedQueue};
pub use stats::CacheStats;
pub use store::CacheStore;
