//! Background Tasks Module
//!
//! Contains background tasks that run alongside the cache.
//!
//! # Tasks
//! - Expiration sweep: removes expired cache entries at a configured interval

mod sweeper;

pub use sweeper::{spawn_sweeper, Sweeper};
