//! Error types for the cache
//!
//! Provides unified error handling using thiserror. Only construction can
//! fail; a missing key is reported through `Option`, never as an error.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Capacity must be at least one entry
    #[error("Invalid capacity: {0} (must be at least 1)")]
    InvalidCapacity(usize),

    /// Sweep interval must be non-zero
    #[error("Invalid sweep interval: must be greater than zero")]
    InvalidSweepInterval,

    /// The expiration sweeper needs a tokio runtime to be spawned on
    #[error("No tokio runtime available to run the expiration sweeper")]
    NoRuntime,
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CacheError::InvalidCapacity(0).to_string(),
            "Invalid capacity: 0 (must be at least 1)"
        );
        assert!(CacheError::NoRuntime.to_string().contains("tokio runtime"));
    }
}
