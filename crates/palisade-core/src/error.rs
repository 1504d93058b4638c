//! Error types for cache operations

use thiserror::Error;

/// Main error type for all cache operations
///
/// These errors never cross the `CacheProvider` boundary: providers absorb
/// them internally and degrade to an absent/no-op outcome. They surface only
/// through fallible setup paths (configuration, serialization at the typed
/// facade).
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Serialization failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization failed
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Backend connection failed
    #[error("connection error: {0}")]
    Connection(String),

    /// Backend operation failed
    #[error("backend error: {0}")]
    Backend(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),

    /// Operation timed out
    #[error("operation timed out")]
    Timeout,
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;
