//! palisade: resilience and multi-tier caching toolkit
//!
//! # Features
//!
//! - **Resilience policies**: circuit breaker, retry with exponential
//!   backoff, error-context translation, sequential batch isolation
//! - **Multi-tier caching**: in-process memory tier + remote Redis tier with
//!   read-through backfill and best-effort fan-out writes
//! - **Graceful degradation**: a failing cache tier is never allowed to
//!   break the wrapped operation
//! - **Category-based TTL policy** with deterministic call fingerprinting
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use palisade::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = CachingConfig::with_policy(CachePolicy::MemoryOnly);
//!     let cache = Cache::from_config(&config)?;
//!
//!     let key = KeyBuilder::new("analysis", "scan::project")
//!         .arg("path", &"/srv/app")
//!         .build();
//!
//!     cache.set(&key, &42i32, "analysis").await?;
//!     if let Some(hits) = cache.get::<i32>(&key, "analysis").await? {
//!         println!("cached: {hits}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Resilience policies live in [`palisade_resilience`] and are re-exported
//! here; they compose with caching but do not depend on it.

mod cache;

// Re-export core
pub use palisade_core::*;

// Re-export storage
pub use palisade_storage::{MemoryProvider, RedisProvider, TieredCache};

// Re-export resilience
pub use palisade_resilience::{
    error_context, error_context_async, error_context_async_silenced, error_context_silenced,
    retry, retry_blocking, run_batch, BatchReport, BoxError, CircuitBreaker, CircuitError,
    CircuitState, ContextError, RetryFailure, RetryPolicy,
};

// Export the typed front-end
pub use cache::Cache;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Cache, CacheError, CachePolicy, CacheProvider, CachingConfig, CircuitBreaker,
        JsonSerializer, KeyBuilder, MemoryProvider, Result, RetryPolicy, Serializer, TieredCache,
    };
}
