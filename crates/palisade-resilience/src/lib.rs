//! palisade-resilience: failure-tolerance building blocks
//!
//! Independent, composable policies for protecting a unit of work:
//!
//! - [`CircuitBreaker`]: fail fast once a dependency keeps failing, probe
//!   recovery after a cooldown
//! - [`retry`] / [`retry_blocking`]: bounded attempts with exponential
//!   backoff
//! - [`error_context`]: translate arbitrary errors into an operation-tagged
//!   error, preserving the original as source
//! - [`run_batch`]: sequential per-item isolation for bulk operations
//!
//! None of these decide *what* to retry or protect; that policy belongs to
//! callers. Policies compose outer-to-inner, e.g. a breaker around a retried
//! operation:
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use palisade_resilience::{CircuitBreaker, RetryPolicy, retry};
//!
//! # async fn demo() {
//! let breaker = CircuitBreaker::new("search-index", 5, Duration::from_secs(30), 2);
//! let policy = RetryPolicy::new(3, Duration::from_millis(200), 2.0);
//!
//! let result = breaker
//!     .call(|| retry(&policy, "index_lookup", |_: &std::io::Error| true, || async {
//!         Ok::<_, std::io::Error>("hit")
//!     }))
//!     .await;
//! # let _ = result;
//! # }
//! ```

mod batch;
mod circuit_breaker;
mod context;
mod retry;

pub use batch::{run_batch, BatchReport};
pub use circuit_breaker::{CircuitBreaker, CircuitError, CircuitState};
pub use context::{
    error_context, error_context_async, error_context_async_silenced, error_context_silenced,
    BoxError, ContextError,
};
pub use retry::{retry, retry_blocking, RetryFailure, RetryPolicy};
