//! Cache provider trait

use async_trait::async_trait;
use std::time::Duration;

/// Uniform contract for a single cache tier
///
/// Implementations include the in-process memory provider and the remote
/// Redis provider. The infallible signatures are deliberate: a provider must
/// absorb its own internal faults. A backend that cannot be reached logs the
/// fault and reports the item as absent (`get`), does nothing (`set`,
/// `delete`), or closes best-effort (`disconnect`). A failing tier never
/// breaks the caller.
#[async_trait]
pub trait CacheProvider: Send + Sync + 'static {
    /// Provider name, used in log events
    fn name(&self) -> &str;

    /// Fetch a value
    ///
    /// Returns `None` when the key is missing, expired, or the backend
    /// faulted.
    async fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store a value, best effort
    ///
    /// `ttl = None` stores without expiry.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>);

    /// Remove a value, best effort
    async fn delete(&self, key: &str);

    /// Release backend resources, best effort
    ///
    /// Providers that connect lazily may be used again after `disconnect`;
    /// the next operation reconnects.
    async fn disconnect(&self);
}
