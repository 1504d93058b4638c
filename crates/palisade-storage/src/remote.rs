//! Remote cache provider backed by Redis

use async_trait::async_trait;
use bb8::Pool;
use bb8_redis::RedisConnectionManager;
use redis::AsyncCommands;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use palisade_core::{CacheError, CacheProvider, RemoteConfig, Result};

const POOL_SIZE: u32 = 10;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Remote cache provider
///
/// Connects lazily: the connection pool is built on first use, and the
/// handle is guarded by a mutex so concurrent first use performs exactly one
/// connection attempt. Values are stored as opaque byte blobs; TTL is
/// delegated to the backend's native expiry.
///
/// Every operation that cannot reach the backend degrades per the
/// graceful-degradation contract: the fault is logged and the call behaves
/// as a miss (`get`) or a no-op (`set`, `delete`).
#[derive(Clone)]
pub struct RedisProvider {
    config: RemoteConfig,
    pool: Arc<Mutex<Option<Pool<RedisConnectionManager>>>>,
}

impl RedisProvider {
    /// Create a provider; no connection is made until the first operation
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            config,
            pool: Arc::new(Mutex::new(None)),
        }
    }

    /// Get or lazily build the pool
    async fn pool(&self) -> Result<Pool<RedisConnectionManager>> {
        let mut guard = self.pool.lock().await;
        if let Some(pool) = guard.as_ref() {
            return Ok(pool.clone());
        }

        let manager = RedisConnectionManager::new(self.config.url())
            .map_err(|e| CacheError::Connection(e.to_string()))?;
        // build_unchecked defers connection establishment to first checkout
        let pool = Pool::builder()
            .max_size(POOL_SIZE)
            .connection_timeout(CONNECT_TIMEOUT)
            .build_unchecked(manager);

        debug!(
            host = %self.config.host,
            port = self.config.port,
            db = self.config.db,
            "remote cache pool created"
        );
        *guard = Some(pool.clone());
        Ok(pool)
    }

    async fn try_get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let pool = self.pool().await?;
        let mut conn = pool
            .get()
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        let bytes: Option<Vec<u8>> = conn
            .get(key)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(bytes)
    }

    async fn try_set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let pool = self.pool().await?;
        let mut conn = pool
            .get()
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        let ttl = ttl.unwrap_or_else(|| self.config.default_ttl());
        let _: () = conn
            .set_ex(key, value, ttl.as_secs().max(1))
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn try_delete(&self, key: &str) -> Result<()> {
        let pool = self.pool().await?;
        let mut conn = pool
            .get()
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        let _: u64 = conn
            .del(key)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl CacheProvider for RedisProvider {
    fn name(&self) -> &str {
        "redis"
    }

    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        match self.try_get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(provider = self.name(), key, error = %e, "get failed, treating as miss");
                None
            }
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) {
        if let Err(e) = self.try_set(key, &value, ttl).await {
            warn!(provider = self.name(), key, error = %e, "set failed, skipping write");
        }
    }

    async fn delete(&self, key: &str) {
        if let Err(e) = self.try_delete(key).await {
            warn!(provider = self.name(), key, error = %e, "delete failed, skipping");
        }
    }

    async fn disconnect(&self) {
        let mut guard = self.pool.lock().await;
        if guard.take().is_some() {
            debug!(provider = self.name(), "remote cache disconnected");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These tests run without a Redis server; they exercise the lazy-connect
    // and graceful-degradation paths only. Hit-path behavior is covered by
    // the tiered tests against in-memory tiers.

    #[tokio::test]
    async fn test_construction_does_not_connect() {
        let provider = RedisProvider::new(RemoteConfig::default());
        assert!(provider.pool.lock().await.is_none());
        provider.disconnect().await;
    }

    #[tokio::test]
    async fn test_unreachable_backend_degrades() {
        // Port 1 is never a Redis server; connections fail fast
        let config = RemoteConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..Default::default()
        };
        let provider = RedisProvider::new(config);

        assert_eq!(provider.get("key").await, None);
        provider.set("key", b"value".to_vec(), None).await;
        provider.delete("key").await;

        // Disconnect resets the handle; the next use reconnects lazily
        provider.disconnect().await;
        assert!(provider.pool.lock().await.is_none());
    }
}
