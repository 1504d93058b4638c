//! Typed cache front-end

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use palisade_core::{
    CachePolicy, CacheProvider, CachingConfig, JsonSerializer, KeyBuilder, Result, Serializer,
};
use palisade_storage::{MemoryProvider, RedisProvider, TieredCache};

/// Typed front-end over a [`TieredCache`]
///
/// Serializes values through a pluggable [`Serializer`], resolves category
/// TTLs, and spreads expiry of hot keys with a small TTL jitter. The cache
/// is an explicit dependency: construct it once and pass it to whatever
/// needs it. There is no process-wide handle.
pub struct Cache<S = JsonSerializer>
where
    S: Serializer,
{
    tiers: TieredCache,
    serializer: S,
    /// TTL jitter fraction (0.0 - 1.0) to prevent synchronized expiry
    ttl_jitter: f64,
}

impl Cache<JsonSerializer> {
    /// Wrap a tier stack with the default JSON serializer
    pub fn new(tiers: TieredCache) -> Self {
        Self::with_serializer(tiers, JsonSerializer)
    }

    /// Assemble the provider stack described by `config`
    ///
    /// The memory tier is shared by every category, so it is sized by the
    /// largest configured `max_size` (any `0` lifts the bound). `disabled`
    /// builds a cache with no tiers: every read misses and every write is a
    /// no-op, so call sites need no special casing.
    pub fn from_config(config: &CachingConfig) -> Result<Self> {
        config.validate()?;

        let capacity = memory_capacity(config);
        let providers: Vec<Arc<dyn CacheProvider>> = match config.policy {
            CachePolicy::Disabled => Vec::new(),
            CachePolicy::MemoryOnly => {
                vec![Arc::new(MemoryProvider::with_capacity(capacity))]
            }
            CachePolicy::RemoteOnly => {
                vec![Arc::new(RedisProvider::new(config.remote.clone()))]
            }
            CachePolicy::Tiered => vec![
                Arc::new(MemoryProvider::with_capacity(capacity)),
                Arc::new(RedisProvider::new(config.remote.clone())),
            ],
        };

        Ok(Self::new(TieredCache::new(
            providers,
            config.categories.clone(),
        )))
    }
}

/// Largest `max_size` across the configured categories; `0` in any category
/// makes the shared memory tier unbounded
fn memory_capacity(config: &CachingConfig) -> usize {
    let mut capacity = 0;
    for policy in config.categories.values() {
        if policy.max_size == 0 {
            return 0;
        }
        capacity = capacity.max(policy.max_size);
    }
    capacity
}

impl<S: Serializer> Cache<S> {
    /// Wrap a tier stack with a custom serializer
    pub fn with_serializer(tiers: TieredCache, serializer: S) -> Self {
        Self {
            tiers,
            serializer,
            ttl_jitter: 0.1,
        }
    }

    /// Disable TTL jitter
    pub fn no_jitter(mut self) -> Self {
        self.ttl_jitter = 0.0;
        self
    }

    /// The underlying tier stack
    pub fn tiers(&self) -> &TieredCache {
        &self.tiers
    }

    /// Apply TTL jitter to prevent thundering herd on expiry
    fn apply_ttl_jitter(&self, ttl: Duration) -> Duration {
        if self.ttl_jitter > 0.0 {
            let jitter_range = (ttl.as_secs_f64() * self.ttl_jitter) as u64;
            if jitter_range > 0 {
                let jitter = rand::random::<u64>() % jitter_range;
                return ttl + Duration::from_secs(jitter);
            }
        }
        ttl
    }

    /// Get and deserialize a value
    pub async fn get<T>(&self, key: &str, category: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        match self.tiers.get(key, category).await {
            Some(bytes) => Ok(Some(self.serializer.deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Serialize and write a value through every tier
    pub async fn set<T>(&self, key: &str, value: &T, category: &str) -> Result<()>
    where
        T: Serialize,
    {
        let bytes = self.serializer.serialize(value)?;
        let ttl = self.apply_ttl_jitter(self.tiers.category(category).ttl());
        self.tiers.set_with_ttl(key, bytes, Some(ttl)).await;
        Ok(())
    }

    /// Remove a key from every tier
    pub async fn delete(&self, key: &str) {
        self.tiers.delete(key).await;
    }

    /// Disconnect every tier
    pub async fn disconnect(&self) {
        self.tiers.disconnect().await;
    }

    /// Read-through: return the cached value for `key`, or run `loader` and
    /// cache its result
    ///
    /// Cache faults never surface here: a failed read falls through to the
    /// loader, a failed write is logged and the computed value is still
    /// returned. Only the loader's own error propagates.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        key: &KeyBuilder,
        loader: F,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        let cache_key = key.build();
        let category = key.category();

        match self.get::<T>(&cache_key, category).await {
            Ok(Some(hit)) => return Ok(hit),
            Ok(None) => {}
            Err(e) => {
                warn!(key = %cache_key, error = %e, "cache read failed, recomputing")
            }
        }

        let value = loader().await?;
        if let Err(e) = self.set(&cache_key, &value, category).await {
            warn!(key = %cache_key, error = %e, "cache write failed, returning computed value");
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_capacity_takes_largest_category() {
        let config = CachingConfig::default()
            .category_policy("small", Duration::from_secs(60), 50)
            .category_policy("bulk", Duration::from_secs(60), 25_000);
        assert_eq!(memory_capacity(&config), 25_000);
    }

    #[test]
    fn test_memory_capacity_zero_lifts_bound() {
        let config =
            CachingConfig::default().category_policy("open", Duration::from_secs(60), 0);
        assert_eq!(memory_capacity(&config), 0);
    }
}
