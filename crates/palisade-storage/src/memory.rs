//! In-memory cache provider using DashMap

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use palisade_core::{CacheEntry, CacheProvider};

/// In-process memory provider
///
/// Uses `DashMap` for concurrent access. Expired entries are purged lazily
/// on the access that observes them; there is no background sweep. Cloning
/// creates a new handle to the SAME underlying store.
#[derive(Clone)]
pub struct MemoryProvider {
    data: Arc<DashMap<String, CacheEntry>>,
    /// Maximum number of entries (0 = unlimited)
    max_capacity: usize,
}

impl MemoryProvider {
    /// Create a provider with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(10_000)
    }

    /// Create a provider capped at `max_capacity` entries (0 = unlimited)
    pub fn with_capacity(max_capacity: usize) -> Self {
        Self {
            data: Arc::new(DashMap::new()),
            max_capacity,
        }
    }

    /// Number of entries currently held, including not-yet-purged expired ones
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Evict entries if at capacity
    fn maybe_evict(&self) {
        if self.max_capacity == 0 || self.data.len() < self.max_capacity {
            return;
        }

        // Drop expired entries first; they are free to reclaim
        self.data.retain(|_, entry| !entry.is_expired());

        // Still full: shed arbitrary entries down to make room for one more
        if self.data.len() >= self.max_capacity {
            let overflow = self.data.len() - (self.max_capacity - 1);
            let keys_to_remove: Vec<String> = self
                .data
                .iter()
                .take(overflow)
                .map(|entry| entry.key().clone())
                .collect();
            for key in keys_to_remove {
                self.data.remove(&key);
            }
        }
    }
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheProvider for MemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let entry = self.data.get(key)?;
        if entry.is_expired() {
            drop(entry);
            self.data.remove(key);
            debug!(key, "expired entry purged");
            return None;
        }
        Some(entry.value.clone())
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) {
        self.maybe_evict();
        let entry = match ttl {
            Some(ttl) => CacheEntry::with_ttl(value, ttl),
            None => CacheEntry::new(value),
        };
        self.data.insert(key.to_string(), entry);
    }

    async fn delete(&self, key: &str) {
        self.data.remove(key);
    }

    async fn disconnect(&self) {
        // Nothing to release for the in-process tier
    }
}
