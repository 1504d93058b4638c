//! Tiered cache composition

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use palisade_core::{CacheProvider, CategoryPolicy, DEFAULT_CATEGORY};

/// Multi-tier cache over an ordered list of providers, fastest first
///
/// Reads walk the tiers in order and backfill every earlier (faster) tier on
/// a hit. Writes and deletes fan out to every tier independently; one tier's
/// failure never prevents the others from being written. Providers absorb
/// their own faults, so this layer only sequences them.
pub struct TieredCache {
    providers: Vec<Arc<dyn CacheProvider>>,
    categories: HashMap<String, CategoryPolicy>,
}

impl TieredCache {
    /// Compose providers with a category policy table
    ///
    /// A `default` category entry is inserted if the table lacks one.
    pub fn new(
        providers: Vec<Arc<dyn CacheProvider>>,
        mut categories: HashMap<String, CategoryPolicy>,
    ) -> Self {
        categories
            .entry(DEFAULT_CATEGORY.to_string())
            .or_default();
        Self {
            providers,
            categories,
        }
    }

    /// Number of tiers
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Resolve a category name, falling back to `default` for unknown names
    pub fn category(&self, name: &str) -> CategoryPolicy {
        self.categories
            .get(name)
            .or_else(|| self.categories.get(DEFAULT_CATEGORY))
            .copied()
            .unwrap_or_default()
    }

    /// Read through the tiers
    ///
    /// On the first hit, every earlier tier is backfilled with the value at
    /// the category's TTL. A tier that faults internally reports a miss and
    /// is simply skipped.
    pub async fn get(&self, key: &str, category: &str) -> Option<Vec<u8>> {
        let ttl = self.category(category).ttl();

        for (tier, provider) in self.providers.iter().enumerate() {
            if let Some(value) = provider.get(key).await {
                debug!(provider = provider.name(), key, tier, "tier hit");
                for earlier in &self.providers[..tier] {
                    earlier.set(key, value.clone(), Some(ttl)).await;
                }
                return Some(value);
            }
        }
        None
    }

    /// Write-through to every tier, unconditionally and best-effort
    pub async fn set(&self, key: &str, value: Vec<u8>, category: &str) {
        let ttl = self.category(category).ttl();
        self.set_with_ttl(key, value, Some(ttl)).await;
    }

    /// Write-through with an explicit TTL, bypassing category resolution
    pub async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) {
        for provider in &self.providers {
            provider.set(key, value.clone(), ttl).await;
        }
    }

    /// Best-effort fan-out delete across all tiers
    pub async fn delete(&self, key: &str) {
        for provider in &self.providers {
            provider.delete(key).await;
        }
    }

    /// Disconnect every tier; one tier's failure does not block the others
    pub async fn disconnect(&self) {
        for provider in &self.providers {
            provider.disconnect().await;
        }
    }
}
