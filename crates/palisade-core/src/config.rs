//! Caching configuration schema

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::{CacheError, Result};

/// Name of the category every configuration must carry
pub const DEFAULT_CATEGORY: &str = "default";

/// Which provider stack to assemble
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// No providers; every read misses, every write is a no-op
    Disabled,
    /// In-process memory tier only
    MemoryOnly,
    /// Remote tier only
    RemoteOnly,
    /// Memory tier in front of the remote tier
    #[default]
    Tiered,
}

/// Connection settings for the remote tier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub host: String,
    pub port: u16,
    /// Redis logical database index
    pub db: i64,
    pub password: Option<String>,
    /// TTL applied when no category TTL is supplied
    pub default_ttl_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            db: 0,
            password: None,
            default_ttl_secs: 3600,
        }
    }
}

impl RemoteConfig {
    /// Connection URL for the redis client
    pub fn url(&self) -> String {
        match &self.password {
            Some(password) => format!(
                "redis://:{}@{}:{}/{}",
                password, self.host, self.port, self.db
            ),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }

    /// Default TTL as a duration
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }
}

/// TTL/size policy for one cache category
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryPolicy {
    pub ttl_secs: u64,
    pub max_size: usize,
}

impl Default for CategoryPolicy {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            max_size: 10_000,
        }
    }
}

impl CategoryPolicy {
    /// TTL as a duration
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Top-level caching configuration
///
/// `categories` must contain a `default` entry; `category()` falls back to it
/// for names that have no explicit policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CachingConfig {
    pub policy: CachePolicy,
    pub remote: RemoteConfig,
    pub categories: HashMap<String, CategoryPolicy>,
}

impl Default for CachingConfig {
    fn default() -> Self {
        let mut categories = HashMap::new();
        categories.insert(DEFAULT_CATEGORY.to_string(), CategoryPolicy::default());
        Self {
            policy: CachePolicy::default(),
            remote: RemoteConfig::default(),
            categories,
        }
    }
}

impl CachingConfig {
    /// Create a config with a specific policy
    pub fn with_policy(policy: CachePolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    /// Add or replace a category policy
    pub fn category_policy(
        mut self,
        name: impl Into<String>,
        ttl: Duration,
        max_size: usize,
    ) -> Self {
        self.categories.insert(
            name.into(),
            CategoryPolicy {
                ttl_secs: ttl.as_secs(),
                max_size,
            },
        );
        self
    }

    /// Check structural invariants
    pub fn validate(&self) -> Result<()> {
        if !self.categories.contains_key(DEFAULT_CATEGORY) {
            return Err(CacheError::Config(format!(
                "categories must contain a '{DEFAULT_CATEGORY}' entry"
            )));
        }
        Ok(())
    }

    /// Resolve a category name, falling back to `default` for unknown names
    pub fn category(&self, name: &str) -> CategoryPolicy {
        self.categories
            .get(name)
            .or_else(|| self.categories.get(DEFAULT_CATEGORY))
            .copied()
            .unwrap_or_default()
    }
}
