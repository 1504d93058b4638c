//! Cache entry type

use std::time::{Duration, SystemTime};

/// A cached value with an absolute expiry timestamp
///
/// An entry whose expiry has passed is treated as absent; the memory provider
/// purges it lazily on the next access (no background sweep).
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cached value (opaque serialized bytes)
    pub value: Vec<u8>,
    /// Absolute expiry; `None` means the entry never expires
    pub expires_at: Option<SystemTime>,
}

impl CacheEntry {
    /// Create a new entry without expiry
    pub fn new(value: Vec<u8>) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    /// Create an entry expiring `ttl` from now
    pub fn with_ttl(value: Vec<u8>, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Some(SystemTime::now() + ttl),
        }
    }

    /// Check if the entry has expired
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => SystemTime::now() >= expires_at,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_without_ttl_never_expires() {
        let entry = CacheEntry::new(b"test".to_vec());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_with_ttl() {
        let entry = CacheEntry::with_ttl(b"test".to_vec(), Duration::from_secs(60));
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_expired_entry() {
        let entry = CacheEntry {
            value: b"test".to_vec(),
            expires_at: Some(SystemTime::now() - Duration::from_secs(1)),
        };
        assert!(entry.is_expired());
    }
}
