//! Pluggable serialization trait

use crate::CacheError;
use serde::{de::DeserializeOwned, Serialize};

/// Converts values to and from the byte blobs providers store
///
/// Providers never look inside a cached value: whatever crosses the tier
/// boundary is an opaque blob, and the serializer owns both directions of
/// that conversion. Faults map onto [`CacheError::Serialization`] and
/// [`CacheError::Deserialization`] so the typed front-end can report which
/// direction failed.
pub trait Serializer: Send + Sync + Clone + 'static {
    /// Serializer name, used in log events
    fn name(&self) -> &str;

    /// Encode a value into the blob a provider will store
    fn serialize<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CacheError>;

    /// Decode a blob read back from a provider
    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CacheError>;
}

/// Default serializer; stores values as JSON text
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn name(&self) -> &str {
        "json"
    }

    fn serialize<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CacheError> {
        serde_json::to_vec(value).map_err(|e| CacheError::Serialization(e.to_string()))
    }

    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CacheError> {
        serde_json::from_slice(bytes).map_err(|e| CacheError::Deserialization(e.to_string()))
    }
}
