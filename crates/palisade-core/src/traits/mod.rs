//! Core traits for cache operations

mod provider;
mod serializer;

pub use provider::CacheProvider;
pub use serializer::{JsonSerializer, Serializer};
