//! palisade-core: Core traits and types for the palisade toolkit
//!
//! This crate provides the foundational types and traits shared by the
//! palisade resilience and caching crates.

mod config;
mod error;
mod key;
mod traits;
mod types;

pub use config::{CachePolicy, CachingConfig, CategoryPolicy, RemoteConfig, DEFAULT_CATEGORY};
pub use error::{CacheError, Result};
pub use key::KeyBuilder;
pub use traits::*;
pub use types::*;
