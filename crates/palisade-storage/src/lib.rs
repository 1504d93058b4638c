//! palisade-storage: cache providers and tier composition

mod memory;
mod remote;
mod tiered;

pub use memory::MemoryProvider;
pub use remote::RedisProvider;
pub use tiered::TieredCache;
