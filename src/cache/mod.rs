pub mod error;
mod file;
mod key;
mod memory;
mod tiered;

pub use key::CacheKey;
pub use tiered::TieredCache;
