//! The two-level cache front: a bounded memory tier over a persistent file
//! tier. Reads check memory first and promote file hits; writes go to both
//! tiers. File-tier write failures are logged and absorbed so caching never
//! fails a request.

use crate::cache::file::FileTier;
use crate::cache::key::CacheKey;
use crate::cache::memory::MemoryTier;
use crate::types::weather::CachedForecast;
use log::{debug, warn};
use std::path::Path;
use std::time::Duration;

const DEFAULT_MEMORY_CAPACITY: u64 = 256;

#[derive(Debug, Clone)]
pub struct TieredCache {
    memory: MemoryTier,
    file: FileTier,
}

impl TieredCache {
    /// Creates a cache over `cache_dir`, which must already exist.
    pub fn new(cache_dir: &Path) -> Self {
        Self::with_capacity(cache_dir, DEFAULT_MEMORY_CAPACITY)
    }

    pub fn with_capacity(cache_dir: &Path, memory_capacity: u64) -> Self {
        Self {
            memory: MemoryTier::new(memory_capacity),
            file: FileTier::new(cache_dir),
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<CachedForecast> {
        if let Some(forecast) = self.memory.get(key).await {
            debug!("memory cache hit for {key}");
            return Some(forecast);
        }
        let (forecast, remaining) = self.file.get(key).await?;
        debug!("file cache hit for {key}; promoting to memory");
        self.memory
            .set(key.clone(), forecast.clone(), remaining)
            .await;
        Some(forecast)
    }

    pub async fn set(&self, key: &CacheKey, forecast: &CachedForecast, ttl: Duration) {
        self.memory.set(key.clone(), forecast.clone(), ttl).await;
        if let Err(e) = self.file.set(key, forecast, ttl).await {
            warn!("file cache write failed for {key}: {e}");
        }
    }
}
