//! The bounded in-memory cache tier.
//!
//! Backed by a `moka` future cache, which bounds the entry count and evicts
//! under LRU pressure. Freshness is checked per entry on read so a value that
//! outlived its tier TTL never leaves this tier.

use crate::cache::key::CacheKey;
use crate::types::weather::CachedForecast;
use moka::future::Cache;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct MemoryEntry {
    forecast: CachedForecast,
    expires_at: Instant,
}

#[derive(Debug, Clone)]
pub struct MemoryTier {
    cache: Cache<CacheKey, MemoryEntry>,
}

impl MemoryTier {
    pub fn new(capacity: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(capacity).build(),
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<CachedForecast> {
        let entry = self.cache.get(key).await?;
        if Instant::now() >= entry.expires_at {
            self.cache.invalidate(key).await;
            return None;
        }
        Some(entry.forecast)
    }

    pub async fn set(&self, key: CacheKey, forecast: CachedForecast, ttl: Duration) {
        let entry = MemoryEntry {
            forecast,
            expires_at: Instant::now() + ttl,
        };
        self.cache.insert(key, entry).await;
    }
}
