//! The persistent file-backed cache tier.
//!
//! One bincode file per key. Writes go to a temp file first and are renamed
//! into place, so concurrent readers only ever see complete entries. Expiry
//! is evaluated lazily at read time; an unreadable or corrupt entry is
//! treated as a miss and self-heals on the next successful write.

use crate::cache::error::CacheError;
use crate::cache::key::CacheKey;
use crate::types::weather::CachedForecast;
use bincode::config::{Configuration, Fixint, LittleEndian};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tempfile::NamedTempFile;
use tokio::task;

const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    /// Unix timestamp (seconds) after which the entry is stale.
    expires_at: u64,
    forecast: CachedForecast,
}

#[derive(Debug, Clone)]
pub struct FileTier {
    dir: PathBuf,
}

impl FileTier {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    /// Reads an entry, returning the forecast and its remaining TTL so a
    /// promotion into the memory tier keeps the same expiry.
    pub async fn get(&self, key: &CacheKey) -> Option<(CachedForecast, Duration)> {
        let path = self.entry_path(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("{}", CacheError::Read(path, e));
                return None;
            }
        };

        let entry = match bincode::serde::decode_from_slice::<StoredEntry, _>(
            &bytes,
            BINCODE_CONFIG,
        ) {
            Ok((entry, _)) => entry,
            Err(e) => {
                warn!("{}", CacheError::Corrupt(path.clone(), Box::new(e)));
                let _ = tokio::fs::remove_file(&path).await;
                return None;
            }
        };

        let now = unix_now();
        if now >= entry.expires_at {
            debug!("cache entry {key} expired; removing");
            let _ = tokio::fs::remove_file(&path).await;
            return None;
        }
        Some((entry.forecast, Duration::from_secs(entry.expires_at - now)))
    }

    pub async fn set(
        &self,
        key: &CacheKey,
        forecast: &CachedForecast,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let entry = StoredEntry {
            expires_at: unix_now() + ttl.as_secs(),
            forecast: forecast.clone(),
        };
        let encoded = bincode::serde::encode_to_vec(&entry, BINCODE_CONFIG)
            .map_err(|e| CacheError::Encode(Box::new(e)))?;

        let dir = self.dir.clone();
        let path = self.entry_path(key);
        task::spawn_blocking(move || {
            let mut temp = NamedTempFile::new_in(&dir)
                .map_err(|e| CacheError::Write(path.clone(), e))?;
            temp.write_all(&encoded)
                .map_err(|e| CacheError::Write(path.clone(), e))?;
            // Atomic rename; readers see either the old entry or the new one.
            temp.persist(&path)
                .map_err(|e| CacheError::Write(path, e.error))?;
            Ok::<(), CacheError>(())
        })
        .await??;
        Ok(())
    }

    pub(crate) fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
