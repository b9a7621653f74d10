//! In-process forecast tier using Moka

use std::time::Duration;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use crate::models::ForecastResult;
use tracing::debug;

#[derive(Clone)]
struct MemoryEntry {
    result: ForecastResult,
    expires_at: DateTime<Utc>,
}

/// Hot copies of recently computed forecasts, keyed by cache key hash
#[derive(Clone)]
pub struct ForecastMemoryCache {
    cache: Cache<String, MemoryEntry>,
}

impl ForecastMemoryCache {
    /// Entries live for `ttl` after insertion, the same lifetime as their stored row.
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    /// Moka evicts on wall-clock time; `now` is checked against the row's own
    /// `expires_at` so callers with an explicit clock see the same expiry as SQLite.
    pub async fn get(&self, key_hash: &str, now: DateTime<Utc>) -> Option<ForecastResult> {
        let entry = self.cache.get(key_hash).await?;
        if entry.expires_at <= now {
            debug!("Memory tier entry expired for key: {}", key_hash);
            return None;
        }
        debug!("Memory tier hit for key: {}", key_hash);
        Some(entry.result)
    }

    pub async fn insert(&self, key_hash: &str, result: ForecastResult, expires_at: DateTime<Utc>) {
        self.cache
            .insert(key_hash.to_string(), MemoryEntry { result, expires_at })
            .await;
        debug!("Memory tier stored key: {}", key_hash);
    }

    pub async fn invalidate(&self, key_hash: &str) {
        self.cache.invalidate(key_hash).await;
        debug!("Memory tier invalidated key: {}", key_hash);
    }
}
