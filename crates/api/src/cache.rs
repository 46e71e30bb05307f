//! In-process response cache for hot public reads.
//!
//! Entries are JSON values keyed by the strings in
//! [`backdrop_core::cache`]. Each entry expires after the configured TTL;
//! admin invalidations drop entries early via [`ResponseCache::apply`].

use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use backdrop_core::cache::InvalidationTarget;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};

struct CacheEntry {
    stored_at: Instant,
    value: serde_json::Value,
}

/// TTL-bounded map of cached response payloads.
pub struct ResponseCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Fresh cached value for `key`, if any.
    pub async fn get(&self, key: &str) -> Option<serde_json::Value> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.value.clone())
    }

    pub async fn insert(&self, key: impl Into<String>, value: serde_json::Value) {
        if self.ttl.is_zero() {
            return;
        }
        let mut entries = self.entries.write().await;
        entries.insert(
            key.into(),
            CacheEntry {
                stored_at: Instant::now(),
                value,
            },
        );
    }

    /// Return the cached `T` under `key`, or run `load`, cache and return it.
    ///
    /// Errors from `load` are returned and nothing is cached.
    pub async fn get_or_load<T, F, Fut>(&self, key: &str, load: F) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        if let Some(hit) = self.get(key).await {
            match serde_json::from_value::<T>(hit) {
                Ok(value) => {
                    tracing::debug!(cache_key = key, "Response cache hit");
                    return Ok(value);
                }
                Err(e) => {
                    tracing::warn!(cache_key = key, error = %e, "Discarding unreadable cache entry");
                }
            }
        }

        let value = load().await?;
        let json = serde_json::to_value(&value)
            .map_err(|e| AppError::InternalError(format!("Cache serialization failed: {e}")))?;
        self.insert(key, json).await;
        Ok(value)
    }

    /// Drop every entry matched by `target`. Returns how many were removed.
    pub async fn apply(&self, target: &InvalidationTarget) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !target.matches(key));
        before - entries.len()
    }

    /// Drop the entries behind each key (exact or `prefix*`).
    pub async fn invalidate(&self, keys: &[&str]) {
        let mut removed = 0;
        for key in keys {
            removed += self.apply(&InvalidationTarget::parse(key)).await;
        }
        if removed > 0 {
            tracing::debug!(?keys, removed, "Response cache entries invalidated");
        }
    }

    /// Drop expired entries.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backdrop_core::cache::{wallpaper_key, CATEGORIES};
    use serde_json::json;

    fn cache() -> ResponseCache {
        ResponseCache::new(Duration::from_secs(60))
    }

    #[tokio::test]
    async fn insert_then_get() {
        let cache = cache();
        cache.insert(CATEGORIES, json!([1, 2])).await;
        assert_eq!(cache.get(CATEGORIES).await, Some(json!([1, 2])));
        assert_eq!(cache.get("missing").await, None);
    }

    #[tokio::test]
    async fn zero_ttl_never_stores() {
        let cache = ResponseCache::new(Duration::ZERO);
        cache.insert(CATEGORIES, json!(true)).await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn get_or_load_only_loads_once() {
        let cache = cache();
        let first: Vec<i64> = cache
            .get_or_load("k", || async { Ok::<_, AppError>(vec![1, 2, 3]) })
            .await
            .unwrap();
        let second: Vec<i64> = cache
            .get_or_load("k", || async {
                Err::<Vec<i64>, _>(AppError::BadRequest("should not load".into()))
            })
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn failed_load_is_not_cached() {
        let cache = cache();
        let result: AppResult<Vec<i64>> = cache
            .get_or_load("k", || async {
                Err::<Vec<i64>, _>(AppError::BadRequest("boom".into()))
            })
            .await;
        assert!(result.is_err());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn apply_respects_target() {
        let cache = cache();
        cache.insert(wallpaper_key(1), json!(1)).await;
        cache.insert(wallpaper_key(2), json!(2)).await;
        cache.insert(CATEGORIES, json!([])).await;

        let removed = cache.apply(&InvalidationTarget::parse("wallpaper:1")).await;
        assert_eq!(removed, 1);
        assert_eq!(cache.len().await, 2);

        let removed = cache.apply(&InvalidationTarget::parse("wallpaper:*")).await;
        assert_eq!(removed, 1);
        assert!(cache.get(CATEGORIES).await.is_some());

        cache.apply(&InvalidationTarget::All).await;
        assert!(cache.is_empty().await);
    }
}
