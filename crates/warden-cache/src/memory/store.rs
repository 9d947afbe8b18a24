//! In-memory cache implementation using the moka crate.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use moka::Expiry;
use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use tracing::debug;

use warden_core::config::cache::MemoryCacheConfig;
use warden_core::result::AppResult;
use warden_core::traits::cache::CacheProvider;

/// A stored value together with its own time-to-live.
#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    /// `None` never expires.
    ttl: Option<Duration>,
}

/// Applies each entry's own TTL, restarting it on every write.
struct EntryExpiry;

impl Expiry<String, MemoryEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &MemoryEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &MemoryEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// In-memory cache provider using moka.
///
/// Every mutation goes through moka's per-key compute lock, so a
/// compare-and-swap cannot interleave with a concurrent set or delete of the
/// same key.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    /// The underlying moka cache.
    cache: Cache<String, MemoryEntry>,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache from configuration.
    pub fn new(config: &MemoryCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(EntryExpiry)
            .build();

        Self { cache }
    }

    async fn put(&self, key: &str, entry: MemoryEntry) {
        self.cache
            .entry(key.to_string())
            .and_compute_with(|_| async move { Op::Put(entry) })
            .await;
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.cache.get(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        if ttl.is_zero() {
            return self.delete(key).await;
        }
        self.put(
            key,
            MemoryEntry {
                value: value.to_string(),
                ttl: Some(ttl),
            },
        )
        .await;
        Ok(())
    }

    async fn set_persistent(&self, key: &str, value: &str) -> AppResult<()> {
        self.put(
            key,
            MemoryEntry {
                value: value.to_string(),
                ttl: None,
            },
        )
        .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache
            .entry(key.to_string())
            .and_compute_with(|_| async { Op::Remove })
            .await;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.cache.get(key).await.is_some())
    }

    fn scan_prefix(&self, prefix: &str) -> BoxStream<'static, AppResult<String>> {
        // moka has no ordered index; snapshot matching keys up front.
        let keys: Vec<AppResult<String>> = self
            .cache
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| Ok(key.to_string()))
            .collect();
        debug!(prefix, count = keys.len(), "Scanned in-memory keys");
        stream::iter(keys).boxed()
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: &str,
        new_value: &str,
        ttl: Duration,
    ) -> AppResult<bool> {
        let replacement = MemoryEntry {
            value: new_value.to_string(),
            ttl: Some(ttl),
        };
        let result = self
            .cache
            .entry(key.to_string())
            .and_compute_with(|current| {
                let matches = current.is_some_and(|entry| entry.value().value == expected);
                async move {
                    if matches {
                        Op::Put(replacement)
                    } else {
                        Op::Nop
                    }
                }
            })
            .await;
        Ok(matches!(result, CompResult::ReplacedWith(_)))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
