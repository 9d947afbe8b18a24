//! Backend selection for the session store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;

use warden_core::config::cache::{CacheBackend, CacheConfig};
#[cfg(not(all(feature = "memory", feature = "redis-backend")))]
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::cache::CacheProvider;

/// The configured [`CacheProvider`] behind one shared handle.
#[derive(Debug, Clone)]
pub struct CacheManager {
    inner: Arc<dyn CacheProvider>,
}

impl CacheManager {
    /// Build the backend named by `config.provider`.
    pub async fn new(config: &CacheConfig) -> AppResult<Self> {
        let inner = match config.provider {
            CacheBackend::Redis => redis_backend(config).await?,
            CacheBackend::Memory => memory_backend(config)?,
        };
        tracing::info!(backend = ?config.provider, "Session store backend ready");
        Ok(Self { inner })
    }

    /// Wrap an already built provider.
    pub fn from_provider(provider: Arc<dyn CacheProvider>) -> Self {
        Self { inner: provider }
    }
}

#[cfg(feature = "redis-backend")]
async fn redis_backend(config: &CacheConfig) -> AppResult<Arc<dyn CacheProvider>> {
    Ok(Arc::new(crate::redis::connect(&config.redis).await?))
}

#[cfg(not(feature = "redis-backend"))]
async fn redis_backend(_config: &CacheConfig) -> AppResult<Arc<dyn CacheProvider>> {
    Err(AppError::configuration(
        "cache.provider = \"redis\" but warden-cache was built without `redis-backend`",
    ))
}

#[cfg(feature = "memory")]
fn memory_backend(config: &CacheConfig) -> AppResult<Arc<dyn CacheProvider>> {
    Ok(Arc::new(crate::memory::MemoryCacheProvider::new(
        &config.memory,
    )))
}

#[cfg(not(feature = "memory"))]
fn memory_backend(_config: &CacheConfig) -> AppResult<Arc<dyn CacheProvider>> {
    Err(AppError::configuration(
        "cache.provider = \"memory\" but warden-cache was built without `memory`",
    ))
}

#[async_trait]
impl CacheProvider for CacheManager {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn set_persistent(&self, key: &str, value: &str) -> AppResult<()> {
        self.inner.set_persistent(key, value).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        self.inner.exists(key).await
    }

    fn scan_prefix(&self, prefix: &str) -> BoxStream<'static, AppResult<String>> {
        self.inner.scan_prefix(prefix)
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: &str,
        new_value: &str,
        ttl: Duration,
    ) -> AppResult<bool> {
        self.inner
            .compare_and_swap(key, expected, new_value, ttl)
            .await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_from_config() {
        let manager = CacheManager::new(&CacheConfig::default()).await.unwrap();
        manager.set("k", "v", Duration::from_secs(60)).await.unwrap();
        assert_eq!(manager.get("k").await.unwrap().as_deref(), Some("v"));
        assert!(manager.health_check().await.unwrap());
    }
}
