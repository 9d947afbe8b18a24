//! Cache provider trait for pluggable key-value backends.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::result::AppResult;

/// Trait for cache backends (Redis or in-memory).
///
/// All values are strings (JSON for structured records). Keys passed in are
/// logical keys; the provider is responsible for any physical prefixing and
/// for TTL enforcement.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist or has expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value with a TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Set a value without expiry.
    async fn set_persistent(&self, key: &str, value: &str) -> AppResult<()>;

    /// Delete a key. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check whether a key exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Lazily enumerate logical keys starting with `prefix`.
    ///
    /// The stream is driven by a cursor; keys written or removed while it is
    /// being consumed may or may not be observed.
    fn scan_prefix(&self, prefix: &str) -> BoxStream<'static, AppResult<String>>;

    /// Atomically replace the value at `key` with `new_value` only if its
    /// current value equals `expected`. Returns `true` if the swap happened.
    async fn compare_and_swap(
        &self,
        key: &str,
        expected: &str,
        new_value: &str,
        ttl: Duration,
    ) -> AppResult<bool>;

    /// Check that the cache backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
