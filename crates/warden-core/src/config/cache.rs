//! Session store backend settings.

use serde::{Deserialize, Serialize};

/// Which key-value backend holds sessions and block flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Process-local store. Sessions do not survive a restart and are not
    /// shared between replicas.
    #[default]
    Memory,
    /// Shared Redis instance.
    Redis,
}

/// Backend selection plus per-backend options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Active backend.
    #[serde(default)]
    pub provider: CacheBackend,
    /// Options used when `provider = "redis"`.
    #[serde(default)]
    pub redis: RedisCacheConfig,
    /// Options used when `provider = "memory"`.
    #[serde(default)]
    pub memory: MemoryCacheConfig,
}

/// Redis connection options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisCacheConfig {
    /// Connection URL. May embed credentials.
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Namespace prepended to every physical key. Empty keeps the
    /// `{tenant}:session:{user}:{device}` layout as-is.
    #[serde(default)]
    pub key_prefix: String,
    /// `COUNT` hint for each `SCAN` page.
    #[serde(default = "default_scan_count")]
    pub scan_count: usize,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: String::new(),
            scan_count: default_scan_count(),
        }
    }
}

/// In-process store options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryCacheConfig {
    /// Entry cap. Past it the store evicts, which drops sessions early.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

impl Default for MemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
        }
    }
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_scan_count() -> usize {
    100
}

fn default_max_capacity() -> u64 {
    100_000
}
