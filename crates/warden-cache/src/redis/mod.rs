//! Redis-backed session store.
//!
//! Single-key writes are plain `SET`/`DEL`; refresh rotation goes through a
//! Lua compare-and-swap so two racing refreshes cannot both win.

pub mod client;
pub mod operations;

use warden_core::config::cache::RedisCacheConfig;
use warden_core::result::AppResult;

pub use client::{KeySpace, RedisClient};
pub use operations::RedisCacheProvider;

/// Connect and wrap the client as a [`warden_core::traits::CacheProvider`].
pub async fn connect(config: &RedisCacheConfig) -> AppResult<RedisCacheProvider> {
    let client = RedisClient::connect(config).await?;
    Ok(RedisCacheProvider::new(client, config.scan_count))
}
