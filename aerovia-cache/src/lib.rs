pub mod keys;
pub mod memory;
pub mod redis_cache;
pub mod ttl;

pub use memory::MemoryCache;
pub use redis_cache::RedisCache;
pub use ttl::CacheTtls;

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

/// Read-through cache for flight, search, and booking lookups.
///
/// Implementations are fail-open: a backend error is logged and reported
/// as a miss (reads) or dropped (writes and invalidations). Callers treat
/// every answer as advisory; the authoritative seat check in the flight
/// store never consults the cache.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get_raw(&self, key: &str) -> Option<String>;

    async fn set_raw(&self, key: &str, value: String, ttl: Duration);

    async fn delete(&self, key: &str);

    /// Evicts every entry whose key starts with `prefix`. Used to drop
    /// the whole search-results namespace in one call.
    async fn delete_prefix(&self, prefix: &str);
}

/// Fetches and deserializes a cached value. A corrupt entry is evicted
/// and treated as a miss.
pub async fn get_json<T: DeserializeOwned>(cache: &dyn Cache, key: &str) -> Option<T> {
    let raw = cache.get_raw(key).await?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(key, %err, "evicting undecodable cache entry");
            cache.delete(key).await;
            None
        }
    }
}

/// Serializes and stores a value with a TTL. Serialization failures are
/// logged and dropped, matching the fail-open write path.
pub async fn set_json<T: Serialize>(cache: &dyn Cache, key: &str, value: &T, ttl: Duration) {
    match serde_json::to_string(value) {
        Ok(raw) => cache.set_raw(key, raw, ttl).await,
        Err(err) => warn!(key, %err, "failed to serialize cache value"),
    }
}
