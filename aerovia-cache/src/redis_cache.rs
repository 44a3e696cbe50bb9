use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::warn;

use crate::Cache;

/// Redis-backed cache. Every operation degrades to a miss or a no-op on
/// connection trouble; an unreachable Redis must never fail a booking.
#[derive(Clone)]
pub struct RedisCache {
    client: redis::Client,
}

impl RedisCache {
    pub fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    async fn connection(&self) -> redis::RedisResult<redis::aio::MultiplexedConnection> {
        self.client.get_multiplexed_async_connection().await
    }

    async fn try_get(&self, key: &str) -> redis::RedisResult<Option<String>> {
        let mut conn = self.connection().await?;
        conn.get(key).await
    }

    async fn try_set(&self, key: &str, value: String, ttl: Duration) -> redis::RedisResult<()> {
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1)).await
    }

    async fn try_delete(&self, key: &str) -> redis::RedisResult<()> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(key).await
    }

    async fn try_delete_prefix(&self, prefix: &str) -> redis::RedisResult<()> {
        let mut conn = self.connection().await?;
        let pattern = format!("{prefix}*");
        let mut cursor: u64 = 0;
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await?;
            if !keys.is_empty() {
                conn.del::<_, ()>(keys).await?;
            }
            if next == 0 {
                break;
            }
            cursor = next;
        }
        Ok(())
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get_raw(&self, key: &str) -> Option<String> {
        match self.try_get(key).await {
            Ok(value) => value,
            Err(err) => {
                warn!(key, %err, "cache read failed, treating as miss");
                None
            }
        }
    }

    async fn set_raw(&self, key: &str, value: String, ttl: Duration) {
        if let Err(err) = self.try_set(key, value, ttl).await {
            warn!(key, %err, "cache write failed, skipping");
        }
    }

    async fn delete(&self, key: &str) {
        if let Err(err) = self.try_delete(key).await {
            warn!(key, %err, "cache invalidation failed");
        }
    }

    async fn delete_prefix(&self, prefix: &str) {
        if let Err(err) = self.try_delete_prefix(prefix).await {
            warn!(prefix, %err, "cache namespace invalidation failed");
        }
    }
}
