use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::Cache;

/// In-process cache backend. Serves tests and single-node deployments
/// without a Redis instance; entries expire lazily on read.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

struct Entry {
    value: String,
    expires_at: Instant,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get_raw(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    async fn set_raw(&self, key: &str, value: String, ttl: Duration) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    async fn delete(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }

    async fn delete_prefix(&self, prefix: &str) {
        self.entries
            .lock()
            .unwrap()
            .retain(|key, _| !key.starts_with(prefix));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = MemoryCache::new();
        cache
            .set_raw("flight:id:1", "a".to_string(), Duration::from_secs(60))
            .await;
        assert_eq!(cache.get_raw("flight:id:1").await.as_deref(), Some("a"));

        cache.delete("flight:id:1").await;
        assert_eq!(cache.get_raw("flight:id:1").await, None);
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache = MemoryCache::new();
        cache
            .set_raw("k", "v".to_string(), Duration::from_millis(10))
            .await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.get_raw("k").await, None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_delete_prefix_clears_namespace_only() {
        let cache = MemoryCache::new();
        let ttl = Duration::from_secs(60);
        cache.set_raw("search:SGN:HAN:0:1", "a".to_string(), ttl).await;
        cache.set_raw("search:SGN:DAD:0:2", "b".to_string(), ttl).await;
        cache.set_raw("flight:id:x", "c".to_string(), ttl).await;

        cache.delete_prefix("search:").await;

        assert_eq!(cache.get_raw("search:SGN:HAN:0:1").await, None);
        assert_eq!(cache.get_raw("search:SGN:DAD:0:2").await, None);
        assert_eq!(cache.get_raw("flight:id:x").await.as_deref(), Some("c"));
    }
}
