use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::warn;

/// In-memory TTL cache shared by the news client and the pipeline.
///
/// Entries live for the lifetime of the process; nothing is persisted.
#[derive(Clone)]
pub struct CacheManager {
    enabled: bool,
    capacity: usize,
    store: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

impl CacheManager {
    pub fn new(enabled: bool, capacity: u64) -> Self {
        Self {
            enabled,
            capacity: capacity.max(1) as usize,
            store: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        if !self.enabled {
            return None;
        }

        {
            let guard = self.store.read().await;
            match guard.get(key) {
                Some(entry) if Instant::now() <= entry.expires_at => {
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        self.store.write().await.remove(key);
        None
    }

    pub async fn get_json<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let value = self.get(key).await?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(error) => {
                warn!(target: "cache", %error, key, "dropping undecodable cache entry");
                self.store.write().await.remove(key);
                None
            }
        }
    }

    pub async fn insert(&self, key: String, value: Value, ttl_seconds: u64) {
        if !self.enabled {
            return;
        }

        let now = Instant::now();
        let expires_at = now + Duration::from_secs(ttl_seconds);
        let mut guard = self.store.write().await;

        if !guard.contains_key(&key) && guard.len() >= self.capacity {
            guard.retain(|_, entry| entry.expires_at > now);

            if guard.len() >= self.capacity {
                // evict whichever entry would have expired first
                if let Some(oldest) = guard
                    .iter()
                    .min_by_key(|(_, entry)| entry.expires_at)
                    .map(|(k, _)| k.clone())
                {
                    guard.remove(&oldest);
                }
            }
        }

        guard.insert(key, CacheEntry { value, expires_at });
    }

    pub async fn insert_json<T>(&self, key: String, value: &T, ttl_seconds: u64)
    where
        T: Serialize,
    {
        match serde_json::to_value(value) {
            Ok(encoded) => self.insert(key, encoded, ttl_seconds).await,
            Err(error) => warn!(target: "cache", %error, key, "failed to encode cache entry"),
        }
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn disabled_cache_never_stores() {
        let cache = CacheManager::new(false, 4);
        cache.insert("key".to_string(), json!(1), 60).await;

        assert!(cache.get("key").await.is_none());
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn expired_entries_are_not_returned() {
        let cache = CacheManager::new(true, 4);
        cache.insert("key".to_string(), json!("value"), 0).await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert!(cache.get("key").await.is_none());
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn full_cache_evicts_soonest_expiry() {
        let cache = CacheManager::new(true, 2);
        cache.insert("short".to_string(), json!(1), 10).await;
        cache.insert("long".to_string(), json!(2), 1000).await;
        cache.insert("newest".to_string(), json!(3), 500).await;

        assert!(cache.get("short").await.is_none());
        assert_eq!(cache.get("long").await, Some(json!(2)));
        assert_eq!(cache.get("newest").await, Some(json!(3)));
    }

    #[tokio::test]
    async fn typed_round_trip() {
        let cache = CacheManager::new(true, 4);
        cache
            .insert_json("list".to_string(), &vec!["a".to_string()], 60)
            .await;

        let decoded: Option<Vec<String>> = cache.get_json("list").await;
        assert_eq!(decoded, Some(vec!["a".to_string()]));

        let wrong: Option<u32> = cache.get_json("list").await;
        assert!(wrong.is_none());
        assert!(cache.get("list").await.is_none());
    }
}
