use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::CacheConfig;

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// Bounded in-memory cache with a time-to-live. Holds decoded catalog
/// responses by default; the rating lookup reuses it for its answers.
pub struct ResponseCache<V = serde_json::Value> {
    entries: Mutex<LruCache<String, Entry<V>>>,
    ttl: Duration,
    enabled: bool,
}

impl<V: Clone> ResponseCache<V> {
    pub fn new(config: &CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl: Duration::from_secs(config.ttl_secs),
            enabled: config.enabled,
        }
    }

    pub fn disabled() -> Self {
        Self::new(&CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        })
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        if !self.enabled {
            return None;
        }
        let mut entries = self.entries.lock().await;
        let expired = match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                debug!("Cache hit for {}", key);
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        None
    }

    /// Store `value`, evicting the least recently used entry when full.
    pub async fn insert(&self, key: String, value: V) {
        if !self.enabled {
            return;
        }
        self.entries.lock().await.put(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

/// Cache key for a request: digest of the path and its parameters in sorted
/// order. Credentials must not be part of `params`.
pub fn cache_key(path: &str, params: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort();

    let query: Vec<String> = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect();

    let mut hasher = Sha256::new();
    hasher.update(path.as_bytes());
    hasher.update(b"?");
    hasher.update(query.join("&").as_bytes());
    hex::encode(hasher.finalize())
}
