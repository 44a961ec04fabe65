//! Timed cache for market data responses

use cached::{Cached, TimedCache};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Thread-safe timed cache keyed by request fingerprint
///
/// Keys are `"{endpoint}:{symbol}:{params}"` strings; values are the JSON
/// payloads the tools hand to the model. Entries expire after the TTL.
pub struct MarketCache {
    cache: Arc<RwLock<TimedCache<String, Value>>>,
}

impl MarketCache {
    /// Create a cache with the given entry lifetime
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// Build a cache key from its parts
    pub fn key(endpoint: &str, symbol: &str, params: &str) -> String {
        format!("{endpoint}:{symbol}:{params}")
    }

    /// Get a cached value
    pub async fn get(&self, key: &str) -> Option<Value> {
        let mut cache = self.cache.write().await;
        cache.cache_get(key).cloned()
    }

    /// Insert a value
    pub async fn insert(&self, key: String, value: Value) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(key, value);
    }

    /// Return the cached value or run the fetcher and cache its result
    pub async fn get_or_fetch<F, Fut, E>(&self, key: String, fetcher: F) -> Result<Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Value, E>>,
    {
        if let Some(value) = self.get(&key).await {
            tracing::debug!(%key, "cache hit");
            return Ok(value);
        }

        let value = fetcher().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }

    /// Number of live entries
    pub async fn len(&self) -> usize {
        self.cache.read().await.cache_size()
    }

    /// Whether the cache holds no entries
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Clone for MarketCache {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_or_fetch_caches_result() {
        let cache = MarketCache::new(Duration::from_secs(60));
        let key = MarketCache::key("close", "AAPL", "2024-05-10");

        let value = cache
            .get_or_fetch::<_, _, std::convert::Infallible>(key.clone(), || async {
                Ok(json!({"close": 187.5}))
            })
            .await
            .unwrap();
        assert_eq!(value["close"], 187.5);

        // Second lookup must not run the fetcher
        let cached = cache
            .get_or_fetch::<_, _, std::convert::Infallible>(key, || async {
                panic!("fetcher should not run on a warm cache")
            })
            .await
            .unwrap();
        assert_eq!(cached["close"], 187.5);
    }
}
