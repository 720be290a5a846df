use crate::constants::product_cache_key;
use redis::{aio::ConnectionManager, AsyncCommands};
use serde::{de::DeserializeOwned, Serialize};

/// Read-side product cache. Never consulted by the reservation core; every
/// committed stock change invalidates the entry, so stale reads are bounded
/// by the TTL and the authoritative stock check always happens under lock.
#[derive(Clone)]
pub struct ProductCache {
    redis: ConnectionManager,
    ttl_secs: u64,
}

impl ProductCache {
    pub fn new(redis: ConnectionManager, ttl_secs: u64) -> Self {
        Self { redis, ttl_secs }
    }

    /// Cache read. Misses and transport errors both come back as `None`;
    /// the database stays the source of truth either way.
    pub async fn get<T: DeserializeOwned>(&self, product_id: i64) -> Option<T> {
        let key = product_cache_key(product_id);
        let mut conn = self.redis.clone();
        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => Some(value),
                Err(err) => {
                    tracing::warn!("Discarding undecodable cache entry {}: {}", key, err);
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                tracing::warn!("Product cache read failed for {}: {}", key, err);
                None
            }
        }
    }

    pub async fn set<T: Serialize>(&self, product_id: i64, value: &T) {
        if self.ttl_secs == 0 {
            return;
        }
        let key = product_cache_key(product_id);
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!("Failed to encode cache entry {}: {}", key, err);
                return;
            }
        };
        let mut conn = self.redis.clone();
        if let Err(err) = conn.set_ex::<_, _, ()>(&key, raw, self.ttl_secs).await {
            tracing::warn!("Product cache write failed for {}: {}", key, err);
        }
    }

    /// Drop the cached view after a committed stock change.
    pub async fn forget(&self, product_id: i64) {
        let key = product_cache_key(product_id);
        let mut conn = self.redis.clone();
        if let Err(err) = conn.del::<_, ()>(&key).await {
            tracing::warn!("Product cache invalidation failed for {}: {}", key, err);
        }
    }
}
