/// Application constants

// Hold lifecycle
pub const DEFAULT_HOLD_TTL_SECS: u64 = 120; // 2 minutes
pub const DEFAULT_SWEEPER_INTERVAL_SECS: u64 = 30; // keep at or under HOLD_TTL / 2

// Product cache
pub const DEFAULT_PRODUCT_CACHE_TTL_SECS: u64 = 300; // 5 minutes
pub const PRODUCT_CACHE_KEY_PREFIX: &str = "product:";

// Webhook intake
pub const MAX_IDEMPOTENCY_KEY_LEN: usize = 255;

// Bounded retry for deadlocked stock transactions
pub const DEFAULT_LOCK_RETRY_ATTEMPTS: u32 = 3;

// API version
pub const API_VERSION: &str = "v1";

/// Redis key for a cached product view.
pub fn product_cache_key(product_id: i64) -> String {
    format!("{}{}", PRODUCT_CACHE_KEY_PREFIX, product_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_cache_key_includes_id() {
        assert_eq!(product_cache_key(42), "product:42");
    }

    #[test]
    fn sweeper_interval_is_at_most_half_the_ttl() {
        assert!(DEFAULT_SWEEPER_INTERVAL_SECS <= DEFAULT_HOLD_TTL_SECS / 2);
    }
}
