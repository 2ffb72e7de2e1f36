use async_trait::async_trait;
use std::time::Duration;

/// Read-through cache port, used by the API layer for the post listing.
/// Correctness never depends on it: a miss falls back to the store.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Get a cached value, or `None` on miss/expiry.
    async fn get(&self, key: &str) -> Option<String>;

    /// Store a value for at most `ttl`.
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Drop a key. Dropping an absent key is not an error.
    async fn invalidate(&self, key: &str) -> Result<(), CacheError>;
}

/// Cache operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Operation failed: {0}")]
    Operation(String),
}
