use crate::error::CacheError;
use crate::short_id::ShortId;
use async_trait::async_trait;

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// A best-effort lookup layer consulted before the backend.
///
/// Caches are not authoritative: a value missing from a cache says nothing
/// about the backend, and the manager never stores misses.
#[async_trait]
pub trait LinkCache: Send + Sync + 'static {
    /// Short label used in logs.
    fn name(&self) -> &str {
        "cache"
    }

    /// Prepares the cache before first use. Must be idempotent.
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    /// Get the target URL from cache.
    ///
    /// Returns `Ok(None)` if the key is not in the cache.
    async fn get(&self, short_id: &ShortId) -> Result<Option<String>>;

    /// Store the target URL in cache.
    async fn set(&self, short_id: &ShortId, target_url: &str) -> Result<()>;
}
