use crate::error::StorageError;
use crate::short_id::ShortId;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A stored short link as kept by a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub short_id: ShortId,
    pub target_url: String,
    pub created_at: Timestamp,
    pub last_accessed_at: Timestamp,
}

/// Durable store of record for short id to target URL mappings.
///
/// Implementations must reject a second insert of the same short id with
/// [`StorageError::Conflict`]; the manager's existence check is not a
/// substitute for that constraint.
#[async_trait]
pub trait LinkBackend: Send + Sync + 'static {
    /// Prepares the backend (e.g. creates tables). Must be idempotent.
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    /// Returns the target URL for `short_id`, or `None` if it is unknown.
    async fn get_target_url(&self, short_id: &ShortId) -> Result<Option<String>>;

    /// Stores a new mapping. Fails with `Conflict` if the id is taken.
    async fn create_short_link(&self, short_id: &ShortId, target_url: &str) -> Result<()>;

    /// Returns the subset of `short_ids` already present in the store.
    async fn check_short_ids_exist(&self, short_ids: &[ShortId]) -> Result<Vec<ShortId>>;

    /// Sets the last accessed time of `short_id` to `at`.
    async fn update_last_access_time(&self, short_id: &ShortId, at: Timestamp) -> Result<()>;

    /// Removes every link not accessed within the last `max_age_days` days.
    async fn clean_unused_links(&self, max_age_days: u32) -> Result<()>;
}
