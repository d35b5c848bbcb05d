use crate::cleanup_cutoff;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use jiff::Timestamp;
use shortlinks_core::backend::{LinkBackend, LinkRecord, Result};
use shortlinks_core::{ShortId, StorageError};
use tracing::debug;

#[derive(Debug, Clone)]
struct Entry {
    target_url: String,
    created_at: Timestamp,
    last_accessed_at: Timestamp,
}

/// In-memory [`LinkBackend`] over a [`DashMap`].
///
/// Nothing survives the process. Useful for tests and for hosts that only
/// need short-lived links.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    storage: DashMap<ShortId, Entry>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: DashMap::with_capacity(capacity),
        }
    }

    /// Returns the full stored record for `short_id`.
    pub fn record(&self, short_id: &ShortId) -> Option<LinkRecord> {
        self.storage.get(short_id).map(|entry| LinkRecord {
            short_id: short_id.clone(),
            target_url: entry.target_url.clone(),
            created_at: entry.created_at,
            last_accessed_at: entry.last_accessed_at,
        })
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[async_trait]
impl LinkBackend for InMemoryBackend {
    async fn get_target_url(&self, short_id: &ShortId) -> Result<Option<String>> {
        Ok(self
            .storage
            .get(short_id)
            .map(|entry| entry.target_url.clone()))
    }

    async fn create_short_link(&self, short_id: &ShortId, target_url: &str) -> Result<()> {
        match self.storage.entry(short_id.clone()) {
            MapEntry::Occupied(_) => Err(StorageError::Conflict(short_id.to_string())),
            MapEntry::Vacant(slot) => {
                let now = Timestamp::now();
                slot.insert(Entry {
                    target_url: target_url.to_owned(),
                    created_at: now,
                    last_accessed_at: now,
                });
                Ok(())
            }
        }
    }

    async fn check_short_ids_exist(&self, short_ids: &[ShortId]) -> Result<Vec<ShortId>> {
        Ok(short_ids
            .iter()
            .filter(|id| self.storage.contains_key(*id))
            .cloned()
            .collect())
    }

    async fn update_last_access_time(&self, short_id: &ShortId, at: Timestamp) -> Result<()> {
        if let Some(mut entry) = self.storage.get_mut(short_id) {
            entry.last_accessed_at = at;
        }
        Ok(())
    }

    async fn clean_unused_links(&self, max_age_days: u32) -> Result<()> {
        let cutoff = cleanup_cutoff(Timestamp::now(), max_age_days);
        let before = self.storage.len();
        self.storage
            .retain(|_, entry| entry.last_accessed_at >= cutoff);
        debug!(
            removed = before.saturating_sub(self.storage.len()),
            max_age_days, "Cleaned unused links"
        );
        Ok(())
    }
}
