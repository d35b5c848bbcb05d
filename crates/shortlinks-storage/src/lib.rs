pub mod memory;
pub mod sqlite;

pub use memory::InMemoryBackend;
pub use shortlinks_core::{LinkBackend, LinkRecord, StorageError};
pub use sqlite::SqliteBackend;

use jiff::{SignedDuration, Timestamp};

/// Oldest last-access time a link may have and still survive a cleanup run
/// with the given `max_age_days`.
pub(crate) fn cleanup_cutoff(now: Timestamp, max_age_days: u32) -> Timestamp {
    now.checked_sub(SignedDuration::from_hours(i64::from(max_age_days) * 24))
        .unwrap_or(Timestamp::MIN)
}
