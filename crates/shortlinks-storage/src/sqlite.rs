use crate::cleanup_cutoff;
use async_trait::async_trait;
use jiff::Timestamp;
use shortlinks_core::backend::{LinkBackend, LinkRecord, Result};
use shortlinks_core::{ShortId, StorageError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use sqlx::{QueryBuilder, Row, Sqlite};
use std::str::FromStr;
use tracing::{debug, info};

/// SQLite's historical bound on host parameters per statement.
const MAX_BINDS_PER_QUERY: usize = 999;

/// SQLite implementation of [`LinkBackend`].
///
/// Links live in `sl_links_map`. Timestamps are stored as unix seconds and
/// `last_accessed_at` is indexed for cleanup scans.
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    /// Creates a backend from an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a pool for `database_url`, creating the database file if needed.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| StorageError::Initialization(e.to_string()))?
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the links table and its index if they are missing.
    pub async fn setup_tables(&self) -> Result<()> {
        sqlx::raw_sql(include_str!("../ddl/sqlite/sl_links_map.sql"))
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Initialization(e.to_string()))?;
        info!("SQLite link tables ready");
        Ok(())
    }

    /// Returns the full stored record for `short_id`.
    pub async fn record(&self, short_id: &ShortId) -> Result<Option<LinkRecord>> {
        let row = sqlx::query(
            r#"
            SELECT target_url, created_at, last_accessed_at
            FROM sl_links_map
            WHERE short_id = ?
            LIMIT 1
            "#,
        )
        .bind(short_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let target_url: String = row.try_get("target_url").map_err(map_sqlx_error)?;
        let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;
        let last_accessed_at: i64 = row.try_get("last_accessed_at").map_err(map_sqlx_error)?;

        Ok(Some(LinkRecord {
            short_id: short_id.clone(),
            target_url,
            created_at: parse_timestamp("created_at", created_at)?,
            last_accessed_at: parse_timestamp("last_accessed_at", last_accessed_at)?,
        }))
    }
}

fn parse_timestamp(column: &str, seconds: i64) -> Result<Timestamp> {
    Timestamp::from_second(seconds).map_err(|e| {
        StorageError::InvalidData(format!("invalid {column} timestamp '{seconds}': {e}"))
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl LinkBackend for SqliteBackend {
    async fn init(&self) -> Result<()> {
        self.setup_tables().await
    }

    async fn get_target_url(&self, short_id: &ShortId) -> Result<Option<String>> {
        let row = sqlx::query("SELECT target_url FROM sl_links_map WHERE short_id = ? LIMIT 1")
            .bind(short_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(|row| row.try_get::<String, _>("target_url").map_err(map_sqlx_error))
            .transpose()
    }

    async fn create_short_link(&self, short_id: &ShortId, target_url: &str) -> Result<()> {
        let now = Timestamp::now().as_second();

        let result = sqlx::query(
            r#"
            INSERT INTO sl_links_map (short_id, target_url, created_at, last_accessed_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(short_id.as_str())
        .bind(target_url)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(short_id.to_string()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn check_short_ids_exist(&self, short_ids: &[ShortId]) -> Result<Vec<ShortId>> {
        let mut existing = Vec::new();

        for chunk in short_ids.chunks(MAX_BINDS_PER_QUERY) {
            let mut builder =
                QueryBuilder::<Sqlite>::new("SELECT short_id FROM sl_links_map WHERE short_id IN (");
            let mut separated = builder.separated(", ");
            for short_id in chunk {
                separated.push_bind(short_id.as_str().to_owned());
            }
            separated.push_unseparated(")");

            let rows = builder
                .build()
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

            for row in rows {
                let short_id: String = row.try_get("short_id").map_err(map_sqlx_error)?;
                existing.push(ShortId::new_unchecked(short_id));
            }
        }

        Ok(existing)
    }

    async fn update_last_access_time(&self, short_id: &ShortId, at: Timestamp) -> Result<()> {
        sqlx::query("UPDATE sl_links_map SET last_accessed_at = ? WHERE short_id = ?")
            .bind(at.as_second())
            .bind(short_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn clean_unused_links(&self, max_age_days: u32) -> Result<()> {
        let cutoff = cleanup_cutoff(Timestamp::now(), max_age_days);

        let result = sqlx::query("DELETE FROM sl_links_map WHERE last_accessed_at < ?")
            .bind(cutoff.as_second())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        debug!(removed = result.rows_affected(), max_age_days, "Cleaned unused links");
        Ok(())
    }
}
