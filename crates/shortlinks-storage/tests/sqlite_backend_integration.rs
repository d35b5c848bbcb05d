use jiff::{SignedDuration, Timestamp};
use shortlinks_core::ShortId;
use shortlinks_storage::{LinkBackend, SqliteBackend, StorageError};
use sqlx::sqlite::SqlitePoolOptions;
use tempfile::TempDir;

struct Fixture {
    backend: SqliteBackend,
}

impl Fixture {
    /// A private in-memory database. One connection, kept open, so every
    /// query sees the same database.
    async fn start() -> Self {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("open sqlite");

        let backend = SqliteBackend::new(pool);
        backend.init().await.expect("create schema");

        Self { backend }
    }
}

fn id(value: &str) -> ShortId {
    ShortId::new_unchecked(value)
}

fn days_ago(days: i64) -> Timestamp {
    Timestamp::now() - SignedDuration::from_hours(days * 24)
}

#[tokio::test]
async fn create_and_get_link() {
    let fixture = Fixture::start().await;

    fixture
        .backend
        .create_short_link(&id("abc"), "https://poto.nz")
        .await
        .unwrap();

    let got = fixture.backend.get_target_url(&id("abc")).await.unwrap();
    assert_eq!(got.as_deref(), Some("https://poto.nz"));
}

#[tokio::test]
async fn get_missing_link_returns_none() {
    let fixture = Fixture::start().await;

    let got = fixture
        .backend
        .get_target_url(&id("does-not-exist"))
        .await
        .unwrap();
    assert!(got.is_none());
}

#[tokio::test]
async fn init_is_idempotent() {
    let fixture = Fixture::start().await;
    fixture
        .backend
        .create_short_link(&id("abc"), "https://poto.nz")
        .await
        .unwrap();

    fixture.backend.init().await.unwrap();

    assert!(fixture
        .backend
        .get_target_url(&id("abc"))
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn duplicate_create_conflicts() {
    let fixture = Fixture::start().await;
    fixture
        .backend
        .create_short_link(&id("abc"), "https://one.example")
        .await
        .unwrap();

    let err = fixture
        .backend
        .create_short_link(&id("abc"), "https://two.example")
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Conflict(_)));
}

#[tokio::test]
async fn check_exist_returns_stored_subset() {
    let fixture = Fixture::start().await;
    for name in ["a", "c"] {
        fixture
            .backend
            .create_short_link(&id(name), "https://poto.nz")
            .await
            .unwrap();
    }

    let mut existing = fixture
        .backend
        .check_short_ids_exist(&[id("a"), id("b"), id("c")])
        .await
        .unwrap();
    existing.sort();

    assert_eq!(existing, vec![id("a"), id("c")]);
}

#[tokio::test]
async fn check_exist_with_no_ids_returns_empty() {
    let fixture = Fixture::start().await;

    let existing = fixture.backend.check_short_ids_exist(&[]).await.unwrap();

    assert!(existing.is_empty());
}

#[tokio::test]
async fn check_exist_handles_more_ids_than_one_statement_binds() {
    let fixture = Fixture::start().await;
    fixture
        .backend
        .create_short_link(&id("k1500"), "https://poto.nz")
        .await
        .unwrap();

    let candidates: Vec<ShortId> = (0..2000).map(|n| id(&format!("k{n}"))).collect();
    let existing = fixture
        .backend
        .check_short_ids_exist(&candidates)
        .await
        .unwrap();

    assert_eq!(existing, vec![id("k1500")]);
}

#[tokio::test]
async fn create_stores_timestamps_and_touch_updates_them() {
    let fixture = Fixture::start().await;
    fixture
        .backend
        .create_short_link(&id("abc"), "https://poto.nz")
        .await
        .unwrap();

    let created = fixture.backend.record(&id("abc")).await.unwrap().unwrap();
    assert_eq!(created.created_at, created.last_accessed_at);

    let later = Timestamp::from_second(created.created_at.as_second() + 3600).unwrap();
    fixture
        .backend
        .update_last_access_time(&id("abc"), later)
        .await
        .unwrap();

    let touched = fixture.backend.record(&id("abc")).await.unwrap().unwrap();
    assert_eq!(touched.created_at, created.created_at);
    assert_eq!(touched.last_accessed_at, later);
}

#[tokio::test]
async fn clean_deletes_links_older_than_max_age() {
    let fixture = Fixture::start().await;
    for name in ["old", "recent", "fresh"] {
        fixture
            .backend
            .create_short_link(&id(name), "https://poto.nz")
            .await
            .unwrap();
    }
    fixture
        .backend
        .update_last_access_time(&id("old"), days_ago(90))
        .await
        .unwrap();
    fixture
        .backend
        .update_last_access_time(&id("recent"), days_ago(5))
        .await
        .unwrap();

    fixture.backend.clean_unused_links(30).await.unwrap();

    assert!(fixture.backend.get_target_url(&id("old")).await.unwrap().is_none());
    assert!(fixture.backend.get_target_url(&id("recent")).await.unwrap().is_some());
    assert!(fixture.backend.get_target_url(&id("fresh")).await.unwrap().is_some());
}

#[tokio::test]
async fn connect_creates_database_file() {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite://{}", dir.path().join("links.db").display());

    let backend = SqliteBackend::connect(&url).await.unwrap();
    backend.init().await.unwrap();
    backend
        .create_short_link(&id("abc"), "https://poto.nz")
        .await
        .unwrap();
    backend.pool().close().await;

    let reopened = SqliteBackend::connect(&url).await.unwrap();
    assert_eq!(
        reopened.get_target_url(&id("abc")).await.unwrap().as_deref(),
        Some("https://poto.nz")
    );
    reopened.pool().close().await;
}
