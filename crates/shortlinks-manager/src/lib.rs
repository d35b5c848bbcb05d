//! Short link allocation and resolution.
//!
//! [`LinkManager`] issues collision-free short ids, growing the id length
//! when the namespace fills up, and resolves ids through an ordered chain
//! of caches before falling back to the backend. Best-effort writes
//! (cache warming, access-time refresh, length-change notifications) are
//! handed to a [`TaskSink`](shortlinks_core::TaskSink) when the host
//! provides one and awaited inline otherwise.
//!
//! # Example
//!
//! ```rust
//! use shortlinks_cache::MokaLinkCache;
//! use shortlinks_core::LinkCache;
//! use shortlinks_manager::{LinkManager, ManagerSettings};
//! use shortlinks_storage::InMemoryBackend;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = ManagerSettings::builder()
//!     .short_id_length(4)
//!     .caches(vec![Arc::new(MokaLinkCache::new()) as Arc<dyn LinkCache>])
//!     .build();
//! let manager = LinkManager::with_random_ids(InMemoryBackend::new(), settings).await?;
//!
//! let id = manager.create_short_link("https://poto.nz").await?;
//! assert_eq!(
//!     manager.get_target_url(&id).await?.as_deref(),
//!     Some("https://poto.nz")
//! );
//! # Ok(())
//! # }
//! ```

pub mod deferred;
pub mod length;
pub mod manager;
pub mod settings;

pub use deferred::TokioTaskSink;
pub use length::{LengthListener, NoopLengthListener, ShortIdLength};
pub use manager::LinkManager;
pub use settings::ManagerSettings;
