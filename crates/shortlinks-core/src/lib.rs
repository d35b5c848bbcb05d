//! Core types and traits for the short links manager.
//!
//! This crate holds the pieces shared by the manager and every adapter:
//! the [`ShortId`] key type, the error taxonomy, and the contracts a
//! durable backend, a cache, and a deferred-task sink must implement.

pub mod backend;
pub mod cache;
pub mod deferred;
pub mod error;
pub mod short_id;

pub use backend::{LinkBackend, LinkRecord};
pub use cache::LinkCache;
pub use deferred::{DeferredTask, TaskSink};
pub use error::{CacheError, CoreError, ManagerError, StorageError};
pub use short_id::{ShortId, ALPHABET};
