//! [`LinkCache`](shortlinks_core::LinkCache) adapters.
//!
//! - [`MokaLinkCache`]: in-process, bounded, optionally expiring.
//! - [`RedisLinkCache`]: shared across processes, values stored as plain
//!   strings under a key prefix.

pub mod moka;
pub mod redis;

pub use self::moka::{CacheConfig, MokaLinkCache};
pub use self::redis::RedisLinkCache;
