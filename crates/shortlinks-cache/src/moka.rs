use async_trait::async_trait;
use moka::future::Cache;
use shortlinks_core::cache::{LinkCache, Result};
use shortlinks_core::ShortId;
use std::time::Duration;
use tracing::{debug, trace};
use typed_builder::TypedBuilder;

const DEFAULT_CAPACITY: u64 = 10_000;

/// In-memory [`LinkCache`] backed by Moka.
///
/// Cheap to clone; clones share the same entries.
#[derive(Debug, Clone)]
pub struct MokaLinkCache {
    cache: Cache<String, String>,
}

impl MokaLinkCache {
    /// Creates a cache holding up to 10,000 links with no expiry.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a cache bounded to `max_capacity` links, without expiry.
    ///
    /// # Arguments
    ///
    /// * `max_capacity` - Maximum number of links kept before Moka starts
    ///   evicting
    pub fn with_capacity(max_capacity: u64) -> Self {
        let cache = Cache::builder().max_capacity(max_capacity).build();
        Self { cache }
    }

    /// Creates a cache whose entries expire `ttl` after insertion.
    ///
    /// A link re-warmed by a later lookup gets a fresh `ttl`.
    ///
    /// # Arguments
    ///
    /// * `max_capacity` - Maximum number of links kept
    /// * `ttl` - Time-to-live measured from the last write
    pub fn with_ttl(max_capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();
        Self { cache }
    }

    /// Creates a cache whose entries expire when not read for `tti`.
    ///
    /// # Arguments
    ///
    /// * `max_capacity` - Maximum number of links kept
    /// * `tti` - Time-to-idle measured from the last read or write
    pub fn with_tti(max_capacity: u64, tti: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_idle(tti)
            .build();
        Self { cache }
    }

    /// Returns a builder for a [`CacheConfig`], convertible with `into()`.
    pub fn builder() -> CacheConfigBuilder {
        CacheConfig::builder()
    }
}

impl Default for MokaLinkCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LinkCache for MokaLinkCache {
    fn name(&self) -> &str {
        "moka"
    }

    async fn get(&self, short_id: &ShortId) -> Result<Option<String>> {
        match self.cache.get(short_id.as_str()).await {
            Some(target_url) => {
                debug!(short_id = %short_id, "Cache hit in Moka");
                Ok(Some(target_url))
            }
            None => {
                trace!(short_id = %short_id, "Cache miss in Moka");
                Ok(None)
            }
        }
    }

    async fn set(&self, short_id: &ShortId, target_url: &str) -> Result<()> {
        self.cache
            .insert(short_id.as_str().to_owned(), target_url.to_owned())
            .await;
        trace!(short_id = %short_id, "Cached link in Moka");
        Ok(())
    }
}

/// Settings for a [`MokaLinkCache`]. Unset fields leave Moka's defaults.
#[derive(Debug, TypedBuilder, Default)]
pub struct CacheConfig {
    #[builder(default, setter(strip_option))]
    max_capacity: Option<u64>,
    #[builder(default, setter(strip_option))]
    ttl: Option<Duration>,
    #[builder(default, setter(strip_option))]
    tti: Option<Duration>,
}

impl From<CacheConfig> for MokaLinkCache {
    fn from(config: CacheConfig) -> Self {
        let mut builder = Cache::builder();

        if let Some(capacity) = config.max_capacity {
            builder = builder.max_capacity(capacity);
        }

        if let Some(ttl) = config.ttl {
            builder = builder.time_to_live(ttl);
        }

        if let Some(tti) = config.tti {
            builder = builder.time_to_idle(tti);
        }

        MokaLinkCache {
            cache: builder.build(),
        }
    }
}
