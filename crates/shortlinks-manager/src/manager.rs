use crate::length::{LengthListener, ShortIdLength};
use crate::settings::ManagerSettings;
use jiff::Timestamp;
use shortlinks_core::{CacheError, LinkBackend, LinkCache, ManagerError, ShortId, TaskSink};
use shortlinks_generator::{Generator, RandomGenerator};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, trace, warn};

type Result<T> = std::result::Result<T, ManagerError>;

/// A cache together with its lazy-initialisation state.
struct CacheSlot {
    cache: Arc<dyn LinkCache>,
    initialised: OnceCell<()>,
}

impl CacheSlot {
    fn new(cache: Arc<dyn LinkCache>) -> Self {
        Self {
            cache,
            initialised: OnceCell::new(),
        }
    }

    fn name(&self) -> &str {
        self.cache.name()
    }

    /// Runs `init` on first use. A failed init is retried next time.
    async fn ready(&self) -> std::result::Result<(), CacheError> {
        self.initialised
            .get_or_try_init(|| self.cache.init())
            .await
            .map(|_| ())
    }

    async fn get(&self, short_id: &ShortId) -> std::result::Result<Option<String>, CacheError> {
        self.ready().await?;
        self.cache.get(short_id).await
    }

    async fn set(&self, short_id: &ShortId, target_url: &str) -> std::result::Result<(), CacheError> {
        self.ready().await?;
        self.cache.set(short_id, target_url).await
    }
}

/// Issues and resolves short links.
///
/// - **Create**: generate a batch of candidates at the current length, ask
///   the backend which already exist, take the first free one. A fully
///   colliding batch grows the length by one and tries again, up to the
///   configured number of rounds.
/// - **Resolve**: walk the caches in order, stop at the first hit, fall
///   back to the backend. A found value refreshes the access time and is
///   written to every cache; misses are never cached.
///
/// Cache faults are logged and skipped so an unavailable cache never makes
/// a link unresolvable. Backend faults are returned unchanged.
pub struct LinkManager<B, G = RandomGenerator> {
    backend: Arc<B>,
    generator: G,
    caches: Vec<Arc<CacheSlot>>,
    length: ShortIdLength,
    listener: Arc<dyn LengthListener>,
    task_sink: Option<Arc<dyn TaskSink>>,
    rounds: usize,
    batch_size: usize,
    update_last_access_on_get: bool,
}

impl<B: LinkBackend> LinkManager<B, RandomGenerator> {
    /// Creates a manager drawing random ids from the full alphabet.
    pub async fn with_random_ids(backend: B, settings: ManagerSettings) -> Result<Self> {
        Self::new(backend, RandomGenerator::new(), settings).await
    }
}

impl<B: LinkBackend, G: Generator> LinkManager<B, G> {
    /// Creates a manager, initialising the backend first.
    ///
    /// Fails with [`ManagerError::InvalidSettings`] before touching the
    /// backend if the initial length or the batch size is zero.
    pub async fn new(backend: B, generator: G, settings: ManagerSettings) -> Result<Self> {
        if settings.short_id_length == 0 {
            return Err(ManagerError::InvalidSettings(
                "short id length must be at least 1".to_string(),
            ));
        }
        if settings.batch_size == 0 {
            return Err(ManagerError::InvalidSettings(
                "batch size must be at least 1".to_string(),
            ));
        }

        backend.init().await?;

        Ok(Self {
            backend: Arc::new(backend),
            generator,
            caches: settings
                .caches
                .into_iter()
                .map(|cache| Arc::new(CacheSlot::new(cache)))
                .collect(),
            length: ShortIdLength::new(settings.short_id_length),
            listener: settings.listener,
            task_sink: settings.task_sink,
            rounds: settings.rounds,
            batch_size: settings.batch_size,
            update_last_access_on_get: settings.update_last_access_on_get,
        })
    }

    /// Current length of newly generated ids.
    pub fn short_id_length(&self) -> usize {
        self.length.get()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Allocates a fresh short id for `target_url` and stores the mapping.
    ///
    /// The returned id was absent from the backend when checked. A
    /// concurrent creator may still claim it before the insert; the
    /// backend's conflict error is returned as is in that case.
    pub async fn create_short_link(&self, target_url: impl Into<String>) -> Result<ShortId> {
        let target_url = target_url.into();

        for round in 0..self.rounds {
            let length = self.length.get();
            let candidates = self.generator.generate_batch(self.batch_size, length);
            trace!(round, length, candidates = candidates.len(), "Checking candidate ids");

            let existing: HashSet<ShortId> = if candidates.is_empty() {
                HashSet::new()
            } else {
                self.backend
                    .check_short_ids_exist(&candidates)
                    .await?
                    .into_iter()
                    .collect()
            };

            if let Some(short_id) = candidates.into_iter().find(|id| !existing.contains(id)) {
                self.backend
                    .create_short_link(&short_id, &target_url)
                    .await?;
                info!(short_id = %short_id, round, "Created short link");
                return Ok(short_id);
            }

            match self.length.grow_from(length) {
                Some(new_length) => {
                    warn!(round, new_length, "All candidate ids taken, growing short id length");
                    let listener = Arc::clone(&self.listener);
                    self.run_or_defer("length_changed", async move {
                        listener
                            .on_length_changed(new_length)
                            .await
                            .map_err(|e| ManagerError::LengthListener(format!("{e:#}")))
                    })
                    .await?;
                }
                None => {
                    debug!(round, length, "Short id length already grown by another caller");
                }
            }
        }

        Err(ManagerError::Exhausted {
            rounds: self.rounds,
            length: self.length.get(),
        })
    }

    /// Resolves `short_id` to its target URL.
    ///
    /// Returns `Ok(None)` if neither a cache nor the backend knows the id.
    pub async fn get_target_url(&self, short_id: &ShortId) -> Result<Option<String>> {
        let mut target_url = None;

        for slot in &self.caches {
            match slot.get(short_id).await {
                Ok(Some(url)) => {
                    debug!(short_id = %short_id, cache = slot.name(), "Cache hit");
                    target_url = Some(url);
                    break;
                }
                Ok(None) => {
                    trace!(short_id = %short_id, cache = slot.name(), "Cache miss");
                }
                Err(e) => {
                    warn!(short_id = %short_id, cache = slot.name(), error = %e, "Cache lookup failed, skipping");
                }
            }
        }

        let target_url = match target_url {
            Some(url) => url,
            None => match self.backend.get_target_url(short_id).await? {
                Some(url) => url,
                None => {
                    trace!(short_id = %short_id, "Short id not found");
                    return Ok(None);
                }
            },
        };

        if self.update_last_access_on_get {
            let backend = Arc::clone(&self.backend);
            let id = short_id.clone();
            let now = Timestamp::now();
            self.run_or_defer("refresh_last_access", async move {
                backend
                    .update_last_access_time(&id, now)
                    .await
                    .map_err(ManagerError::from)
            })
            .await?;
        }

        for slot in &self.caches {
            let slot = Arc::clone(slot);
            let id = short_id.clone();
            let url = target_url.clone();
            self.run_or_defer("warm_cache", async move {
                if let Err(e) = slot.set(&id, &url).await {
                    warn!(short_id = %id, cache = slot.name(), error = %e, "Cache write failed");
                }
                Ok(())
            })
            .await?;
        }

        Ok(Some(target_url))
    }

    /// Marks `short_id` as accessed now.
    pub async fn update_short_link_last_access_time(&self, short_id: &ShortId) -> Result<()> {
        self.update_short_link_last_access_time_at(short_id, Timestamp::now())
            .await
    }

    /// Marks `short_id` as accessed at `at`.
    pub async fn update_short_link_last_access_time_at(
        &self,
        short_id: &ShortId,
        at: Timestamp,
    ) -> Result<()> {
        Ok(self.backend.update_last_access_time(short_id, at).await?)
    }

    /// Removes links not accessed within the last `max_age_days` days.
    pub async fn clean_unused_links(&self, max_age_days: u32) -> Result<()> {
        Ok(self.backend.clean_unused_links(max_age_days).await?)
    }

    /// Hands `work` to the task sink if there is one, otherwise awaits it.
    ///
    /// Deferred failures can no longer reach the caller, so they are logged.
    async fn run_or_defer<F>(&self, task: &'static str, work: F) -> Result<()>
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        match &self.task_sink {
            Some(sink) => {
                trace!(task, "Deferring task");
                sink.defer(Box::pin(async move {
                    if let Err(e) = work.await {
                        warn!(task, error = %e, "Deferred task failed");
                    }
                }));
                Ok(())
            }
            None => work.await,
        }
    }
}
