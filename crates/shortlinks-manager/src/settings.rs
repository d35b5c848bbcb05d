use crate::length::{LengthListener, NoopLengthListener};
use shortlinks_core::{LinkCache, TaskSink};
use std::sync::Arc;
use typed_builder::TypedBuilder;

/// Configuration for a [`LinkManager`](crate::LinkManager).
///
/// # Example
///
/// ```rust
/// use shortlinks_manager::ManagerSettings;
///
/// let settings = ManagerSettings::builder()
///     .short_id_length(3)
///     .rounds(10)
///     .update_last_access_on_get(false)
///     .build();
/// ```
#[derive(TypedBuilder)]
pub struct ManagerSettings {
    /// Length of ids generated until the namespace fills up.
    pub short_id_length: usize,

    /// Creation rounds attempted before giving up.
    #[builder(default = 3)]
    pub rounds: usize,

    /// Candidate ids generated per round.
    #[builder(default = 50)]
    pub batch_size: usize,

    /// Refresh the backend's last accessed time on every resolved lookup.
    #[builder(default = true)]
    pub update_last_access_on_get: bool,

    /// Caches consulted in order before the backend.
    #[builder(default)]
    pub caches: Vec<Arc<dyn LinkCache>>,

    /// Notified when the short id length grows.
    #[builder(default = Arc::new(NoopLengthListener) as Arc<dyn LengthListener>)]
    pub listener: Arc<dyn LengthListener>,

    /// Where best-effort work goes. `None` awaits it inline.
    #[builder(default, setter(strip_option))]
    pub task_sink: Option<Arc<dyn TaskSink>>,
}

impl std::fmt::Debug for ManagerSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagerSettings")
            .field("short_id_length", &self.short_id_length)
            .field("rounds", &self.rounds)
            .field("batch_size", &self.batch_size)
            .field("update_last_access_on_get", &self.update_last_access_on_get)
            .field("caches", &self.caches.len())
            .field("task_sink", &self.task_sink.is_some())
            .finish_non_exhaustive()
    }
}
