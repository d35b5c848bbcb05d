use parking_lot::Mutex;
use shortlinks_core::{DeferredTask, TaskSink};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{trace, warn};

/// A [`TaskSink`] that spawns deferred work onto the current tokio runtime.
///
/// Join handles are kept so the host can [`drain`](Self::drain) outstanding
/// work before shutting down. Must be used from within a tokio runtime.
#[derive(Debug, Clone, Default)]
pub struct TokioTaskSink {
    pending: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl TokioTaskSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of spawned tasks that have not finished yet.
    pub fn pending(&self) -> usize {
        self.pending
            .lock()
            .iter()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    /// Waits for every task deferred so far.
    pub async fn drain(&self) {
        let handles = std::mem::take(&mut *self.pending.lock());
        trace!(tasks = handles.len(), "Draining deferred tasks");

        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Deferred task did not complete");
            }
        }
    }
}

impl TaskSink for TokioTaskSink {
    fn defer(&self, task: DeferredTask) {
        let handle = tokio::spawn(task);
        let mut pending = self.pending.lock();
        pending.retain(|handle| !handle.is_finished());
        pending.push(handle);
    }
}
