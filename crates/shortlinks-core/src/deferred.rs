use std::future::Future;
use std::pin::Pin;

/// A unit of background work handed to a [`TaskSink`].
///
/// Tasks handle their own errors; by the time one reaches a sink there is
/// nothing left for the sink to report.
pub type DeferredTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Host capability for running work after the primary response.
///
/// When a manager holds a sink, best-effort writes are handed to it instead
/// of being awaited inline. Dropping the caller's future does not cancel
/// work that has already been deferred.
pub trait TaskSink: Send + Sync + 'static {
    fn defer(&self, task: DeferredTask);
}
