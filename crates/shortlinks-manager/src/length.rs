use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// The configured short id length shared by every creation attempt.
///
/// The length only ever grows. Growth is a compare-and-swap against the
/// length a round started with, so concurrent creators that exhaust the
/// same length bump it once between them.
#[derive(Debug)]
pub struct ShortIdLength(AtomicUsize);

impl ShortIdLength {
    pub fn new(length: usize) -> Self {
        Self(AtomicUsize::new(length))
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    /// Grows the length from `observed` to `observed + 1`.
    ///
    /// Returns the new length if this call performed the growth, or `None`
    /// if another caller already moved the length past `observed`.
    pub fn grow_from(&self, observed: usize) -> Option<usize> {
        let next = observed.checked_add(1)?;
        self.0
            .compare_exchange(observed, next, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| next)
    }
}

/// Hook notified whenever the manager grows the short id length.
///
/// Hosts use it to persist the new length so the next process starts from
/// it. When the manager has a task sink the notification is deferred;
/// otherwise it is awaited and a failure aborts the creation call.
#[async_trait]
pub trait LengthListener: Send + Sync + 'static {
    async fn on_length_changed(&self, new_length: usize) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLengthListener;

#[async_trait]
impl LengthListener for NoopLengthListener {
    async fn on_length_changed(&self, _new_length: usize) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grow_from_current_length_bumps_by_one() {
        let length = ShortIdLength::new(3);

        assert_eq!(length.grow_from(3), Some(4));
        assert_eq!(length.get(), 4);
    }

    #[test]
    fn grow_from_stale_length_is_a_no_op() {
        let length = ShortIdLength::new(3);
        length.grow_from(3);

        assert_eq!(length.grow_from(3), None);
        assert_eq!(length.get(), 4);
    }

    #[test]
    fn never_overflows() {
        let length = ShortIdLength::new(usize::MAX);

        assert_eq!(length.grow_from(usize::MAX), None);
        assert_eq!(length.get(), usize::MAX);
    }
}
