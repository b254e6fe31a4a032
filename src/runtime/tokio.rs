//! Tokio timer integration.
//!
//! [`TokioScheduler`] runs timers as tasks on a tokio runtime, so deadlines
//! follow `tokio::time`. Under `#[tokio::test(start_paused = true)]` they
//! follow tokio's paused clock.
//!
//! # Example
//!
//! ```rust,ignore
//! use testkit_expect::runtime::tokio::TokioScheduler;
//!
//! #[tokio::test]
//! async fn test_with_tokio_timers() {
//!     let scheduler = TokioScheduler::current()?;
//!     // Hand to CondVar::builder().scheduler(...)
//! }
//! ```

use std::time::Duration;

use ::tokio::runtime::Handle;
use ::tokio::task::JoinHandle;

use super::{Scheduler, TimerHandle, TimerTask};
use crate::error::{Error, Result};

/// A [`Scheduler`] backed by a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Create a scheduler that spawns onto the given runtime.
    #[must_use]
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Create a scheduler for the runtime the caller is running in.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoScheduler`] when called outside a tokio runtime.
    pub fn current() -> Result<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| Error::no_scheduler(e.to_string()))
    }
}

/// Handle for a timer spawned by [`TokioScheduler`].
#[derive(Debug)]
pub struct TokioTimerHandle {
    inner: JoinHandle<()>,
}

impl TimerHandle for TokioTimerHandle {
    fn cancel(&self) {
        self.inner.abort();
    }

    fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: TimerTask) -> Box<dyn TimerHandle> {
        let inner = self.handle.spawn(async move {
            ::tokio::time::sleep(delay).await;
            task();
        });
        Box::new(TokioTimerHandle { inner })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    fn counting_task(counter: &Arc<AtomicUsize>) -> TimerTask {
        let counter = Arc::clone(counter);
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[::tokio::test(start_paused = true)]
    async fn test_timer_fires_after_delay() {
        let scheduler = TokioScheduler::current().unwrap();
        let fired = Arc::new(AtomicUsize::new(0));

        let handle = scheduler.schedule(Duration::from_millis(50), counting_task(&fired));

        ::tokio::time::sleep(Duration::from_millis(49)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        ::tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(handle.is_finished());
    }

    #[::tokio::test(start_paused = true)]
    async fn test_cancelled_timer_never_fires() {
        let scheduler = TokioScheduler::current().unwrap();
        let fired = Arc::new(AtomicUsize::new(0));

        let handle = scheduler.schedule(Duration::from_millis(50), counting_task(&fired));
        handle.cancel();

        ::tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_current_outside_runtime() {
        assert!(matches!(
            TokioScheduler::current(),
            Err(Error::NoScheduler(_))
        ));
    }
}
