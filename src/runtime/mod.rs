//! Runtime-agnostic timer abstractions.
//!
//! Condition variables need two kinds of timers: the deadline that turns an
//! unresolved expectation into a failure, and the synthetic delay behind
//! [`CondVar::wait`](crate::condvar::CondVar::wait). Both go through
//! [`Scheduler`], so the same code runs against real time or virtual time.
//!
//! # Implementations
//!
//! - [`MockClock`](crate::clock::MockClock) - Virtual time, fired by `advance`
//! - [`TokioScheduler`](crate::runtime::tokio::TokioScheduler) - Real tokio time
//!   (with `tokio` feature)
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::time::Duration;
//! use testkit_expect::clock::MockClock;
//! use testkit_expect::runtime::Scheduler;
//!
//! let clock = MockClock::new();
//! let fired = Arc::new(AtomicBool::new(false));
//! let flag = Arc::clone(&fired);
//! let _handle = clock.schedule(
//!     Duration::from_millis(10),
//!     Box::new(move || flag.store(true, Ordering::SeqCst)),
//! );
//!
//! clock.advance(Duration::from_millis(10));
//! assert!(fired.load(Ordering::SeqCst));
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;

/// A callback run once when its timer expires.
pub type TimerTask = Box<dyn FnOnce() + Send + 'static>;

/// A handle to a scheduled timer.
///
/// Dropping the handle does not cancel the timer.
pub trait TimerHandle: Send + Sync {
    /// Cancel the timer. Has no effect once the timer has fired.
    fn cancel(&self);

    /// Check if the timer has fired or been cancelled.
    fn is_finished(&self) -> bool;
}

/// A source of one-shot timers.
pub trait Scheduler: Send + Sync {
    /// Run `task` once `delay` has elapsed.
    fn schedule(&self, delay: Duration, task: TimerTask) -> Box<dyn TimerHandle>;
}

impl<S: Scheduler + ?Sized> Scheduler for Arc<S> {
    fn schedule(&self, delay: Duration, task: TimerTask) -> Box<dyn TimerHandle> {
        (**self).schedule(delay, task)
    }
}

/// Resolve the scheduler to use when none was configured explicitly.
///
/// With the `tokio` feature this is the ambient tokio runtime.
///
/// # Errors
///
/// Returns [`Error::NoScheduler`](crate::Error::NoScheduler) when no runtime
/// is available.
pub fn default_scheduler() -> Result<Arc<dyn Scheduler>> {
    #[cfg(feature = "tokio")]
    {
        let scheduler = tokio::TokioScheduler::current()?;
        Ok(Arc::new(scheduler))
    }
    #[cfg(not(feature = "tokio"))]
    {
        Err(crate::Error::no_scheduler(
            "no scheduler configured and the `tokio` feature is disabled",
        ))
    }
}

#[cfg(feature = "tokio")]
pub mod tokio;

#[cfg(all(test, feature = "tokio"))]
mod tests {
    use super::default_scheduler;

    #[test]
    fn test_default_scheduler_outside_runtime_fails() {
        let err = default_scheduler().err();
        assert!(matches!(err, Some(crate::Error::NoScheduler(_))));
    }

    #[tokio::test]
    async fn test_default_scheduler_inside_runtime() {
        assert!(default_scheduler().is_ok());
    }
}
