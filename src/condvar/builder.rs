//! Builder for [`CondVar`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::assertions::{FailureReporter, PanicReporter};
use crate::error::{Error, Result};
use crate::observable::{Observable, Value};
use crate::runtime::{default_scheduler, Scheduler};

use super::{CondVar, CondVarConfig};

/// Builder for [`CondVar`].
///
/// Created by [`CondVar::builder`]. An observable is required; everything
/// else has a default:
///
/// - no deadline
/// - failures are reported with [`PanicReporter`]
/// - timers run on the ambient tokio runtime, resolved only when a deadline
///   is configured or [`CondVar::wait`] is used
///
/// # Example
///
/// ```rust
/// use testkit_expect::clock::MockClock;
/// use testkit_expect::condvar::CondVar;
/// use testkit_expect::mock::EventBus;
/// use testkit_expect::assertions::FailureLog;
///
/// let bus = EventBus::<i32>::shared();
/// let clock = MockClock::new();
/// let failures = FailureLog::new();
///
/// let cv = CondVar::<i32>::builder()
///     .observable(bus)
///     .timeout_ms(50)
///     .scheduler(clock.clone())
///     .reporter(failures.clone())
///     .build()
///     .unwrap();
/// # drop(cv);
/// ```
pub struct CondVarBuilder<T> {
    observable: Option<Arc<dyn Observable<T>>>,
    config: CondVarConfig,
    scheduler: Option<Arc<dyn Scheduler>>,
    reporter: Option<Arc<dyn FailureReporter>>,
}

impl<T: Value> CondVarBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            observable: None,
            config: CondVarConfig::default(),
            scheduler: None,
            reporter: None,
        }
    }

    /// Set the event bus signals are emitted on.
    #[must_use]
    pub fn observable(mut self, observable: Arc<dyn Observable<T>>) -> Self {
        self.observable = Some(observable);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, config: CondVarConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the deadline for pending expectations.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Set the deadline in milliseconds. Zero disables the deadline.
    #[must_use]
    pub fn timeout_ms(mut self, millis: u64) -> Self {
        self.config = self.config.timeout_ms(millis);
        self
    }

    /// Enable diagnostic output for plugged events.
    #[must_use]
    pub fn debug(mut self) -> Self {
        self.config = self.config.debug();
        self
    }

    /// Set the timer source for deadlines and [`CondVar::wait`].
    #[must_use]
    pub fn scheduler(mut self, scheduler: impl Scheduler + 'static) -> Self {
        self.scheduler = Some(Arc::new(scheduler));
        self
    }

    /// Set where assertion failures are sent.
    #[must_use]
    pub fn reporter(mut self, reporter: impl FailureReporter + 'static) -> Self {
        self.reporter = Some(Arc::new(reporter));
        self
    }

    /// Build the condition variable.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingObservable`] if no observable was set.
    /// - [`Error::NoScheduler`] if a deadline is configured, no scheduler was
    ///   set, and no tokio runtime is running.
    pub fn build(self) -> Result<CondVar<T>> {
        let observable = self.observable.ok_or(Error::MissingObservable)?;
        let scheduler = match self.scheduler {
            Some(scheduler) => Some(scheduler),
            None if self.config.timeout.is_some() => Some(default_scheduler()?),
            None => None,
        };
        let reporter = self.reporter.unwrap_or_else(|| Arc::new(PanicReporter));
        Ok(CondVar::from_parts(observable, scheduler, reporter, self.config))
    }
}

impl<T> fmt::Debug for CondVarBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CondVarBuilder")
            .field("has_observable", &self.observable.is_some())
            .field("config", &self.config)
            .field("has_scheduler", &self.scheduler.is_some())
            .field("has_reporter", &self.reporter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use crate::mock::EventBus;

    #[test]
    fn test_missing_observable_is_fatal() {
        let result = CondVar::<i32>::builder().build();
        assert_eq!(result.err(), Some(Error::MissingObservable));
    }

    #[test]
    fn test_no_deadline_needs_no_scheduler() {
        let cv = CondVar::<i32>::builder()
            .observable(EventBus::<i32>::shared())
            .build()
            .unwrap();
        assert_eq!(cv.timeout(), None);
    }

    #[test]
    fn test_deadline_outside_runtime_needs_scheduler() {
        let result = CondVar::<i32>::builder()
            .observable(EventBus::<i32>::shared())
            .timeout_ms(50)
            .build();
        assert!(matches!(result, Err(Error::NoScheduler(_))));
    }

    #[test]
    fn test_explicit_scheduler() {
        let cv = CondVar::<i32>::builder()
            .observable(EventBus::<i32>::shared())
            .timeout_ms(50)
            .scheduler(MockClock::new())
            .build()
            .unwrap();
        assert_eq!(cv.timeout(), Some(Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn test_deadline_inside_runtime_uses_tokio() {
        let result = CondVar::<i32>::builder()
            .observable(EventBus::<i32>::shared())
            .timeout_ms(50)
            .build();
        assert!(result.is_ok());
    }
}
