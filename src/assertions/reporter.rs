//! Failure reporting.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Error;

/// Receives assertion failures raised by a condition variable.
///
/// Failures are raised from whatever context resolved the expectation: the
/// thread that called `check`, or the timer that hit the deadline.
pub trait FailureReporter: Send + Sync {
    /// Report a failure.
    fn report(&self, failure: Error);

    /// Check if reporting unwinds the calling thread.
    ///
    /// A condition variable holds failures found by its deadline timer for
    /// such reporters and reports them from the caller's next operation, or
    /// when its last handle is dropped.
    fn unwinds(&self) -> bool {
        false
    }
}

impl<F> FailureReporter for F
where
    F: Fn(Error) + Send + Sync,
{
    fn report(&self, failure: Error) {
        self(failure);
    }
}

/// Reports failures by panicking, like `assert!`.
///
/// Deadline failures are raised on the test's own thread: on its next call
/// into the condition variable, or when the condition variable is dropped.
/// Use [`FailureLog`] to inspect them as soon as they happen.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanicReporter;

impl FailureReporter for PanicReporter {
    fn report(&self, failure: Error) {
        panic!("{failure}");
    }

    fn unwinds(&self) -> bool {
        true
    }
}

/// Records failures for later inspection.
///
/// Clones share the same log.
///
/// # Example
///
/// ```rust
/// use testkit_expect::assertions::{FailureLog, FailureReporter};
/// use testkit_expect::Error;
///
/// let log = FailureLog::new();
/// log.report(Error::MissingObservable);
///
/// assert_eq!(log.len(), 1);
/// assert_eq!(log.take(), vec![Error::MissingObservable]);
/// assert!(log.is_empty());
/// ```
#[derive(Clone, Default)]
pub struct FailureLog {
    failures: Arc<Mutex<Vec<Error>>>,
}

impl FailureLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get every recorded failure, oldest first.
    #[must_use]
    pub fn failures(&self) -> Vec<Error> {
        self.failures.lock().clone()
    }

    /// Number of recorded failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.lock().len()
    }

    /// Check if nothing has been reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.lock().is_empty()
    }

    /// Remove and return every recorded failure.
    pub fn take(&self) -> Vec<Error> {
        std::mem::take(&mut *self.failures.lock())
    }

    /// Assert that nothing has been reported.
    ///
    /// # Panics
    ///
    /// Panics listing the recorded failures if there are any.
    pub fn assert_clean(&self) {
        let failures = self.failures.lock();
        assert!(
            failures.is_empty(),
            "expected no failures, got {}: {:?}",
            failures.len(),
            *failures
        );
    }
}

impl FailureReporter for FailureLog {
    fn report(&self, failure: Error) {
        tracing::debug!(%failure, "failure recorded");
        self.failures.lock().push(failure);
    }
}

impl fmt::Debug for FailureLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailureLog")
            .field("failures", &*self.failures.lock())
            .finish()
    }
}
