//! Condition variables over observed values.
//!
//! A [`CondVar`] watches a stream of values, either pushed with
//! [`check`](CondVar::check) or pulled from an event with
//! [`plug`](CondVar::plug), and fires [`SIGNAL`] on its observable once a
//! value satisfies the armed threshold. Each `expect_*` call arms one
//! threshold and re-checks the last observed value, so an expectation armed
//! after the value arrived still resolves.
//!
//! # Example
//!
//! ```rust
//! use testkit_expect::condvar::CondVar;
//! use testkit_expect::mock::EventBus;
//! use testkit_expect::observable::Observable;
//!
//! let bus = EventBus::<i32>::shared();
//! let cv = CondVar::<i32>::new(bus.clone(), None).unwrap();
//! cv.plug("tick");
//! cv.expect_equal(5, "reached five");
//!
//! for value in [1, 3, 5] {
//!     bus.trigger("tick", &[value]);
//! }
//! assert_eq!(bus.signals(), vec![vec![5]]);
//! ```
//!
//! # Deadlines
//!
//! With a timeout configured, every `expect_*`/`unexpect` call (re)starts a
//! deadline. If the expectation is still pending when it expires, a
//! [`Error::Timeout`] naming the expectation's label is sent to the
//! [`FailureReporter`]. A reporter that [unwinds](FailureReporter::unwinds)
//! would only unwind the timer task, so the failure is held instead and
//! reported by the next `check`, `expect_*`, `unexpect` or `update_check`
//! call, or when the last handle is dropped.
//!
//! # Forbidden values
//!
//! [`unexpect`](CondVar::unexpect) arms a forbidden value. The next checked
//! value resolves it either way: the forbidden value fires [`NOT_SIGNAL`] and
//! reports [`Error::UnexpectedValue`]; any other value fires [`SIGNAL`].

mod builder;
mod config;
mod predicate;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;

use crate::assertions::FailureReporter;
use crate::error::{Error, Result};
use crate::observable::{Observable, Value, NOT_SIGNAL, SIGNAL};
use crate::runtime::{default_scheduler, Scheduler, TimerHandle};

pub use builder::CondVarBuilder;
pub use config::CondVarConfig;
pub use predicate::{PredicateKind, Predicates};

/// A condition variable over values of type `T`.
///
/// Cloning yields another handle to the same state. Event subscriptions and
/// timers hold weak references, so at least one handle must be kept alive
/// for plugged events to be checked.
pub struct CondVar<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    observable: Arc<dyn Observable<T>>,
    scheduler: Option<Arc<dyn Scheduler>>,
    reporter: Arc<dyn FailureReporter>,
    timeout: Option<Duration>,
    debug: AtomicBool,
    state: Mutex<State<T>>,
    /// Deadline failures waiting to be reported on the caller's thread.
    held: Mutex<Vec<Error>>,
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        for failure in std::mem::take(self.held.get_mut()) {
            self.reporter.report(failure);
        }
    }
}

struct State<T> {
    predicates: Predicates<T>,
    not_expect: Option<T>,
    since: Option<String>,
    last_observed: Option<T>,
    deadline: Option<Box<dyn TimerHandle>>,
    /// Bumped on every reset and re-arm; a deadline only fires for the
    /// generation it was armed in.
    generation: u64,
}

impl<T> State<T> {
    fn reset(&mut self) {
        self.predicates.clear();
        self.not_expect = None;
        self.since = None;
        if let Some(deadline) = self.deadline.take() {
            deadline.cancel();
        }
        self.generation += 1;
    }
}

impl<T: Value> CondVar<T> {
    /// Start building a condition variable.
    #[must_use]
    pub fn builder() -> CondVarBuilder<T> {
        CondVarBuilder::new()
    }

    /// Create a condition variable with an optional deadline in milliseconds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoScheduler`] if a deadline is requested outside a
    /// tokio runtime. Use [`CondVar::builder`] to supply a scheduler.
    pub fn new(observable: Arc<dyn Observable<T>>, timeout_ms: Option<u64>) -> Result<Self> {
        Self::builder()
            .observable(observable)
            .timeout_ms(timeout_ms.unwrap_or(0))
            .build()
    }

    pub(crate) fn from_parts(
        observable: Arc<dyn Observable<T>>,
        scheduler: Option<Arc<dyn Scheduler>>,
        reporter: Arc<dyn FailureReporter>,
        config: CondVarConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                observable,
                scheduler,
                reporter,
                timeout: config.timeout,
                debug: AtomicBool::new(config.debug),
                state: Mutex::new(State {
                    predicates: Predicates::default(),
                    not_expect: None,
                    since: None,
                    last_observed: None,
                    deadline: None,
                    generation: 0,
                }),
                held: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Wait for a value strictly below `value`.
    pub fn expect_below(&self, value: T, since: impl Into<String>) {
        self.expect(PredicateKind::Below, value, since);
    }

    /// Wait for a value strictly above `value`.
    pub fn expect_above(&self, value: T, since: impl Into<String>) {
        self.expect(PredicateKind::Above, value, since);
    }

    /// Wait for a value equal to `value`.
    pub fn expect_equal(&self, value: T, since: impl Into<String>) {
        self.expect(PredicateKind::Equal, value, since);
    }

    /// Wait for a value greater than or equal to `value`.
    pub fn expect_equal_or_above(&self, value: T, since: impl Into<String>) {
        self.expect(PredicateKind::EqualOrAbove, value, since);
    }

    /// Wait for a value different from `value`.
    pub fn expect_different(&self, value: T, since: impl Into<String>) {
        self.expect(PredicateKind::Different, value, since);
    }

    /// Arm the `kind` threshold with `value` and re-check.
    ///
    /// Thresholds of other kinds stay armed; any armed threshold resolves
    /// the wait.
    pub fn expect(&self, kind: PredicateKind, value: T, since: impl Into<String>) {
        self.raise_held();
        self.inner.state.lock().predicates.set(kind, value);
        self.update_check(since);
    }

    /// Forbid `value`. The next checked value resolves the expectation.
    pub fn unexpect(&self, value: T, since: impl Into<String>) {
        self.raise_held();
        self.inner.state.lock().not_expect = Some(value);
        self.update_check(since);
    }

    /// Label the pending expectation, re-check the last observed value
    /// against it, and (re)start the deadline.
    pub fn update_check(&self, since: impl Into<String>) {
        self.raise_held();
        let last_observed = {
            let mut state = self.inner.state.lock();
            state.since = Some(since.into());
            state.last_observed.clone()
        };

        if let Some(value) = last_observed {
            tracing::trace!(?value, "re-checking last observed value");
            self.check(value);
        }

        self.arm_deadline();
    }

    /// Observe a value.
    ///
    /// Fires [`SIGNAL`] with the value when any armed threshold matches it,
    /// resetting the condition variable first. Then, if a forbidden value is
    /// armed, resolves it: [`NOT_SIGNAL`] and a reported
    /// [`Error::UnexpectedValue`] when `value` is the forbidden one,
    /// [`SIGNAL`] otherwise.
    pub fn check(&self, value: T) {
        self.raise_held();
        let matched = {
            let mut state = self.inner.state.lock();
            tracing::trace!(since = ?state.since, ?value, "checking value");
            state.last_observed = Some(value.clone());

            let matched = state.predicates.first_match(&value);
            if let Some(predicate) = &matched {
                tracing::debug!(since = ?state.since, %predicate, ?value, "condition satisfied");
                state.reset();
            } else if state.predicates.is_armed() {
                tracing::trace!(mismatch = %state.predicates.describe_mismatch(&value), "condition not satisfied");
            }
            matched.is_some()
        };

        // Locks are released before triggering; handlers re-arm this
        // condition variable.
        if matched {
            self.inner
                .observable
                .trigger(SIGNAL, std::slice::from_ref(&value));
        }

        let forbidden = {
            let mut state = self.inner.state.lock();
            match state.not_expect.take() {
                Some(forbidden) => {
                    let since = state.since.take().unwrap_or_default();
                    state.reset();
                    Some((forbidden, since))
                }
                None => None,
            }
        };
        let Some((forbidden, since)) = forbidden else {
            return;
        };

        if value == forbidden {
            tracing::warn!(%since, ?value, "forbidden value observed");
            self.inner
                .observable
                .trigger(NOT_SIGNAL, &[value.clone(), forbidden.clone()]);
            self.inner.reporter.report(Error::UnexpectedValue {
                since,
                value: format!("{value:?}"),
                forbidden: format!("{forbidden:?}"),
            });
        } else {
            tracing::trace!(%since, ?value, ?forbidden, "forbidden value not observed");
            self.inner
                .observable
                .trigger(SIGNAL, std::slice::from_ref(&value));
        }
    }

    /// Disarm every threshold and the forbidden value, clear the label and
    /// cancel the deadline. The last observed value is kept.
    pub fn reset(&self) {
        self.inner.state.lock().reset();
    }

    /// Check the first argument of every `event` fired on the observable.
    pub fn plug(&self, event: &str) -> &Self {
        self.plug_with(event, |args: &[T]| args.first().cloned())
    }

    /// Check the value `extract` projects from the arguments of every
    /// `event` fired on the observable. `None` skips the check.
    pub fn plug_with<F>(&self, event: &str, extract: F) -> &Self
    where
        F: Fn(&[T]) -> Option<T> + Send + Sync + 'static,
    {
        let weak = Arc::downgrade(&self.inner);
        let name = event.to_string();
        self.inner.observable.subscribe(
            event,
            Arc::new(move |args: &[T]| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let Some(value) = extract(args) else {
                    tracing::trace!(event = %name, "no value in event arguments");
                    return;
                };
                if inner.debug.load(Ordering::Relaxed) {
                    tracing::debug!(event = %name, ?value, "value observed");
                } else {
                    tracing::trace!(event = %name, ?value, "value observed");
                }
                CondVar { inner }.check(value);
            }),
        );
        self
    }

    /// Enable diagnostic output for plugged events.
    pub fn debug(&self) -> &Self {
        self.inner.debug.store(true, Ordering::Relaxed);
        self
    }

    /// An expector that arms `kind` on this condition variable, for use as
    /// an [`ExpectationChain`](crate::chain::ExpectationChain) step.
    pub fn expector(&self, kind: PredicateKind) -> impl Fn(T, &str) + Send + Sync + 'static {
        let condvar = self.clone();
        move |value: T, since: &str| condvar.expect(kind, value, since)
    }

    /// An expector that forbids its value on this condition variable.
    pub fn unexpector(&self) -> impl Fn(T, &str) + Send + Sync + 'static {
        let condvar = self.clone();
        move |value: T, since: &str| condvar.unexpect(value, since)
    }

    /// Label of the pending expectation, if any.
    #[must_use]
    pub fn since(&self) -> Option<String> {
        self.inner.state.lock().since.clone()
    }

    /// Check if an expectation is pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.inner.state.lock().since.is_some()
    }

    /// The most recently checked value.
    #[must_use]
    pub fn last_observed(&self) -> Option<T> {
        self.inner.state.lock().last_observed.clone()
    }

    /// The configured deadline.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.inner.timeout
    }

    /// The observable signals are emitted on.
    #[must_use]
    pub fn observable(&self) -> &Arc<dyn Observable<T>> {
        &self.inner.observable
    }

    fn arm_deadline(&self) {
        let Some(timeout) = self.inner.timeout else {
            return;
        };
        let Some(scheduler) = &self.inner.scheduler else {
            return;
        };

        let mut state = self.inner.state.lock();
        if state.since.is_none() {
            // Resolved by the re-check.
            return;
        }
        if let Some(previous) = state.deadline.take() {
            previous.cancel();
        }
        state.generation += 1;
        let generation = state.generation;

        let weak = Arc::downgrade(&self.inner);
        let handle = scheduler.schedule(
            timeout,
            Box::new(move || Self::expire(&weak, generation, timeout)),
        );
        state.deadline = Some(handle);
    }

    fn expire(inner: &Weak<Inner<T>>, generation: u64, after: Duration) {
        let Some(inner) = inner.upgrade() else {
            return;
        };
        let since = {
            let mut state = inner.state.lock();
            if state.generation != generation {
                return;
            }
            state.deadline = None;
            let Some(since) = state.since.take() else {
                return;
            };
            state.reset();
            since
        };

        tracing::warn!(%since, ?after, "expectation timed out");
        let failure = Error::Timeout { since, after };
        if inner.reporter.unwinds() {
            inner.held.lock().push(failure);
        } else {
            inner.reporter.report(failure);
        }
    }

    fn raise_held(&self) {
        let held = std::mem::take(&mut *self.inner.held.lock());
        for failure in held {
            self.inner.reporter.report(failure);
        }
    }
}

impl<T> CondVar<T>
where
    T: Value + TryInto<u64>,
{
    /// A synthetic signal generator.
    ///
    /// The returned function takes `(value, since)` and, `value`
    /// milliseconds later, fires [`SIGNAL`] with `value`. Values that do not
    /// convert to `u64` fire immediately. Its signature matches a chain
    /// expector, so it can pace an
    /// [`ExpectationChain`](crate::chain::ExpectationChain).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoScheduler`] if no scheduler was configured and no
    /// tokio runtime is running.
    pub fn wait(&self) -> Result<impl Fn(T, &str) + Send + Sync + 'static> {
        let scheduler = match &self.inner.scheduler {
            Some(scheduler) => Arc::clone(scheduler),
            None => default_scheduler()?,
        };
        let observable = Arc::clone(&self.inner.observable);

        Ok(move |value: T, since: &str| {
            let delay = value
                .clone()
                .try_into()
                .map(Duration::from_millis)
                .unwrap_or(Duration::ZERO);
            tracing::trace!(since, ?delay, "wait scheduled");
            let observable = Arc::clone(&observable);
            // Not cancellable; dropping the handle leaves the timer armed.
            let _ = scheduler.schedule(
                delay,
                Box::new(move || {
                    tracing::debug!(?value, "wait done");
                    observable.trigger(SIGNAL, &[value]);
                }),
            );
        })
    }
}

impl<T> Clone for CondVar<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Value> fmt::Debug for CondVar<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("CondVar")
            .field("predicates", &state.predicates)
            .field("not_expect", &state.not_expect)
            .field("since", &state.since)
            .field("last_observed", &state.last_observed)
            .field("timeout", &self.inner.timeout)
            .field("debug", &self.inner.debug.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
