//! Ordered expectation chains.
//!
//! An [`ExpectationChain`] holds a FIFO queue of [`Step`]s and listens for
//! [`SIGNAL`] and [`NOT_SIGNAL`] on its observable. Every [`SIGNAL`]
//! dispatches the next step: its expector arms a new wait (typically on a
//! [`CondVar`](crate::condvar::CondVar) sharing the observable), then its
//! action, if any, drives the system under test. A [`SIGNAL`] arriving with
//! the queue drained runs the finalizer. [`NOT_SIGNAL`] aborts: the finalizer
//! runs and no further step is dispatched.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use testkit_expect::chain::ExpectationChain;
//! use testkit_expect::condvar::{CondVar, PredicateKind};
//! use testkit_expect::mock::EventBus;
//! use testkit_expect::observable::Observable;
//!
//! let bus = EventBus::<i32>::shared();
//! let cv = CondVar::<i32>::new(bus.clone(), None).unwrap();
//! cv.plug("level");
//!
//! let done = Arc::new(AtomicBool::new(false));
//! let flag = Arc::clone(&done);
//! let chain = ExpectationChain::<i32>::new(bus.clone())
//!     .add(cv.expector(PredicateKind::EqualOrAbove), 10, "filled")
//!     .add(cv.expector(PredicateKind::Below), 1, "drained")
//!     .end(move || flag.store(true, Ordering::SeqCst));
//!
//! chain.enter();
//! bus.trigger("level", &[12]);
//! bus.trigger("level", &[0]);
//!
//! assert!(done.load(Ordering::SeqCst));
//! ```

mod step;

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::observable::{Observable, Value, NOT_SIGNAL, SIGNAL};

pub use step::{Action, Expector, Step};

type Finalizer = Box<dyn FnOnce() + Send>;

/// An ordered sequence of expectations advanced by [`SIGNAL`].
///
/// Cloning yields another handle to the same chain. The observable's
/// subscriptions hold weak references, so at least one handle must be kept
/// alive while the chain runs.
pub struct ExpectationChain<T> {
    inner: Arc<ChainInner<T>>,
}

struct ChainInner<T> {
    observable: Arc<dyn Observable<T>>,
    steps: Mutex<VecDeque<Step<T>>>,
    finalizer: Mutex<Option<Finalizer>>,
    aborted: AtomicBool,
}

impl<T: Value> ExpectationChain<T> {
    /// Create a chain and subscribe it to [`SIGNAL`] and [`NOT_SIGNAL`].
    pub fn new(observable: Arc<dyn Observable<T>>) -> Self {
        let inner = Arc::new(ChainInner {
            observable,
            steps: Mutex::new(VecDeque::new()),
            finalizer: Mutex::new(None),
            aborted: AtomicBool::new(false),
        });

        let weak = Arc::downgrade(&inner);
        inner.observable.subscribe(
            SIGNAL,
            Arc::new(move |_: &[T]| {
                if let Some(chain) = Self::upgrade(&weak) {
                    chain.on_signal();
                }
            }),
        );

        let weak = Arc::downgrade(&inner);
        inner.observable.subscribe(
            NOT_SIGNAL,
            Arc::new(move |args: &[T]| {
                if let Some(chain) = Self::upgrade(&weak) {
                    chain.on_abort(args);
                }
            }),
        );

        Self { inner }
    }

    /// Create a chain from an observable that may be missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingObservable`] if `observable` is `None`.
    pub fn try_new(observable: Option<Arc<dyn Observable<T>>>) -> Result<Self> {
        observable.map(Self::new).ok_or(Error::MissingObservable)
    }

    /// Append a step that arms `expector` with `expected` and `label`.
    #[must_use]
    pub fn add<E>(self, expector: E, expected: T, label: impl Into<String>) -> Self
    where
        E: Fn(T, &str) + Send + Sync + 'static,
    {
        self.push(Step::new(expector, expected, label));
        self
    }

    /// Append a step whose expector is followed by `action`, invoked
    /// against the observable with `args`.
    #[must_use]
    pub fn add_with_action<E, A>(
        self,
        expector: E,
        expected: T,
        label: impl Into<String>,
        action: A,
        args: impl IntoIterator<Item = T>,
    ) -> Self
    where
        E: Fn(T, &str) + Send + Sync + 'static,
        A: Fn(&dyn Observable<T>, &[T]) + Send + Sync + 'static,
    {
        self.push(Step::new(expector, expected, label).then(action, args));
        self
    }

    /// Append a step.
    pub fn push(&self, step: Step<T>) {
        self.inner.steps.lock().push_back(step);
    }

    /// Set the callback run when the chain completes or aborts.
    #[must_use]
    pub fn end<F>(self, finalizer: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        *self.inner.finalizer.lock() = Some(Box::new(finalizer));
        self
    }

    /// Start dispatch by firing [`SIGNAL`] without arguments.
    pub fn enter(&self) {
        tracing::debug!(steps = self.len(), "entering chain");
        self.inner.observable.trigger(SIGNAL, &[]);
    }

    /// Dispatch the front step.
    ///
    /// Returns `false` without doing anything if the queue is empty or the
    /// chain was aborted.
    pub fn shift(&self) -> bool {
        if self.is_aborted() {
            return false;
        }
        // The queue lock is released before dispatch; expectors signal
        // synchronously and re-enter the chain.
        let Some(step) = self.inner.steps.lock().pop_front() else {
            return false;
        };
        tracing::debug!(label = %step.label, expected = ?step.expected, "shift");
        step.dispatch(&*self.inner.observable);
        true
    }

    /// Run the finalizer. It runs at most once over the chain's lifetime.
    pub fn finalize(&self) {
        let finalizer = self.inner.finalizer.lock().take();
        if let Some(finalizer) = finalizer {
            tracing::debug!(remaining = self.len(), "finalizing chain");
            finalizer();
        }
    }

    /// Check if no steps remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.steps.lock().is_empty()
    }

    /// Number of steps not yet dispatched.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.steps.lock().len()
    }

    /// Check if [`NOT_SIGNAL`] has stopped the chain.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.inner.aborted.load(Ordering::SeqCst)
    }

    fn upgrade(weak: &Weak<ChainInner<T>>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    fn on_signal(&self) {
        if self.is_empty() {
            self.finalize();
        } else {
            self.shift();
        }
    }

    fn on_abort(&self, args: &[T]) {
        tracing::warn!(?args, remaining = self.len(), "chain aborted");
        self.inner.aborted.store(true, Ordering::SeqCst);
        self.finalize();
    }
}

impl<T> Clone for ExpectationChain<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ExpectationChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpectationChain")
            .field("steps", &*self.inner.steps.lock())
            .field("has_finalizer", &self.inner.finalizer.lock().is_some())
            .field("aborted", &self.inner.aborted.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::EventBus;

    type Log = Arc<Mutex<Vec<String>>>;

    fn recording(log: &Log, name: &'static str) -> impl Fn(i32, &str) + Send + Sync + 'static {
        let log = Arc::clone(log);
        move |value: i32, label: &str| log.lock().push(format!("{name}({value}, {label})"))
    }

    fn counter(count: &Arc<Mutex<usize>>) -> impl FnOnce() + Send + 'static {
        let count = Arc::clone(count);
        move || *count.lock() += 1
    }

    #[test]
    fn test_try_new_without_observable() {
        let result = ExpectationChain::<i32>::try_new(None);
        assert!(matches!(result, Err(Error::MissingObservable)));
    }

    #[test]
    fn test_subscribes_on_construction() {
        let bus = EventBus::<i32>::shared();
        let _chain = ExpectationChain::<i32>::new(bus.clone());
        assert_eq!(bus.handler_count(SIGNAL), 1);
        assert_eq!(bus.handler_count(NOT_SIGNAL), 1);
    }

    #[test]
    fn test_fifo_dispatch() {
        let bus = EventBus::<i32>::shared();
        let log: Log = Arc::default();
        let chain = ExpectationChain::<i32>::new(bus.clone())
            .add(recording(&log, "a"), 1, "first")
            .add(recording(&log, "b"), 2, "second")
            .add(recording(&log, "c"), 3, "third");

        chain.enter();
        assert_eq!(*log.lock(), vec!["a(1, first)"]);
        assert_eq!(chain.len(), 2);

        bus.trigger(SIGNAL, &[1]);
        bus.trigger(SIGNAL, &[2]);
        assert_eq!(
            *log.lock(),
            vec!["a(1, first)", "b(2, second)", "c(3, third)"]
        );
        assert!(chain.is_empty());
    }

    #[test]
    fn test_step_removed_only_when_dispatched() {
        let bus = EventBus::<i32>::shared();
        let log: Log = Arc::default();
        let chain = ExpectationChain::<i32>::new(bus.clone())
            .add(recording(&log, "a"), 1, "first")
            .add(recording(&log, "b"), 2, "second");

        assert_eq!(chain.len(), 2);
        assert!(log.lock().is_empty());

        assert!(chain.shift());
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_finalizer_runs_once_after_drain() {
        let bus = EventBus::<i32>::shared();
        let log: Log = Arc::default();
        let finished = Arc::new(Mutex::new(0));
        let chain = ExpectationChain::<i32>::new(bus.clone())
            .add(recording(&log, "a"), 1, "only")
            .end(counter(&finished));

        chain.enter();
        assert_eq!(*finished.lock(), 0);

        bus.trigger(SIGNAL, &[1]);
        assert_eq!(*finished.lock(), 1);

        bus.trigger(SIGNAL, &[1]);
        bus.trigger(SIGNAL, &[1]);
        assert_eq!(*finished.lock(), 1);
    }

    #[test]
    fn test_abort_finalizes_and_stops_dispatch() {
        let bus = EventBus::<i32>::shared();
        let log: Log = Arc::default();
        let finished = Arc::new(Mutex::new(0));
        let chain = ExpectationChain::<i32>::new(bus.clone())
            .add(recording(&log, "a"), 1, "first")
            .add(recording(&log, "b"), 2, "second")
            .add(recording(&log, "c"), 3, "third")
            .end(counter(&finished));

        chain.enter();
        bus.trigger(NOT_SIGNAL, &[0, 0]);

        assert_eq!(*finished.lock(), 1);
        assert!(chain.is_aborted());
        assert_eq!(chain.len(), 2);

        bus.trigger(SIGNAL, &[1]);
        assert_eq!(*log.lock(), vec!["a(1, first)"]);
        assert!(!chain.shift());
        assert_eq!(*finished.lock(), 1);
    }

    #[test]
    fn test_shift_on_empty_queue() {
        let bus = EventBus::<i32>::shared();
        let chain = ExpectationChain::<i32>::new(bus);
        assert!(chain.is_empty());
        assert!(!chain.shift());
    }

    #[test]
    fn test_action_runs_after_expector_with_args() {
        let bus = EventBus::<i32>::shared();
        let log: Log = Arc::default();
        let action_log = Arc::clone(&log);
        let chain = ExpectationChain::<i32>::new(bus.clone()).add_with_action(
            recording(&log, "expect"),
            5,
            "five",
            move |observable: &dyn Observable<i32>, args: &[i32]| {
                action_log.lock().push(format!("action{args:?}"));
                observable.trigger("tick", args);
            },
            [4, 5],
        );

        chain.enter();

        assert_eq!(*log.lock(), vec!["expect(5, five)", "action[4, 5]"]);
        assert_eq!(bus.emitted("tick"), vec![vec![4, 5]]);
    }

    #[test]
    fn test_push_after_construction() {
        let bus = EventBus::<i32>::shared();
        let log: Log = Arc::default();
        let chain = ExpectationChain::<i32>::new(bus.clone());
        chain.push(Step::new(recording(&log, "late"), 9, "pushed"));

        chain.enter();
        assert_eq!(*log.lock(), vec!["late(9, pushed)"]);
    }

    #[test]
    fn test_dropped_chain_ignores_signals() {
        let bus = EventBus::<i32>::shared();
        let finished = Arc::new(Mutex::new(0));
        let chain = ExpectationChain::<i32>::new(bus.clone()).end(counter(&finished));
        drop(chain);

        bus.trigger(SIGNAL, &[]);
        assert_eq!(*finished.lock(), 0);
    }

    #[test]
    fn test_empty_chain_finalizes_on_enter() {
        let bus = EventBus::<i32>::shared();
        let finished = Arc::new(Mutex::new(0));
        let chain = ExpectationChain::<i32>::new(bus).end(counter(&finished));

        chain.enter();
        assert_eq!(*finished.lock(), 1);
    }
}
