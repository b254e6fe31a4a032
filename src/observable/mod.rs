//! The publish/subscribe capability that condition variables and chains
//! coordinate through.
//!
//! Both [`CondVar`](crate::condvar::CondVar) and
//! [`ExpectationChain`](crate::chain::ExpectationChain) only need two
//! operations from the event bus they are given: register a handler for an
//! event name, and synchronously fire an event name with arguments. Any bus
//! can be adapted by implementing [`Observable`]; [`EventBus`](crate::mock::EventBus)
//! is an in-memory implementation for tests.
//!
//! Two event names are reserved for coordination: [`SIGNAL`] is fired when a
//! condition resolves, [`NOT_SIGNAL`] when a forbidden value is observed.

use std::fmt::Debug;
use std::sync::Arc;

/// Event fired when a condition is satisfied. Arguments: `[value]`, or `[]`
/// when a chain is entered.
pub const SIGNAL: &str = "__signal__";

/// Event fired when a forbidden value is observed. Arguments:
/// `[value, forbidden]`.
pub const NOT_SIGNAL: &str = "__notsignal__";

/// Values carried by events and compared by predicates.
///
/// Blanket-implemented for every type with the required bounds.
pub trait Value: PartialOrd + Clone + Debug + Send + Sync + 'static {}

impl<T> Value for T where T: PartialOrd + Clone + Debug + Send + Sync + 'static {}

/// A handler registered for an event name.
pub type Handler<T> = Arc<dyn Fn(&[T]) + Send + Sync>;

/// Minimal publish/subscribe capability.
///
/// # Contract
///
/// - Every handler registered for an event name is invoked on each
///   [`trigger`](Observable::trigger) of that name, in registration order.
/// - `trigger` is synchronous: all handlers have run when it returns.
/// - Handlers may call `trigger` or `subscribe` re-entrantly, so an
///   implementation must not hold internal locks while invoking them.
pub trait Observable<T>: Send + Sync {
    /// Register `handler` for `event`.
    fn subscribe(&self, event: &str, handler: Handler<T>);

    /// Invoke every handler registered for `event` with `args`.
    fn trigger(&self, event: &str, args: &[T]);
}

impl<T, O: Observable<T> + ?Sized> Observable<T> for Arc<O> {
    fn subscribe(&self, event: &str, handler: Handler<T>) {
        (**self).subscribe(event, handler);
    }

    fn trigger(&self, event: &str, args: &[T]) {
        (**self).trigger(event, args);
    }
}
