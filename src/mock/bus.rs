// Allow must_use_candidate since bus methods are mostly called for their effects
#![allow(clippy::must_use_candidate)]

//! In-memory event bus.
//!
//! [`EventBus`] implements [`Observable`] with a handler table and keeps a
//! record of every emission so tests can assert on what was signalled.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::observable::{Handler, Observable, NOT_SIGNAL, SIGNAL};

/// A record of a single [`trigger`](Observable::trigger) call.
#[derive(Debug, Clone, PartialEq)]
pub struct Emission<T> {
    /// The event name.
    pub event: String,
    /// The arguments the event was fired with.
    pub args: Vec<T>,
}

/// An in-memory [`Observable`] that records emissions.
///
/// Handlers for one event name run in registration order. The handler list is
/// snapshotted before dispatch, so a handler registered while an event is
/// being dispatched first runs on the next trigger.
///
/// Clones share the same handler table and history.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use testkit_expect::mock::EventBus;
/// use testkit_expect::observable::Observable;
///
/// let bus = EventBus::<i32>::new();
/// bus.subscribe("tick", Arc::new(|args: &[i32]| assert_eq!(args, &[1])));
/// bus.trigger("tick", &[1]);
///
/// assert_eq!(bus.emission_count("tick"), 1);
/// ```
pub struct EventBus<T> {
    handlers: Arc<Mutex<HashMap<String, Vec<Handler<T>>>>>,
    emissions: Arc<Mutex<Vec<Emission<T>>>>,
}

impl<T: Clone> EventBus<T> {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(HashMap::new())),
            emissions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create an empty bus behind an `Arc`, ready to hand to a
    /// [`CondVar`](crate::condvar::CondVar) or chain.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Get every recorded emission, oldest first.
    pub fn emissions(&self) -> Vec<Emission<T>> {
        self.emissions.lock().clone()
    }

    /// Get the argument lists of every emission of `event`, oldest first.
    pub fn emitted(&self, event: &str) -> Vec<Vec<T>> {
        self.emissions
            .lock()
            .iter()
            .filter(|e| e.event == event)
            .map(|e| e.args.clone())
            .collect()
    }

    /// Get the argument lists of every [`SIGNAL`] emission.
    pub fn signals(&self) -> Vec<Vec<T>> {
        self.emitted(SIGNAL)
    }

    /// Get the argument lists of every [`NOT_SIGNAL`] emission.
    pub fn not_signals(&self) -> Vec<Vec<T>> {
        self.emitted(NOT_SIGNAL)
    }

    /// Count the emissions of `event`.
    #[must_use]
    pub fn emission_count(&self, event: &str) -> usize {
        self.emissions
            .lock()
            .iter()
            .filter(|e| e.event == event)
            .count()
    }

    /// Count the handlers registered for `event`.
    #[must_use]
    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers.lock().get(event).map_or(0, Vec::len)
    }

    /// Forget the emission history. Handlers stay registered.
    pub fn clear_history(&self) {
        self.emissions.lock().clear();
    }
}

impl<T: Clone> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for EventBus<T> {
    fn clone(&self) -> Self {
        Self {
            handlers: Arc::clone(&self.handlers),
            emissions: Arc::clone(&self.emissions),
        }
    }
}

impl<T> Observable<T> for EventBus<T>
where
    T: Clone + Debug + Send + Sync + 'static,
{
    fn subscribe(&self, event: &str, handler: Handler<T>) {
        self.handlers
            .lock()
            .entry(event.to_string())
            .or_default()
            .push(handler);
    }

    fn trigger(&self, event: &str, args: &[T]) {
        self.emissions.lock().push(Emission {
            event: event.to_string(),
            args: args.to_vec(),
        });

        // Release the table before dispatch; handlers re-enter the bus.
        let handlers = self.handlers.lock().get(event).cloned().unwrap_or_default();
        tracing::trace!(event, ?args, handlers = handlers.len(), "dispatching event");
        for handler in handlers {
            handler(args);
        }
    }
}

impl<T: Debug> Debug for EventBus<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let handlers: HashMap<String, usize> = self
            .handlers
            .lock()
            .iter()
            .map(|(event, list)| (event.clone(), list.len()))
            .collect();
        f.debug_struct("EventBus")
            .field("handlers", &handlers)
            .field("emissions", &*self.emissions.lock())
            .finish()
    }
}
