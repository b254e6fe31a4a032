//! Queued expectation steps.

use std::fmt;
use std::sync::Arc;

use crate::observable::Observable;

/// Arms an expectation for a step: called with the step's expected value and
/// label.
pub type Expector<T> = Arc<dyn Fn(T, &str) + Send + Sync>;

/// Runs after a step's expector, against the chain's observable, with the
/// step's stored arguments.
pub type Action<T> = Arc<dyn Fn(&dyn Observable<T>, &[T]) + Send + Sync>;

/// One unit of an [`ExpectationChain`](super::ExpectationChain).
///
/// # Example
///
/// ```rust
/// use testkit_expect::chain::Step;
/// use testkit_expect::observable::Observable;
///
/// let step = Step::new(|_value: i32, _label: &str| {}, 5, "reached five")
///     .then(|bus: &dyn Observable<i32>, args: &[i32]| bus.trigger("tick", args), [5]);
///
/// assert_eq!(step.label(), "reached five");
/// assert!(step.has_action());
/// ```
pub struct Step<T> {
    pub(crate) expector: Expector<T>,
    pub(crate) expected: T,
    pub(crate) label: String,
    pub(crate) action: Option<Action<T>>,
    pub(crate) args: Vec<T>,
}

impl<T> Step<T> {
    /// Create a step without an action.
    pub fn new<E>(expector: E, expected: T, label: impl Into<String>) -> Self
    where
        E: Fn(T, &str) + Send + Sync + 'static,
    {
        Self {
            expector: Arc::new(expector),
            expected,
            label: label.into(),
            action: None,
            args: Vec::new(),
        }
    }

    /// Run `action` with `args` after the expector.
    #[must_use]
    pub fn then<A>(mut self, action: A, args: impl IntoIterator<Item = T>) -> Self
    where
        A: Fn(&dyn Observable<T>, &[T]) + Send + Sync + 'static,
    {
        self.action = Some(Arc::new(action));
        self.args = args.into_iter().collect();
        self
    }

    /// The step's label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The value handed to the expector.
    #[must_use]
    pub fn expected(&self) -> &T {
        &self.expected
    }

    /// Check if an action follows the expector.
    #[must_use]
    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    /// Arguments the action is invoked with.
    #[must_use]
    pub fn args(&self) -> &[T] {
        &self.args
    }

    /// Invoke the expector, then the action if there is one.
    pub(crate) fn dispatch(self, observable: &dyn Observable<T>) {
        (self.expector)(self.expected, &self.label);
        if let Some(action) = self.action {
            action(observable, &self.args);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Step<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("expected", &self.expected)
            .field("label", &self.label)
            .field("has_action", &self.action.is_some())
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}
