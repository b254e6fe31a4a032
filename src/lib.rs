//! # testkit-expect 🧰
//!
//! > Condition variables and ordered expectations for event-driven async tests
//!
//! **testkit-expect** turns "wait until this value crosses a threshold, then do
//! the next thing" into a declarative test script. Everything coordinates
//! through an [`Observable`](observable::Observable) event bus.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use testkit_expect::prelude::*;
//!
//! let bus = EventBus::<i32>::shared();
//! let cv = CondVar::<i32>::new(bus.clone(), None).unwrap();
//! cv.plug("tick");
//!
//! let done = Arc::new(AtomicBool::new(false));
//! let flag = Arc::clone(&done);
//! let chain = ExpectationChain::<i32>::new(bus.clone())
//!     .add(cv.expector(PredicateKind::Above), 2, "warmed up")
//!     .add(cv.expector(PredicateKind::Equal), 5, "reached five")
//!     .end(move || flag.store(true, Ordering::SeqCst));
//!
//! chain.enter();
//! for value in 1..=5 {
//!     bus.trigger("tick", &[value]);
//! }
//! assert!(done.load(Ordering::SeqCst));
//! ```
//!
//! ## Features
//!
//! - 🎚️ **Condition Variables** - Threshold predicates over observed values
//! - 🔗 **Expectation Chains** - Step through expectations in order
//! - ⏱️ **Deadlines** - Report expectations that never resolve, on tokio or a mock clock
//! - 🚫 **Forbidden Values** - Fail as soon as a value that must not appear does

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Virtual clock for deadline tests
pub mod clock;

pub mod assertions;
pub mod chain;
pub mod condvar;
pub mod error;
pub mod logging;
pub mod mock;
pub mod observable;
pub mod runtime;

/// Prelude for convenient imports
///
/// ```rust
/// use testkit_expect::prelude::*;
/// ```
pub mod prelude {
    pub use crate::assertions::{FailureLog, FailureReporter, PanicReporter};
    pub use crate::chain::{ExpectationChain, Step};
    pub use crate::clock::MockClock;
    pub use crate::condvar::{CondVar, CondVarConfig, PredicateKind};
    pub use crate::error::{Error, Result};
    pub use crate::mock::EventBus;
    pub use crate::observable::{Observable, NOT_SIGNAL, SIGNAL};
    pub use crate::runtime::Scheduler;
}

// Re-exports
pub use error::{Error, Result};
