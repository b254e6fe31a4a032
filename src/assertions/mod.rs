//! Failure reporting and matchers.
//!
//! - [`FailureReporter`] - Where a condition variable sends assertion failures
//! - [`PanicReporter`] - Default reporter; panics like `assert!`
//! - [`FailureLog`] - Records failures for the test body to inspect
//! - [`matcher`] - Comparison matchers behind condition variable predicates
//!
//! # Example
//!
//! ```rust
//! use testkit_expect::assertions::FailureLog;
//!
//! let log = FailureLog::new();
//! // CondVar::builder().reporter(log.clone())...
//! log.assert_clean();
//! ```

pub mod matcher;
mod reporter;

pub use reporter::{FailureLog, FailureReporter, PanicReporter};
