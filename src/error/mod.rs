//! Error definitions
//!
//! This module provides error types for testkit-expect.

use std::time::Duration;

use thiserror::Error;

/// Main error type for testkit-expect
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No observable collaborator was supplied at construction.
    #[error("Need to pass an Observable object to constructor")]
    MissingObservable,

    /// No timer source could be resolved.
    #[error("No scheduler available: {0}")]
    NoScheduler(String),

    /// A pending expectation was not resolved before its deadline.
    #[error("Condition variable timed out waiting for check: {since}")]
    Timeout {
        /// Label of the expectation that was pending.
        since: String,
        /// Configured deadline.
        after: Duration,
    },

    /// A forbidden value was observed.
    #[error("Did not expect this value since: {since} (got {value}, forbidden {forbidden})")]
    UnexpectedValue {
        /// Label of the `unexpect` call.
        since: String,
        /// The observed value, rendered with `Debug`.
        value: String,
        /// The forbidden value, rendered with `Debug`.
        forbidden: String,
    },
}

impl Error {
    /// Create a no-scheduler error.
    #[must_use]
    pub fn no_scheduler(message: impl Into<String>) -> Self {
        Self::NoScheduler(message.into())
    }

    /// Returns the expectation label carried by an assertion failure.
    #[must_use]
    pub fn since(&self) -> Option<&str> {
        match self {
            Self::Timeout { since, .. } | Self::UnexpectedValue { since, .. } => Some(since),
            Self::MissingObservable | Self::NoScheduler(_) => None,
        }
    }

    /// Returns `true` for failures raised while a test was running, as
    /// opposed to construction failures.
    #[must_use]
    pub fn is_assertion(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::UnexpectedValue { .. })
    }
}

/// Result type alias
pub type Result<T, E = Error> = std::result::Result<T, E>;
