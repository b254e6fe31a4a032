//! Virtual time control for deadline tests
//!
//! The `clock` module provides [`MockClock`](crate::clock::MockClock), a virtual clock that
//! doubles as a [`Scheduler`](crate::runtime::Scheduler). Condition variable deadlines
//! scheduled on it fire only when the test advances the clock.
//!
//! # Example
//!
//! ```rust
//! use testkit_expect::clock::MockClock;
//! use std::time::Duration;
//!
//! let clock = MockClock::new();
//! assert_eq!(clock.now(), Duration::ZERO);
//!
//! clock.advance(Duration::from_secs(10));
//! assert_eq!(clock.now(), Duration::from_secs(10));
//! ```

mod mock_clock;
mod timer;

pub use mock_clock::MockClock;
pub use timer::MockTimerHandle;
