//! Test doubles for the observable collaborator.
//!
//! - [`EventBus`] - In-memory [`Observable`](crate::observable::Observable)
//!   that records every emission
//!
//! # Example
//!
//! ```rust
//! use testkit_expect::mock::EventBus;
//! use testkit_expect::observable::{Observable, SIGNAL};
//!
//! let bus = EventBus::<i32>::new();
//! bus.trigger(SIGNAL, &[5]);
//!
//! assert_eq!(bus.signals(), vec![vec![5]]);
//! ```

mod bus;

pub use bus::{Emission, EventBus};
