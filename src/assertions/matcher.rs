//! Comparison matchers.
//!
//! Condition variable predicates are built from these:
//!
//! - [`Matcher`] trait
//! - [`eq`] and [`ne`] for equality
//! - [`gt`], [`gte`] and [`lt`] for thresholds, all backed by [`BoundMatcher`]
//!
//! # Example
//!
//! ```rust
//! use testkit_expect::assertions::matcher::{eq, gt, Matcher};
//!
//! assert!(eq(42).matches(&42));
//! assert!(gt(0).matches(&50));
//! assert_eq!(gt(0).describe_mismatch(&-1), "-1 is not greater than 0");
//! ```

use std::fmt::Debug;

/// A predicate over values that can explain itself.
pub trait Matcher<T: ?Sized> {
    /// Check if the value matches.
    fn matches(&self, value: &T) -> bool;

    /// Describe what this matcher expects.
    fn describe(&self) -> String;

    /// Describe why a value didn't match.
    fn describe_mismatch(&self, value: &T) -> String;
}

/// Matches values equal to a fixed value.
#[must_use]
pub fn eq<T: PartialEq + Debug>(expected: T) -> EqMatcher<T> {
    EqMatcher { expected }
}

/// Matches values different from a fixed value.
#[must_use]
pub fn ne<T: PartialEq + Debug>(unexpected: T) -> NeMatcher<T> {
    NeMatcher { unexpected }
}

/// Matches values strictly above `threshold`.
#[must_use]
pub fn gt<T: PartialOrd + Debug>(threshold: T) -> BoundMatcher<T> {
    BoundMatcher::new(Bound::Above, threshold)
}

/// Matches values at or above `threshold`.
#[must_use]
pub fn gte<T: PartialOrd + Debug>(threshold: T) -> BoundMatcher<T> {
    BoundMatcher::new(Bound::AtLeast, threshold)
}

/// Matches values strictly below `threshold`.
#[must_use]
pub fn lt<T: PartialOrd + Debug>(threshold: T) -> BoundMatcher<T> {
    BoundMatcher::new(Bound::Below, threshold)
}

/// See [`eq`].
#[derive(Debug, Clone)]
pub struct EqMatcher<T> {
    expected: T,
}

impl<T: PartialEq + Debug> Matcher<T> for EqMatcher<T> {
    fn matches(&self, value: &T) -> bool {
        *value == self.expected
    }

    fn describe(&self) -> String {
        format!("equals {:?}", self.expected)
    }

    fn describe_mismatch(&self, value: &T) -> String {
        format!("{value:?} does not equal {:?}", self.expected)
    }
}

/// See [`ne`].
#[derive(Debug, Clone)]
pub struct NeMatcher<T> {
    unexpected: T,
}

impl<T: PartialEq + Debug> Matcher<T> for NeMatcher<T> {
    fn matches(&self, value: &T) -> bool {
        *value != self.unexpected
    }

    fn describe(&self) -> String {
        format!("differs from {:?}", self.unexpected)
    }

    fn describe_mismatch(&self, value: &T) -> String {
        format!("{value:?} is equal to {:?}", self.unexpected)
    }
}

/// Which side of the threshold a [`BoundMatcher`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Strictly greater.
    Above,
    /// Greater or equal.
    AtLeast,
    /// Strictly less.
    Below,
}

/// A threshold comparison. Incomparable values (NaN) never match.
#[derive(Debug, Clone)]
pub struct BoundMatcher<T> {
    bound: Bound,
    threshold: T,
}

impl<T> BoundMatcher<T> {
    fn new(bound: Bound, threshold: T) -> Self {
        Self { bound, threshold }
    }

    /// The accepted side of the threshold.
    #[must_use]
    pub fn bound(&self) -> Bound {
        self.bound
    }
}

impl<T: PartialOrd + Debug> Matcher<T> for BoundMatcher<T> {
    fn matches(&self, value: &T) -> bool {
        match self.bound {
            Bound::Above => *value > self.threshold,
            Bound::AtLeast => *value >= self.threshold,
            Bound::Below => *value < self.threshold,
        }
    }

    fn describe(&self) -> String {
        let relation = match self.bound {
            Bound::Above => "is greater than",
            Bound::AtLeast => "is at least",
            Bound::Below => "is less than",
        };
        format!("{relation} {:?}", self.threshold)
    }

    fn describe_mismatch(&self, value: &T) -> String {
        let relation = match self.bound {
            Bound::Above => "is not greater than",
            Bound::AtLeast => "is less than",
            Bound::Below => "is not less than",
        };
        format!("{value:?} {relation} {:?}", self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparisons() {
        assert!(eq(5).matches(&5));
        assert!(!eq(5).matches(&4));
        assert!(ne(5).matches(&4));
        assert!(!ne(5).matches(&5));
        assert!(gt(5).matches(&6));
        assert!(!gt(5).matches(&5));
        assert!(gte(5).matches(&5));
        assert!(!gte(5).matches(&4));
        assert!(lt(5).matches(&4));
        assert!(!lt(5).matches(&5));
    }

    #[test]
    fn test_float_nan_never_ordered() {
        assert!(!gt(1.0).matches(&f64::NAN));
        assert!(!gte(1.0).matches(&f64::NAN));
        assert!(!lt(1.0).matches(&f64::NAN));
        assert!(ne(1.0).matches(&f64::NAN));
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(eq(5).describe(), "equals 5");
        assert_eq!(ne(5).describe_mismatch(&5), "5 is equal to 5");
        assert_eq!(gte(5).describe(), "is at least 5");
        assert_eq!(gte(5).describe_mismatch(&2), "2 is less than 5");
        assert_eq!(lt(5).describe_mismatch(&7), "7 is not less than 5");
    }

    #[test]
    fn test_bound_kind() {
        assert_eq!(gt(0).bound(), Bound::Above);
        assert_eq!(gte(0).bound(), Bound::AtLeast);
        assert_eq!(lt(0).bound(), Bound::Below);
    }
}
