//! Threshold predicates armed on a condition variable.

use std::fmt::{self, Debug};

use crate::assertions::matcher::{
    eq, gt, gte, lt, ne, BoundMatcher, EqMatcher, Matcher, NeMatcher,
};

/// The kind of threshold an `expect_*` call arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredicateKind {
    /// Value equals the threshold.
    Equal,
    /// Value differs from the threshold.
    Different,
    /// Value is strictly greater than the threshold.
    Above,
    /// Value is strictly less than the threshold.
    Below,
    /// Value is greater than or equal to the threshold.
    EqualOrAbove,
}

impl fmt::Display for PredicateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Equal => "equal",
            Self::Different => "different",
            Self::Above => "above",
            Self::Below => "below",
            Self::EqualOrAbove => "equal or above",
        };
        f.write_str(name)
    }
}

/// The five independently settable predicates of a condition variable.
///
/// Any number of them may be armed at once; a value satisfies the set when
/// any armed predicate matches it.
pub struct Predicates<T> {
    equal: Option<EqMatcher<T>>,
    different: Option<NeMatcher<T>>,
    above_or_equal: Option<BoundMatcher<T>>,
    below: Option<BoundMatcher<T>>,
    above: Option<BoundMatcher<T>>,
}

impl<T> Default for Predicates<T> {
    fn default() -> Self {
        Self {
            equal: None,
            different: None,
            above_or_equal: None,
            below: None,
            above: None,
        }
    }
}

impl<T> Predicates<T> {
    /// Disarm every predicate.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl<T> Predicates<T>
where
    T: PartialOrd + Debug,
{
    /// Arm `kind` with `threshold`, replacing any previous threshold of that kind.
    pub fn set(&mut self, kind: PredicateKind, threshold: T) {
        match kind {
            PredicateKind::Equal => self.equal = Some(eq(threshold)),
            PredicateKind::Different => self.different = Some(ne(threshold)),
            PredicateKind::Above => self.above = Some(gt(threshold)),
            PredicateKind::Below => self.below = Some(lt(threshold)),
            PredicateKind::EqualOrAbove => self.above_or_equal = Some(gte(threshold)),
        }
    }

    /// Check if any predicate is armed.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed().next().is_some()
    }

    /// Describe the first armed predicate `value` satisfies, if any.
    ///
    /// Evaluation order is equal, different, equal-or-above, below, above.
    #[must_use]
    pub fn first_match(&self, value: &T) -> Option<String> {
        self.armed().find(|m| m.matches(value)).map(|m| m.describe())
    }

    /// Describe why `value` satisfies none of the armed predicates.
    #[must_use]
    pub fn describe_mismatch(&self, value: &T) -> String {
        self.armed()
            .map(|m| m.describe_mismatch(value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn armed(&self) -> impl Iterator<Item = &dyn Matcher<T>> + '_ {
        let equal = self.equal.as_ref().map(|m| m as &dyn Matcher<T>);
        let different = self.different.as_ref().map(|m| m as &dyn Matcher<T>);
        let above_or_equal = self.above_or_equal.as_ref().map(|m| m as &dyn Matcher<T>);
        let below = self.below.as_ref().map(|m| m as &dyn Matcher<T>);
        let above = self.above.as_ref().map(|m| m as &dyn Matcher<T>);
        [equal, different, above_or_equal, below, above]
            .into_iter()
            .flatten()
    }
}

impl<T: PartialOrd + Debug> Debug for Predicates<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let armed: Vec<_> = self.armed().map(|m| m.describe()).collect();
        f.debug_struct("Predicates").field("armed", &armed).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_armed_matches_nothing() {
        let predicates = Predicates::<i32>::default();
        assert!(!predicates.is_armed());
        assert_eq!(predicates.first_match(&0), None);
    }

    #[test]
    fn test_each_kind() {
        let cases = [
            (PredicateKind::Equal, 5, 5, 4),
            (PredicateKind::Different, 5, 4, 5),
            (PredicateKind::Above, 5, 6, 5),
            (PredicateKind::Below, 5, 4, 5),
            (PredicateKind::EqualOrAbove, 5, 5, 4),
        ];
        for (kind, threshold, hit, miss) in cases {
            let mut predicates = Predicates::default();
            predicates.set(kind, threshold);
            assert!(predicates.first_match(&hit).is_some(), "{kind} should match {hit}");
            assert!(predicates.first_match(&miss).is_none(), "{kind} should not match {miss}");
        }
    }

    #[test]
    fn test_any_armed_predicate_is_enough() {
        let mut predicates = Predicates::default();
        predicates.set(PredicateKind::Equal, 100);
        predicates.set(PredicateKind::Below, 0);

        assert_eq!(predicates.first_match(&-1).as_deref(), Some("is less than 0"));
        assert_eq!(predicates.first_match(&100).as_deref(), Some("equals 100"));
        assert!(predicates.first_match(&50).is_none());
    }

    #[test]
    fn test_evaluation_order_prefers_equal() {
        let mut predicates = Predicates::default();
        predicates.set(PredicateKind::Above, 1);
        predicates.set(PredicateKind::Equal, 5);

        assert_eq!(predicates.first_match(&5).as_deref(), Some("equals 5"));
    }

    #[test]
    fn test_set_replaces_same_kind() {
        let mut predicates = Predicates::default();
        predicates.set(PredicateKind::Equal, 1);
        predicates.set(PredicateKind::Equal, 2);

        assert!(predicates.first_match(&1).is_none());
        assert!(predicates.first_match(&2).is_some());
    }

    #[test]
    fn test_clear() {
        let mut predicates = Predicates::default();
        predicates.set(PredicateKind::Above, 0);
        predicates.clear();
        assert!(!predicates.is_armed());
        assert!(predicates.first_match(&10).is_none());
    }

    #[test]
    fn test_describe_mismatch_lists_armed() {
        let mut predicates = Predicates::default();
        predicates.set(PredicateKind::Equal, 5);
        predicates.set(PredicateKind::Above, 10);
        assert_eq!(
            predicates.describe_mismatch(&3),
            "3 does not equal 5; 3 is not greater than 10"
        );
    }
}
