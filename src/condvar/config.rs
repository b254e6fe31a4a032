//! Condition variable configuration.

use std::time::Duration;

/// Configuration for a [`CondVar`](super::CondVar).
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use testkit_expect::condvar::CondVarConfig;
///
/// let config = CondVarConfig::new().timeout_ms(50).debug();
///
/// assert_eq!(config.timeout, Some(Duration::from_millis(50)));
/// assert!(config.debug);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CondVarConfig {
    /// Deadline for each pending expectation. `None` waits forever.
    pub timeout: Option<Duration>,
    /// Log every value observed through a plugged event at `debug` level.
    pub debug: bool,
}

impl CondVarConfig {
    /// Create a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the deadline for pending expectations.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the deadline in milliseconds. Zero disables the deadline.
    #[must_use]
    pub fn timeout_ms(mut self, millis: u64) -> Self {
        self.timeout = (millis > 0).then(|| Duration::from_millis(millis));
        self
    }

    /// Enable diagnostic output for plugged events.
    #[must_use]
    pub fn debug(mut self) -> Self {
        self.debug = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_deadline() {
        let config = CondVarConfig::default();
        assert_eq!(config.timeout, None);
        assert!(!config.debug);
    }

    #[test]
    fn test_zero_timeout_disables_deadline() {
        let config = CondVarConfig::new().timeout_ms(50).timeout_ms(0);
        assert_eq!(config.timeout, None);
    }
}
