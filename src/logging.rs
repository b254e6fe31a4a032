//! Test log output.
//!
//! Condition variables and chains log through [`tracing`]: matches, shifts
//! and finalization at `debug`, individual checks at `trace`, failures at
//! `warn`. [`init`] installs a formatting subscriber filtered by `RUST_LOG`
//! that writes through the test harness, so output is captured per test.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install the test subscriber. Calling it more than once is a no-op.
///
/// Defaults to `warn` when `RUST_LOG` is unset or invalid. If another
/// global subscriber is already installed it is left in place.
///
/// ```rust
/// testkit_expect::logging::init();
/// testkit_expect::logging::init();
/// ```
pub fn init() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
        assert!(INIT.is_completed());
        tracing::debug!("logging initialized");
    }
}
