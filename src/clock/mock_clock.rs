//! `MockClock` implementation for virtual time control.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use crate::runtime::{Scheduler, TimerHandle, TimerTask};

use super::timer::{MockTimerHandle, TimerQueue};

/// A mock clock that provides virtual time and virtual timers.
///
/// `MockClock` implements [`Scheduler`]: timers scheduled on it fire only
/// when the clock is advanced past their deadline, synchronously on the
/// thread calling [`advance`](MockClock::advance). Deadline behavior can be
/// tested to the millisecond without waiting.
///
/// # Thread Safety
///
/// `MockClock` is thread-safe and can be cloned and shared across threads.
/// All clones share the same underlying time and timers.
///
/// # Example
///
/// ```rust
/// use testkit_expect::clock::MockClock;
/// use std::time::Duration;
///
/// let clock = MockClock::new();
/// assert_eq!(clock.now(), Duration::ZERO);
///
/// let clock2 = clock.clone();
/// clock2.advance(Duration::from_secs(5));
/// assert_eq!(clock.now(), Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct MockClock {
    pub(crate) inner: Arc<ClockInner>,
}

#[derive(Debug)]
pub(crate) struct ClockInner {
    /// Current virtual time as duration since clock creation
    current_time: Mutex<Duration>,
    /// Pending timers
    pub(crate) timers: Mutex<TimerQueue>,
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClock {
    /// Creates a new `MockClock` starting at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::with_start_time(Duration::ZERO)
    }

    /// Creates a new `MockClock` starting at the specified time.
    ///
    /// # Example
    ///
    /// ```rust
    /// use testkit_expect::clock::MockClock;
    /// use std::time::Duration;
    ///
    /// let clock = MockClock::with_start_time(Duration::from_secs(100));
    /// assert_eq!(clock.now(), Duration::from_secs(100));
    /// ```
    #[must_use]
    pub fn with_start_time(start: Duration) -> Self {
        Self {
            inner: Arc::new(ClockInner {
                current_time: Mutex::new(start),
                timers: Mutex::new(TimerQueue::new()),
            }),
        }
    }

    /// Returns the current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        *self.inner.current_time.lock()
    }

    /// Advances the clock by the specified duration, firing every timer
    /// whose deadline is reached.
    ///
    /// Timers fire in deadline order. A timer scheduled by a firing callback
    /// also fires during this call if its deadline is already reached.
    ///
    /// # Example
    ///
    /// ```rust
    /// use testkit_expect::clock::MockClock;
    /// use std::time::Duration;
    ///
    /// let clock = MockClock::new();
    /// clock.advance(Duration::from_secs(10));
    /// clock.advance(Duration::from_millis(500));
    /// assert_eq!(clock.now(), Duration::from_millis(10_500));
    /// ```
    pub fn advance(&self, duration: Duration) {
        let target = self.now() + duration;
        self.advance_to(target);
    }

    /// Advances the clock to a specific time.
    ///
    /// This method only moves time forward - if the specified time
    /// is less than or equal to the current time, no time passes, but
    /// timers already due still fire.
    pub fn advance_to(&self, time: Duration) {
        {
            let mut now = self.inner.current_time.lock();
            if time > *now {
                *now = time;
            }
        }
        self.fire_expired();
    }

    /// Returns the number of timers that have neither fired nor been
    /// cancelled.
    ///
    /// # Example
    ///
    /// ```rust
    /// use testkit_expect::clock::MockClock;
    /// use testkit_expect::runtime::Scheduler;
    /// use std::time::Duration;
    ///
    /// let clock = MockClock::new();
    /// let _timer = clock.schedule(Duration::from_secs(1), Box::new(|| {}));
    /// assert_eq!(clock.pending_count(), 1);
    ///
    /// clock.advance(Duration::from_secs(1));
    /// assert_eq!(clock.pending_count(), 0);
    /// ```
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.timers.lock().pending_count()
    }

    fn fire_expired(&self) {
        loop {
            let now = self.now();
            // The queue lock is released before the task runs; tasks schedule
            // and cancel timers on this clock.
            let Some(task) = self.inner.timers.lock().pop_expired(now) else {
                break;
            };
            tracing::trace!(?now, "mock timer fired");
            task();
        }
    }
}

impl Scheduler for MockClock {
    fn schedule(&self, delay: Duration, task: TimerTask) -> Box<dyn TimerHandle> {
        let deadline = self.now() + delay;
        let (id, finished) = self.inner.timers.lock().register(deadline, task);
        Box::new(MockTimerHandle::new(Arc::downgrade(&self.inner), id, finished))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> TimerTask {
        let log = Arc::clone(log);
        Box::new(move || log.lock().push(name))
    }

    #[test]
    fn test_new_clock_starts_at_zero() {
        let clock = MockClock::new();
        assert_eq!(clock.now(), Duration::ZERO);
    }

    #[test]
    fn test_advance_to_never_goes_backwards() {
        let clock = MockClock::new();
        clock.advance_to(Duration::from_secs(10));
        clock.advance_to(Duration::from_secs(5));
        assert_eq!(clock.now(), Duration::from_secs(10));
    }

    #[test]
    fn test_timer_fires_exactly_at_deadline() {
        let clock = MockClock::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let handle = clock.schedule(
            Duration::from_millis(50),
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        clock.advance(Duration::from_millis(49));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(!handle.is_finished());

        clock.advance(Duration::from_millis(1));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(handle.is_finished());

        clock.advance(Duration::from_secs(1));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_timers_fire_in_deadline_order() {
        let clock = MockClock::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let _c = clock.schedule(Duration::from_millis(30), recorder(&log, "c"));
        let _a = clock.schedule(Duration::from_millis(10), recorder(&log, "a"));
        let _b = clock.schedule(Duration::from_millis(20), recorder(&log, "b"));

        clock.advance(Duration::from_millis(100));
        assert_eq!(*log.lock(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let clock = MockClock::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let handle = clock.schedule(Duration::from_millis(10), recorder(&log, "cancelled"));
        handle.cancel();
        assert!(handle.is_finished());
        assert_eq!(clock.pending_count(), 0);

        clock.advance(Duration::from_millis(10));
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_callback_can_schedule_on_same_clock() {
        let clock = MockClock::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let rescheduler = clock.clone();
        let inner_log = Arc::clone(&log);
        let _outer = clock.schedule(
            Duration::from_millis(10),
            Box::new(move || {
                inner_log.lock().push("outer");
                let log = Arc::clone(&inner_log);
                let _inner = rescheduler.schedule(Duration::ZERO, Box::new(move || log.lock().push("inner")));
            }),
        );

        clock.advance(Duration::from_millis(10));
        assert_eq!(*log.lock(), vec!["outer", "inner"]);
    }

    #[test]
    fn test_cancel_after_clock_dropped() {
        let clock = MockClock::new();
        let handle = clock.schedule(Duration::from_millis(10), Box::new(|| {}));
        drop(clock);
        handle.cancel();
        assert!(handle.is_finished());
    }
}
