//! Virtual timer queue.

use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use crate::runtime::{TimerHandle, TimerTask};

use super::mock_clock::ClockInner;

/// A pending timer in the queue.
struct TimerEntry {
    /// The virtual time at which this timer fires
    deadline: Duration,
    /// Unique ID for this timer (for ordering and cancellation)
    id: u64,
    task: TimerTask,
    finished: Arc<AtomicBool>,
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.id == other.id
    }
}

impl Eq for TimerEntry {}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reverse order for min-heap behavior (earliest deadline first,
        // then scheduling order)
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Timers waiting for virtual time to reach their deadline.
pub(crate) struct TimerQueue {
    pending: BinaryHeap<TimerEntry>,
    next_id: u64,
}

impl TimerQueue {
    pub(crate) fn new() -> Self {
        Self {
            pending: BinaryHeap::new(),
            next_id: 0,
        }
    }

    /// Queue `task` and return its ID with the shared finished flag.
    pub(crate) fn register(&mut self, deadline: Duration, task: TimerTask) -> (u64, Arc<AtomicBool>) {
        let id = self.next_id;
        self.next_id += 1;
        let finished = Arc::new(AtomicBool::new(false));
        self.pending.push(TimerEntry {
            deadline,
            id,
            task,
            finished: Arc::clone(&finished),
        });
        (id, finished)
    }

    /// Pop the earliest timer if it is due at `now`.
    pub(crate) fn pop_expired(&mut self, now: Duration) -> Option<TimerTask> {
        if self.pending.peek()?.deadline > now {
            return None;
        }
        self.pending.pop().map(|entry| {
            entry.finished.store(true, Ordering::SeqCst);
            entry.task
        })
    }

    /// Remove a timer that has not fired yet.
    pub(crate) fn remove(&mut self, id: u64) {
        let entries: Vec<_> = self.pending.drain().collect();
        for entry in entries {
            if entry.id == id {
                entry.finished.store(true, Ordering::SeqCst);
            } else {
                self.pending.push(entry);
            }
        }
    }

    pub(crate) fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl std::fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let deadlines: Vec<_> = self.pending.iter().map(|e| (e.id, e.deadline)).collect();
        f.debug_struct("TimerQueue")
            .field("pending", &deadlines)
            .field("next_id", &self.next_id)
            .finish()
    }
}

/// Handle for a timer scheduled on a [`MockClock`](super::MockClock).
#[derive(Debug)]
pub struct MockTimerHandle {
    clock: Weak<ClockInner>,
    id: u64,
    finished: Arc<AtomicBool>,
}

impl MockTimerHandle {
    pub(crate) fn new(clock: Weak<ClockInner>, id: u64, finished: Arc<AtomicBool>) -> Self {
        Self { clock, id, finished }
    }
}

impl TimerHandle for MockTimerHandle {
    fn cancel(&self) {
        if self.finished.load(Ordering::SeqCst) {
            return;
        }
        if let Some(clock) = self.clock.upgrade() {
            clock.timers.lock().remove(self.id);
        }
        self.finished.store(true, Ordering::SeqCst);
    }

    fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}
