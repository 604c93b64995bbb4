use super::watcher::{OnceCallback, RepeatCallback, WatcherId};

use std::cell::Cell;
use std::cmp::Ordering;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// An entry in the reactor timer queue.
///
/// `TimerEntry` represents a scheduled firing at a specific deadline and is
/// stored in a binary heap ordered by deadline, with the registration
/// sequence number as tie-break so that timers sharing a deadline fire in
/// registration order.
///
/// The entry may be cancelled before it fires. Cancellation is lazy: the
/// flag is flipped and the heap entry is discarded when it surfaces.
pub(crate) struct TimerEntry {
    /// The time at which the timer should fire.
    pub(crate) deadline: Instant,

    /// Registration sequence number, used as deadline tie-break.
    pub(crate) seq: u64,

    /// Identifier under which the watcher can be cancelled.
    pub(crate) id: WatcherId,

    /// Cancellation flag shared with the registry's cancel table.
    pub(crate) cancelled: Rc<Cell<bool>>,

    /// One-shot or repeating behavior.
    pub(crate) kind: TimerKind,
}

pub(crate) enum TimerKind {
    /// Fires once, consuming its callback.
    Once(OnceCallback),

    /// Re-armed after each firing with `deadline + interval`.
    ///
    /// Re-arming from the previous deadline rather than from the current
    /// time keeps the cadence free of drift from callback execution time.
    /// A timer that has fallen behind fires at most once per tick until it
    /// catches up.
    Repeating {
        interval: Duration,
        callback: RepeatCallback,
    },
}

impl Eq for TimerEntry {}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl Ord for TimerEntry {
    /// Orders timer entries by `(deadline, seq)`.
    ///
    /// The comparison is **reversed** so that a `BinaryHeap<TimerEntry>`
    /// behaves as a min-heap, where the earliest deadline is popped first.
    fn cmp(&self, other: &Self) -> Ordering {
        (other.deadline, other.seq).cmp(&(self.deadline, self.seq))
    }
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
