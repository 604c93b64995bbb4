use super::poller::{Interest, RawFd};
use super::timer::{TimerEntry, TimerKind};
use super::watcher::{Direction, RepeatCallback, WatcherId};

use std::cell::Cell;
use std::collections::{BinaryHeap, HashMap};
use std::rc::Rc;
use std::time::Instant;

/// The set of pending timers and readiness subscriptions.
///
/// Owned exclusively by the reactor; every mutation goes through the
/// reactor's public operations, which is what makes the single-threaded
/// model safe without locks.
///
/// Cancellation is tracked in two layers: a `WatcherId → CancelHandle`
/// table for the `cancel` operation itself, and per-entry shared flags so
/// that entries already extracted for dispatch (queued callbacks, popped
/// timers) can still observe a cancellation that happened earlier in the
/// same tick.
pub(crate) struct Registry {
    /// Pending timers, earliest `(deadline, seq)` first.
    timers: BinaryHeap<TimerEntry>,

    /// Number of timers that are armed and not cancelled.
    ///
    /// Tracked separately because cancelled entries leave the heap lazily.
    live_timers: usize,

    /// Readiness watchers, one slot per direction per descriptor.
    io: HashMap<RawFd, FdWatchers>,

    /// Cancellation table for every live watcher id.
    cancels: HashMap<WatcherId, CancelHandle>,

    /// Next watcher identifier.
    next_id: u64,

    /// Next timer registration sequence number.
    next_seq: u64,
}

struct FdWatchers {
    read: Option<IoWatcher>,
    write: Option<IoWatcher>,
}

struct IoWatcher {
    id: WatcherId,
    callback: RepeatCallback,
}

/// How a given watcher id is torn down.
pub(crate) enum CancelHandle {
    /// An entry in the deferred queue; cancelled by flipping its flag.
    Queued(Rc<Cell<bool>>),

    /// A heap timer; cancelled by flipping its flag, purged lazily.
    Timer(Rc<Cell<bool>>),

    /// A readiness watcher; cancelled by clearing its direction slot.
    Io { fd: RawFd, direction: Direction },
}

/// Poller follow-up required after cancelling a readiness watcher.
pub(crate) struct IoCancel {
    pub(crate) fd: RawFd,

    /// Interest left on the descriptor, `None` when it should be
    /// deregistered entirely.
    pub(crate) remaining: Option<Interest>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            timers: BinaryHeap::new(),
            live_timers: 0,
            io: HashMap::new(),
            cancels: HashMap::new(),
            next_id: 0,
            next_seq: 0,
        }
    }

    /// Hands out the next watcher identifier.
    pub(crate) fn next_id(&mut self) -> WatcherId {
        let id = WatcherId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Records the cancel handle of a deferred-queue entry.
    pub(crate) fn track_queued(&mut self, id: WatcherId, cancelled: Rc<Cell<bool>>) {
        self.cancels.insert(id, CancelHandle::Queued(cancelled));
    }

    /// Arms a timer.
    pub(crate) fn arm_timer(
        &mut self,
        id: WatcherId,
        deadline: Instant,
        cancelled: Rc<Cell<bool>>,
        kind: TimerKind,
    ) {
        let seq = self.next_seq;
        self.next_seq += 1;

        self.cancels.insert(id, CancelHandle::Timer(cancelled.clone()));
        self.timers.push(TimerEntry {
            deadline,
            seq,
            id,
            cancelled,
            kind,
        });
        self.live_timers += 1;
    }

    /// Pushes a fired repeating timer back into the heap.
    ///
    /// Keeps the original sequence number so deadline ties keep resolving
    /// in registration order.
    pub(crate) fn rearm(&mut self, entry: TimerEntry) {
        self.timers.push(entry);
    }

    /// Earliest pending deadline, purging cancelled entries on the way.
    pub(crate) fn next_deadline(&mut self) -> Option<Instant> {
        while let Some(top) = self.timers.peek() {
            if top.cancelled.get() {
                self.timers.pop();
                continue;
            }
            return Some(top.deadline);
        }
        None
    }

    /// Pops every timer due at `now`, in `(deadline, seq)` order.
    ///
    /// Cancelled entries surfacing during the sweep are dropped; their
    /// bookkeeping was already done when `cancel` ran.
    pub(crate) fn pop_due(&mut self, now: Instant) -> Vec<TimerEntry> {
        let mut due = Vec::new();

        while let Some(top) = self.timers.peek() {
            if top.cancelled.get() {
                self.timers.pop();
                continue;
            }
            if top.deadline > now {
                break;
            }
            if let Some(entry) = self.timers.pop() {
                due.push(entry);
            }
        }

        due
    }

    /// Removes a fired one-shot watcher from the cancellation table.
    ///
    /// Called before the callback runs, upholding the invariant that a
    /// fired watcher is already gone from the registry when its callback
    /// executes.
    pub(crate) fn forget(&mut self, id: WatcherId) {
        if let Some(CancelHandle::Timer(_)) = self.cancels.remove(&id) {
            self.live_timers -= 1;
        }
    }

    /// Installs a readiness watcher, replacing any previous watcher bound
    /// to the same descriptor and direction.
    pub(crate) fn install_io(
        &mut self,
        fd: RawFd,
        direction: Direction,
        id: WatcherId,
        callback: RepeatCallback,
    ) {
        let entry = self.io.entry(fd).or_insert_with(|| FdWatchers {
            read: None,
            write: None,
        });

        let slot = match direction {
            Direction::Read => &mut entry.read,
            Direction::Write => &mut entry.write,
        };

        if let Some(replaced) = slot.take() {
            self.cancels.remove(&replaced.id);
        }

        *slot = Some(IoWatcher { id, callback });
        self.cancels.insert(id, CancelHandle::Io { fd, direction });
    }

    /// The interest the poller should watch `fd` with once `direction` is
    /// added to its existing watchers.
    pub(crate) fn interest_with(&self, fd: RawFd, direction: Direction) -> Interest {
        let (mut read, mut write) = match self.io.get(&fd) {
            Some(entry) => (entry.read.is_some(), entry.write.is_some()),
            None => (false, false),
        };

        match direction {
            Direction::Read => read = true,
            Direction::Write => write = true,
        }

        Interest { read, write }
    }

    /// Whether `fd` already has any watcher (and is thus known to the
    /// poller).
    pub(crate) fn watches_fd(&self, fd: RawFd) -> bool {
        self.io.contains_key(&fd)
    }

    /// The callback watching `fd` in the given direction, if any.
    pub(crate) fn io_callback(&self, fd: RawFd, direction: Direction) -> Option<RepeatCallback> {
        let entry = self.io.get(&fd)?;
        let slot = match direction {
            Direction::Read => &entry.read,
            Direction::Write => &entry.write,
        };
        slot.as_ref().map(|watcher| watcher.callback.clone())
    }

    /// Cancels a watcher; returns the poller follow-up for readiness
    /// watchers.
    pub(crate) fn cancel(&mut self, id: WatcherId) -> Option<IoCancel> {
        match self.cancels.remove(&id)? {
            CancelHandle::Queued(flag) => {
                flag.set(true);
                None
            }
            CancelHandle::Timer(flag) => {
                flag.set(true);
                self.live_timers -= 1;
                None
            }
            CancelHandle::Io { fd, direction } => {
                let entry = self.io.get_mut(&fd)?;

                match direction {
                    Direction::Read => entry.read = None,
                    Direction::Write => entry.write = None,
                }

                let remaining = Interest {
                    read: entry.read.is_some(),
                    write: entry.write.is_some(),
                };

                if remaining.is_empty() {
                    self.io.remove(&fd);
                    Some(IoCancel {
                        fd,
                        remaining: None,
                    })
                } else {
                    Some(IoCancel {
                        fd,
                        remaining: Some(remaining),
                    })
                }
            }
        }
    }

    /// True while any timer is armed.
    pub(crate) fn has_timers(&self) -> bool {
        self.live_timers > 0
    }

    /// True while any readiness watcher is installed.
    pub(crate) fn has_io(&self) -> bool {
        !self.io.is_empty()
    }
}
