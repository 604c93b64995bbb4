use super::event::Event;
use super::poller::{Poller, RawFd, default_poller};
use super::registry::Registry;
use super::timer::{TimerEntry, TimerKind};
use super::watcher::{Direction, OnceCallback, RepeatCallback, WatcherId};
use crate::error::{Error, Result};

use log::{debug, error, trace, warn};

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// The reactor: a single-threaded loop multiplexing deferred callbacks,
/// timers, and descriptor readiness.
///
/// `Reactor` is a cheap cloneable handle; clones share one loop. Everything
/// else in the runtime submits work to it; it submits nothing elsewhere.
///
/// One tick of [`run`](Reactor::run):
///
/// 1. drain the deferred queue as it stood at the start of the tick
///    (callbacks deferred while draining run on the *next* tick);
/// 2. poll the backend, bounded by the nearest timer deadline (zero when
///    deferred work is already queued, unbounded when only readiness
///    watchers exist);
/// 3. dispatch due timers, earliest deadline first, registration order as
///    tie-break;
/// 4. dispatch the readiness callbacks the backend reported.
///
/// The loop exits when [`stop`](Reactor::stop) is observed between ticks or
/// when no watcher and no deferred work remain.
///
/// Callbacks are fallible; a returned `Err` never terminates the tick.
/// It is routed to the handler installed with
/// [`on_error`](Reactor::on_error), or, with no handler installed, carried
/// out of `run` once the current tick has finished.
pub struct Reactor {
    inner: Rc<RefCell<Inner>>,
}

struct Inner {
    registry: Registry,
    queue: VecDeque<QueuedEntry>,
    running: bool,
    poller: Box<dyn Poller>,
    events: Vec<Event>,
    error_handler: Option<Box<dyn FnMut(Error)>>,
    pending_error: Option<Error>,
}

struct QueuedEntry {
    id: WatcherId,
    cancelled: Rc<Cell<bool>>,
    callback: OnceCallback,
}

impl Reactor {
    /// Creates a reactor on the portable polling backend.
    pub fn new() -> Self {
        Self::with_parts(default_poller(), None)
    }

    pub(crate) fn with_parts(
        poller: Box<dyn Poller>,
        error_handler: Option<Box<dyn FnMut(Error)>>,
    ) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                registry: Registry::new(),
                queue: VecDeque::new(),
                running: false,
                poller,
                events: Vec::new(),
                error_handler,
                pending_error: None,
            })),
        }
    }

    /// Installs the process-wide error handler.
    ///
    /// Once installed, callback failures are delivered here instead of
    /// propagating out of [`run`](Reactor::run).
    pub fn on_error(&self, handler: impl FnMut(Error) + 'static) {
        self.inner.borrow_mut().error_handler = Some(Box::new(handler));
    }

    /// Schedules `callback` to run on the next tick, after all callbacks
    /// already queued.
    ///
    /// This is the FIFO scheduling primitive everything else dispatches
    /// through; it runs before the tick's timer and readiness dispatch.
    pub fn defer<F>(&self, callback: F) -> WatcherId
    where
        F: FnOnce() -> Result<()> + 'static,
    {
        let mut inner = self.inner.borrow_mut();

        let id = inner.registry.next_id();
        let cancelled = Rc::new(Cell::new(false));

        inner.registry.track_queued(id, cancelled.clone());
        inner.queue.push_back(QueuedEntry {
            id,
            cancelled,
            callback: Box::new(callback),
        });

        trace!("deferred callback registered as {:?}", id);
        id
    }

    /// Schedules `callback` to run once, no earlier than `after` from now.
    ///
    /// A zero duration means "as soon as possible" but is still
    /// asynchronous: the callback never runs on the caller's stack.
    pub fn delay<F>(&self, after: Duration, callback: F) -> WatcherId
    where
        F: FnOnce() -> Result<()> + 'static,
    {
        let mut inner = self.inner.borrow_mut();

        let id = inner.registry.next_id();
        let cancelled = Rc::new(Cell::new(false));
        let deadline = Instant::now() + after;

        inner
            .registry
            .arm_timer(id, deadline, cancelled, TimerKind::Once(Box::new(callback)));

        trace!("timer registered as {:?}, due in {:?}", id, after);
        id
    }

    /// Schedules `callback` to run every `interval` until cancelled.
    ///
    /// After each firing the timer is re-armed at the previous deadline
    /// plus `interval`, so callback execution time does not accumulate as
    /// drift. A timer that has fallen behind fires at most once per tick;
    /// it never bursts to catch up.
    pub fn repeat<F>(&self, interval: Duration, callback: F) -> WatcherId
    where
        F: FnMut() -> Result<()> + 'static,
    {
        let mut inner = self.inner.borrow_mut();

        let id = inner.registry.next_id();
        let cancelled = Rc::new(Cell::new(false));
        let deadline = Instant::now() + interval;
        let callback: RepeatCallback = Rc::new(RefCell::new(callback));

        inner.registry.arm_timer(
            id,
            deadline,
            cancelled,
            TimerKind::Repeating { interval, callback },
        );

        trace!("repeating timer registered as {:?}, every {:?}", id, interval);
        id
    }

    /// Watches `fd` for read readiness.
    ///
    /// The callback fires once per readiness notification for as long as
    /// the watcher stays registered; the backend may report readiness again
    /// on the next tick if the callback did not consume what made the
    /// descriptor ready. Registering a second watcher for the same
    /// descriptor and direction replaces the first.
    pub fn on_readable<F>(&self, fd: RawFd, callback: F) -> Result<WatcherId>
    where
        F: FnMut() -> Result<()> + 'static,
    {
        self.watch_io(fd, Direction::Read, Rc::new(RefCell::new(callback)))
    }

    /// Watches `fd` for write readiness.
    ///
    /// Same contract as [`on_readable`](Reactor::on_readable).
    pub fn on_writable<F>(&self, fd: RawFd, callback: F) -> Result<WatcherId>
    where
        F: FnMut() -> Result<()> + 'static,
    {
        self.watch_io(fd, Direction::Write, Rc::new(RefCell::new(callback)))
    }

    fn watch_io(&self, fd: RawFd, direction: Direction, callback: RepeatCallback) -> Result<WatcherId> {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;

        let interest = inner.registry.interest_with(fd, direction);
        if inner.registry.watches_fd(fd) {
            inner.poller.reregister(fd, interest)?;
        } else {
            inner.poller.register(fd, interest)?;
        }

        let id = inner.registry.next_id();
        inner.registry.install_io(fd, direction, id, callback);

        trace!("readiness watcher registered as {:?} on fd {}", id, fd);
        Ok(id)
    }

    /// Cancels a watcher.
    ///
    /// Idempotent: cancelling a watcher that already fired (one-shot) or
    /// was already cancelled is a no-op. Safe to call from within the
    /// watcher's own callback.
    pub fn cancel(&self, id: WatcherId) {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;

        if let Some(io) = inner.registry.cancel(id) {
            let result = match io.remaining {
                Some(interest) => inner.poller.reregister(io.fd, interest),
                None => inner.poller.deregister(io.fd),
            };

            if let Err(err) = result {
                warn!("poller update failed while cancelling {:?}: {}", id, err);
            }
        }

        trace!("watcher {:?} cancelled", id);
    }

    /// Signals the loop to exit.
    ///
    /// The flag is observed between ticks: callbacks already executing or
    /// already queued for the current tick still complete, while watchers
    /// scheduled for later ticks never fire. Idempotent when the loop is
    /// not running.
    pub fn stop(&self) {
        self.inner.borrow_mut().running = false;
        debug!("reactor stop requested");
    }

    /// Runs the loop until it is stopped or falls idle.
    ///
    /// Returns the first unhandled callback failure when no error handler
    /// is installed, or a backend failure if polling itself breaks.
    pub fn run(&self) -> Result<()> {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.running {
                return Err(Error::msg("reactor already running"));
            }
            inner.running = true;
        }

        debug!("reactor running");

        loop {
            {
                let inner = self.inner.borrow();
                if !inner.running {
                    debug!("reactor stop observed");
                    break;
                }
                if inner.pending_error.is_some() {
                    break;
                }
            }

            // Phase 1: drain the deferred queue as it stood at tick start.
            let batch = std::mem::take(&mut self.inner.borrow_mut().queue);
            for entry in batch {
                if entry.cancelled.get() {
                    continue;
                }
                self.inner.borrow_mut().registry.forget(entry.id);
                self.report((entry.callback)());
            }

            // Idle exit and wait bound.
            let timeout = {
                let mut inner = self.inner.borrow_mut();

                let has_deferred = !inner.queue.is_empty();
                let next_deadline = inner.registry.next_deadline();

                if !has_deferred && next_deadline.is_none() && !inner.registry.has_io() {
                    debug!("reactor idle, exiting");
                    break;
                }

                if has_deferred || !inner.running || inner.pending_error.is_some() {
                    Some(Duration::ZERO)
                } else {
                    next_deadline.map(|deadline| deadline.saturating_duration_since(Instant::now()))
                }
            };

            // Phase 2: poll the backend.
            {
                let mut guard = self.inner.borrow_mut();
                let inner = &mut *guard;

                if let Err(err) = inner.poller.poll(&mut inner.events, timeout) {
                    inner.running = false;
                    return Err(err.into());
                }
            }

            // Phase 3: due timers.
            let now = Instant::now();
            let due = self.inner.borrow_mut().registry.pop_due(now);
            for entry in due {
                self.dispatch_timer(entry);
            }

            // Phase 4: readiness.
            let events = std::mem::take(&mut self.inner.borrow_mut().events);
            for event in &events {
                if event.readable {
                    self.dispatch_io(event.fd, Direction::Read);
                }
                if event.writable {
                    self.dispatch_io(event.fd, Direction::Write);
                }
            }
            self.inner.borrow_mut().events = events;
        }

        let mut inner = self.inner.borrow_mut();
        inner.running = false;

        match inner.pending_error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn dispatch_timer(&self, mut entry: TimerEntry) {
        // A callback earlier in this tick may have cancelled it after the
        // due batch was collected.
        if entry.cancelled.get() {
            return;
        }

        match entry.kind {
            TimerKind::Once(callback) => {
                self.inner.borrow_mut().registry.forget(entry.id);
                self.report(callback());
            }
            TimerKind::Repeating { interval, callback } => {
                let result = (&mut *callback.borrow_mut())();
                self.report(result);

                if !entry.cancelled.get() {
                    entry.deadline += interval;
                    entry.kind = TimerKind::Repeating { interval, callback };
                    self.inner.borrow_mut().registry.rearm(entry);
                }
            }
        }
    }

    fn dispatch_io(&self, fd: RawFd, direction: Direction) {
        // Looked up per event: a callback earlier in this tick may have
        // cancelled or replaced the watcher.
        let callback = self.inner.borrow().registry.io_callback(fd, direction);

        if let Some(callback) = callback {
            let result = (&mut *callback.borrow_mut())();
            self.report(result);
        }
    }

    /// Isolates one callback outcome.
    ///
    /// Failures go to the installed error handler; without one, the first
    /// failure is kept for `run` to return and later ones are logged.
    fn report(&self, result: Result<()>) {
        let Err(failure) = result else {
            return;
        };

        let handler = self.inner.borrow_mut().error_handler.take();
        match handler {
            Some(mut handler) => {
                handler(failure);

                let mut inner = self.inner.borrow_mut();
                if inner.error_handler.is_none() {
                    inner.error_handler = Some(handler);
                }
            }
            None => {
                let mut inner = self.inner.borrow_mut();
                match &inner.pending_error {
                    None => inner.pending_error = Some(failure),
                    Some(_) => error!("unhandled callback failure dropped: {}", failure),
                }
            }
        }
    }
}

impl Clone for Reactor {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl Default for Reactor {
    fn default() -> Self {
        Self::new()
    }
}
