use super::resumable::{Resumable, Step, Yielded};
use crate::error::{Error, Result};
use crate::promise::{Deferred, Promise};
use crate::reactor::Reactor;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Drives one resumable computation to completion.
///
/// Construction immediately runs the computation, synchronously, up to its
/// first suspend point (or straight to completion if it never suspends).
/// From then on every resumption is scheduled through the reactor: a
/// yielded promise resumes the computation when it settles, with the value
/// or by raising the rejection at the suspend point, and a yielded plain
/// value is echoed back on the next tick.
///
/// The coroutine owns one deferred representing its own outcome; the
/// promise behind [`promise`](Coroutine::promise) settles exactly once,
/// when the computation returns or fails. A coroutine cannot be cancelled
/// from outside; it always runs to completion or failure.
pub struct Coroutine<T: 'static> {
    promise: Promise<T>,
    running: Rc<Cell<bool>>,
    completed: Rc<Cell<bool>>,
}

impl<T: Clone + 'static> Coroutine<T> {
    /// Starts driving `resumable` on the given reactor.
    pub fn spawn<R>(reactor: &Reactor, resumable: R) -> Coroutine<T>
    where
        R: Resumable<Output = T> + 'static,
    {
        let (promise, deferred) = Promise::pair(reactor);
        let running = Rc::new(Cell::new(true));
        let completed = Rc::new(Cell::new(false));

        let driver = Rc::new(RefCell::new(Driver {
            resumable,
            reactor: reactor.clone(),
            deferred,
            running: running.clone(),
            completed: completed.clone(),
            finished: Cell::new(false),
        }));

        // First step runs here, on the caller's stack; only subsequent
        // resumptions go through the reactor.
        Driver::step(&driver, Entry::Resume(None));

        Coroutine {
            promise,
            running,
            completed,
        }
    }

    /// The promise settling with this coroutine's outcome.
    pub fn promise(&self) -> Promise<T> {
        self.promise.clone()
    }

    /// True from construction until the computation completes or fails.
    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// True once the coroutine's promise has settled. Monotonic.
    pub fn is_completed(&self) -> bool {
        self.completed.get()
    }
}

/// How a scheduled continuation re-enters the computation.
enum Entry<Y> {
    Resume(Option<Y>),
    Throw(Error),
}

struct Driver<R: Resumable> {
    resumable: R,
    reactor: Reactor,
    deferred: Deferred<R::Output>,
    running: Rc<Cell<bool>>,
    completed: Rc<Cell<bool>>,

    /// Set the moment a terminal step is reached, before the settlement
    /// callback has run. Stale continuations (say, a promise settling
    /// after the coroutine already failed through another path) check it
    /// and bow out.
    finished: Cell<bool>,
}

impl<R> Driver<R>
where
    R: Resumable + 'static,
    R::Output: Clone,
{
    fn step(driver: &Rc<RefCell<Driver<R>>>, entry: Entry<R::Yield>) {
        if driver.borrow().finished.get() {
            return;
        }

        let step = {
            let mut guard = driver.borrow_mut();
            match entry {
                Entry::Resume(input) => guard.resumable.resume(input),
                Entry::Throw(error) => guard.resumable.throw_into(error),
            }
        };

        match step {
            Step::Suspended(Yielded::Promise(promise)) => {
                let driver = driver.clone();
                promise.subscribe(move |outcome| match outcome {
                    Ok(value) => Driver::step(&driver, Entry::Resume(Some(value))),
                    Err(error) => Driver::step(&driver, Entry::Throw(error)),
                });
            }

            Step::Suspended(Yielded::Value(value)) => {
                let reactor = driver.borrow().reactor.clone();
                let driver = driver.clone();
                reactor.defer(move || {
                    Driver::step(&driver, Entry::Resume(Some(value)));
                    Ok(())
                });
            }

            Step::Completed(value) => Driver::finish(driver, Ok(value)),
            Step::Failed(error) => Driver::finish(driver, Err(error)),
        }
    }

    /// Settles the coroutine's own deferred, scheduled through the
    /// reactor like every other settlement observation.
    fn finish(driver: &Rc<RefCell<Driver<R>>>, outcome: Result<R::Output>) {
        let reactor = {
            let guard = driver.borrow();
            guard.finished.set(true);
            guard.running.set(false);
            guard.reactor.clone()
        };

        let driver = driver.clone();
        reactor.defer(move || {
            let guard = driver.borrow();
            guard.completed.set(true);
            match outcome {
                Ok(value) => guard.deferred.resolve(value),
                Err(error) => guard.deferred.reject(error),
            }
            Ok(())
        });
    }
}
