use super::deferred::Deferred;
use crate::error::{Error, Result};
use crate::reactor::Reactor;

use std::cell::RefCell;
use std::rc::Rc;

/// Settlement state of a promise.
///
/// The state transitions exactly once, from `Pending` to one of the two
/// terminal states; after that it is immutable.
pub(crate) enum State<T> {
    Pending,
    Fulfilled(T),
    Rejected(Error),
}

/// What a handler hands back to the runtime.
///
/// The closed sum covering the three things a handler body can do with the
/// downstream promise: settle it with a plain value, make it adopt another
/// promise's eventual settlement, or reject it. Returning `Adopt` is the
/// typed form of "returning a thenable": a promise can never be fulfilled
/// *with* a promise as its value.
pub enum Settle<T: 'static> {
    /// Fulfill the downstream promise with this value.
    Value(T),

    /// Make the downstream promise follow this promise's settlement.
    Adopt(Promise<T>),

    /// Reject the downstream promise.
    Fail(Error),
}

pub(crate) struct Shared<T: 'static> {
    pub(crate) reactor: Reactor,
    pub(crate) state: State<T>,
    pub(crate) handlers: Vec<Box<dyn FnOnce(Result<T>)>>,
}

/// A write-once container for a future value or failure.
///
/// A `Promise` is a cheap cloneable handle; clones observe the same
/// settlement. It is settled through its [`Deferred`], and observed by
/// chaining handlers with [`then`](Promise::then), [`catch`](Promise::catch),
/// and [`finally`](Promise::finally).
///
/// The central scheduling contract: **every** handler invocation is
/// dispatched through the reactor's deferred queue, never on the call stack
/// that attached the handler or settled the promise, even when the handler
/// is attached to an already-settled promise. Stack depth therefore stays
/// bounded regardless of chain length, and handler ordering is FIFO across
/// independently constructed chains.
///
/// Handlers need the value, and several handlers may be attached to one
/// promise, so observation requires `T: Clone`; each handler receives its
/// own copy.
///
/// A promise has no cancellation: once created it settles or stays pending
/// forever. Timeout semantics are built externally by racing against a
/// timer-backed rejection, see [`time::timeout`](crate::time::timeout).
pub struct Promise<T: 'static> {
    pub(crate) shared: Rc<RefCell<Shared<T>>>,
}

impl<T: 'static> Promise<T> {
    /// Creates a pending promise together with its settle capability.
    pub fn pair(reactor: &Reactor) -> (Promise<T>, Deferred<T>) {
        let shared = Rc::new(RefCell::new(Shared {
            reactor: reactor.clone(),
            state: State::Pending,
            handlers: Vec::new(),
        }));

        (
            Promise {
                shared: shared.clone(),
            },
            Deferred { shared },
        )
    }

    pub(crate) fn reactor(&self) -> Reactor {
        self.shared.borrow().reactor.clone()
    }
}

impl<T: Clone + 'static> Promise<T> {
    /// Creates a promise settled by an executor callback.
    ///
    /// The executor runs synchronously, right here; only settlement
    /// observation is asynchronous. An `Err` returned by the executor
    /// rejects the promise, unless the executor already settled it.
    pub fn new(reactor: &Reactor, executor: impl FnOnce(Deferred<T>) -> Result<()>) -> Promise<T> {
        let (promise, deferred) = Promise::pair(reactor);

        if let Err(failure) = executor(deferred) {
            Shared::settle(&promise.shared, Err(failure));
        }

        promise
    }

    /// Registers a raw observer for this promise's settlement.
    ///
    /// This is the one subscription primitive `then`/`catch`/`finally`,
    /// the combinators, and the coroutine driver are all built on. The
    /// observer is always invoked through `Reactor::defer`, on a tick
    /// strictly after the attach or the settlement, whichever happens
    /// later.
    pub(crate) fn subscribe(&self, handler: impl FnOnce(Result<T>) + 'static) {
        let mut shared = self.shared.borrow_mut();

        let outcome = match &shared.state {
            State::Pending => {
                shared.handlers.push(Box::new(handler));
                return;
            }
            State::Fulfilled(value) => Ok(value.clone()),
            State::Rejected(error) => Err(error.clone()),
        };

        let reactor = shared.reactor.clone();
        drop(shared);

        reactor.defer(move || {
            handler(outcome);
            Ok(())
        });
    }

    /// Chains a fulfillment handler; rejection passes through unchanged.
    ///
    /// Returns a new promise settled by the handler's [`Settle`] outcome.
    pub fn then<U>(&self, on_fulfilled: impl FnOnce(T) -> Settle<U> + 'static) -> Promise<U>
    where
        U: Clone + 'static,
    {
        let (promise, deferred) = Promise::pair(&self.reactor());

        self.subscribe(move |outcome| match outcome {
            Ok(value) => deferred.settle_with(on_fulfilled(value)),
            Err(error) => deferred.reject(error),
        });

        promise
    }

    /// Chains both a fulfillment and a rejection handler.
    pub fn then_catch<U>(
        &self,
        on_fulfilled: impl FnOnce(T) -> Settle<U> + 'static,
        on_rejected: impl FnOnce(Error) -> Settle<U> + 'static,
    ) -> Promise<U>
    where
        U: Clone + 'static,
    {
        let (promise, deferred) = Promise::pair(&self.reactor());

        self.subscribe(move |outcome| match outcome {
            Ok(value) => deferred.settle_with(on_fulfilled(value)),
            Err(error) => deferred.settle_with(on_rejected(error)),
        });

        promise
    }

    /// Chains a rejection handler; fulfillment passes through unchanged.
    ///
    /// The handler may recover (`Settle::Value`/`Settle::Adopt`) or
    /// re-raise (`Settle::Fail`).
    pub fn catch(&self, on_rejected: impl FnOnce(Error) -> Settle<T> + 'static) -> Promise<T> {
        let (promise, deferred) = Promise::pair(&self.reactor());

        self.subscribe(move |outcome| match outcome {
            Ok(value) => deferred.resolve(value),
            Err(error) => deferred.settle_with(on_rejected(error)),
        });

        promise
    }

    /// Runs `on_finally` regardless of outcome.
    ///
    /// The callback observes neither value nor reason and cannot alter
    /// them, unless it fails itself, in which case its failure supersedes
    /// the original outcome.
    pub fn finally(&self, on_finally: impl FnOnce() -> Result<()> + 'static) -> Promise<T> {
        let (promise, deferred) = Promise::pair(&self.reactor());

        self.subscribe(move |outcome| match on_finally() {
            Err(failure) => deferred.reject(failure),
            Ok(()) => match outcome {
                Ok(value) => deferred.resolve(value),
                Err(error) => deferred.reject(error),
            },
        });

        promise
    }
}

impl<T: Clone + 'static> Shared<T> {
    /// Settles the promise, exactly once.
    ///
    /// Settling an already-settled promise is a no-op, which is what makes
    /// `Deferred::resolve`/`reject` idempotent. Queued handlers are each
    /// dispatched through the reactor in attach order.
    pub(crate) fn settle(shared: &Rc<RefCell<Shared<T>>>, outcome: Result<T>) {
        let (reactor, handlers) = {
            let mut shared = shared.borrow_mut();

            if !matches!(shared.state, State::Pending) {
                return;
            }

            shared.state = match &outcome {
                Ok(value) => State::Fulfilled(value.clone()),
                Err(error) => State::Rejected(error.clone()),
            };

            (shared.reactor.clone(), std::mem::take(&mut shared.handlers))
        };

        for handler in handlers {
            let outcome = outcome.clone();
            reactor.defer(move || {
                handler(outcome);
                Ok(())
            });
        }
    }
}

impl<T: 'static> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}
