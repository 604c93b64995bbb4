//! Functions composing multiple promises into one.

use super::core::Promise;
use crate::error::{Error, Result};
use crate::reactor::Reactor;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

impl<T: Clone + 'static> Promise<T> {
    /// Returns a promise already scheduled to fulfill with `value`.
    ///
    /// Observation stays asynchronous: handlers attached to the returned
    /// promise run on a later tick, exactly as for any settled promise.
    /// In a typed API there is no "resolve with a promise" case to handle
    /// here; adoption is spelled [`Settle::Adopt`] or [`Deferred::adopt`].
    ///
    /// [`Settle::Adopt`]: super::Settle::Adopt
    /// [`Deferred::adopt`]: super::Deferred::adopt
    pub fn resolved(reactor: &Reactor, value: T) -> Promise<T> {
        let (promise, deferred) = Promise::pair(reactor);
        deferred.resolve(value);
        promise
    }

    /// Returns a promise already scheduled to reject with `error`.
    pub fn rejected(reactor: &Reactor, error: Error) -> Promise<T> {
        let (promise, deferred) = Promise::pair(reactor);
        deferred.reject(error);
        promise
    }

    /// Fulfills with every input's value, in input order, once all inputs
    /// fulfill.
    ///
    /// Rejects with the first rejection observed; the remaining promises'
    /// settlements are then ignored, not cancelled, since cancellation is
    /// not a promise capability. An empty input fulfills immediately with
    /// an empty vector.
    pub fn all(reactor: &Reactor, promises: Vec<Promise<T>>) -> Promise<Vec<T>> {
        let (promise, deferred) = Promise::pair(reactor);

        if promises.is_empty() {
            deferred.resolve(Vec::new());
            return promise;
        }

        let deferred = Rc::new(deferred);
        let values: Rc<RefCell<Vec<Option<T>>>> =
            Rc::new(RefCell::new(vec![None; promises.len()]));
        let missing = Rc::new(Cell::new(promises.len()));

        for (index, input) in promises.iter().enumerate() {
            let deferred = deferred.clone();
            let values = values.clone();
            let missing = missing.clone();

            input.subscribe(move |outcome| match outcome {
                Ok(value) => {
                    values.borrow_mut()[index] = Some(value);
                    missing.set(missing.get() - 1);

                    if missing.get() == 0 {
                        let values = values.borrow_mut().drain(..).flatten().collect();
                        deferred.resolve(values);
                    }
                }
                Err(error) => deferred.reject(error),
            });
        }

        promise
    }

    /// Fulfills with every input's outcome, in input order, once all
    /// inputs settle, rejections included.
    pub fn all_settled(reactor: &Reactor, promises: Vec<Promise<T>>) -> Promise<Vec<Result<T>>> {
        let (promise, deferred) = Promise::pair(reactor);

        if promises.is_empty() {
            deferred.resolve(Vec::new());
            return promise;
        }

        let deferred = Rc::new(deferred);
        let outcomes: Rc<RefCell<Vec<Option<Result<T>>>>> =
            Rc::new(RefCell::new(vec![None; promises.len()]));
        let missing = Rc::new(Cell::new(promises.len()));

        for (index, input) in promises.iter().enumerate() {
            let deferred = deferred.clone();
            let outcomes = outcomes.clone();
            let missing = missing.clone();

            input.subscribe(move |outcome| {
                outcomes.borrow_mut()[index] = Some(outcome);
                missing.set(missing.get() - 1);

                if missing.get() == 0 {
                    let outcomes = outcomes.borrow_mut().drain(..).flatten().collect();
                    deferred.resolve(outcomes);
                }
            });
        }

        promise
    }

    /// Fulfills with the first value any input fulfills with.
    ///
    /// Rejects only once *all* inputs have rejected, with
    /// [`Error::Aggregate`] carrying every reason in input order. An empty
    /// input rejects with [`Error::NoInput`]: with nothing that could ever
    /// settle, rejection is the distinguished terminal state, not a hang.
    pub fn any(reactor: &Reactor, promises: Vec<Promise<T>>) -> Promise<T> {
        let (promise, deferred) = Promise::pair(reactor);

        if promises.is_empty() {
            deferred.reject(Error::NoInput("any"));
            return promise;
        }

        let deferred = Rc::new(deferred);
        let reasons: Rc<RefCell<Vec<Option<Error>>>> =
            Rc::new(RefCell::new(vec![None; promises.len()]));
        let missing = Rc::new(Cell::new(promises.len()));

        for (index, input) in promises.iter().enumerate() {
            let deferred = deferred.clone();
            let reasons = reasons.clone();
            let missing = missing.clone();

            input.subscribe(move |outcome| match outcome {
                Ok(value) => deferred.resolve(value),
                Err(error) => {
                    reasons.borrow_mut()[index] = Some(error);
                    missing.set(missing.get() - 1);

                    if missing.get() == 0 {
                        let reasons = reasons.borrow_mut().drain(..).flatten().collect();
                        deferred.reject(Error::Aggregate(reasons));
                    }
                }
            });
        }

        promise
    }

    /// Settles exactly like whichever input settles first, by either
    /// outcome.
    ///
    /// An empty input rejects with [`Error::NoInput`], same as
    /// [`any`](Promise::any).
    pub fn race(reactor: &Reactor, promises: Vec<Promise<T>>) -> Promise<T> {
        let (promise, deferred) = Promise::pair(reactor);

        if promises.is_empty() {
            deferred.reject(Error::NoInput("race"));
            return promise;
        }

        let deferred = Rc::new(deferred);

        for input in &promises {
            let deferred = deferred.clone();

            input.subscribe(move |outcome| match outcome {
                Ok(value) => deferred.resolve(value),
                Err(error) => deferred.reject(error),
            });
        }

        promise
    }
}
