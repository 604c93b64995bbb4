use crate::promise::{Deferred, Promise};
use crate::reactor::Reactor;

use std::rc::Rc;
use std::time::Duration;

/// Runs a promise-returning factory until it fulfills.
///
/// On rejection the factory is invoked again, up to `retries` additional
/// attempts, waiting `interval` between attempts (a zero interval retries
/// on the next tick). The returned promise fulfills with the first
/// successful value, or rejects with the last attempt's reason.
pub fn retry<T, F>(reactor: &Reactor, retries: usize, interval: Duration, factory: F) -> Promise<T>
where
    T: Clone + 'static,
    F: FnMut() -> Promise<T> + 'static,
{
    let (promise, deferred) = Promise::pair(reactor);

    attempt(reactor.clone(), Rc::new(deferred), retries, interval, factory);

    promise
}

fn attempt<T, F>(
    reactor: Reactor,
    deferred: Rc<Deferred<T>>,
    remaining: usize,
    interval: Duration,
    mut factory: F,
) where
    T: Clone + 'static,
    F: FnMut() -> Promise<T> + 'static,
{
    factory().subscribe(move |outcome| match outcome {
        Ok(value) => deferred.resolve(value),
        Err(error) => {
            if remaining == 0 {
                deferred.reject(error);
                return;
            }

            let again = reactor.clone();
            let rerun = move || {
                attempt(again, deferred, remaining - 1, interval, factory);
                Ok(())
            };

            if interval.is_zero() {
                reactor.defer(rerun);
            } else {
                reactor.delay(interval, rerun);
            }
        }
    });
}
