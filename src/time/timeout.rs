use super::sleep::sleep;
use crate::error::Error;
use crate::promise::{Promise, Settle};
use crate::reactor::Reactor;

use std::time::Duration;

/// Bounds a promise's settlement time.
///
/// Built the only way the runtime builds timeouts: racing the subject
/// promise against a timer-backed rejection. If the deadline wins, the
/// returned promise rejects with [`Error::Timeout`]; the subject promise
/// keeps running to its own settlement, which is then ignored.
pub fn timeout<T>(reactor: &Reactor, duration: Duration, promise: Promise<T>) -> Promise<T>
where
    T: Clone + 'static,
{
    let deadline = sleep(reactor, duration).then(move |()| Settle::Fail(Error::Timeout(duration)));

    Promise::race(reactor, vec![promise, deadline])
}
