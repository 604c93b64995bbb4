use crate::promise::Promise;
use crate::reactor::Reactor;

use std::time::Duration;

/// Returns a promise that fulfills after the given duration.
///
/// A thin promise wrapper over a one-shot reactor timer. A zero duration
/// fulfills on the next tick, still asynchronously, like everything else.
///
/// # Examples
///
/// ```rust,ignore
/// use std::time::Duration;
///
/// sleep(&reactor, Duration::from_millis(10)).then(|()| {
///     // runs ten milliseconds later
///     Settle::Value(())
/// });
/// ```
pub fn sleep(reactor: &Reactor, duration: Duration) -> Promise<()> {
    let (promise, deferred) = Promise::pair(reactor);

    reactor.delay(duration, move || {
        deferred.resolve(());
        Ok(())
    });

    promise
}
