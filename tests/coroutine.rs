use gyre::time::sleep;
use gyre::{Coroutine, Error, Promise, Reactor, Resumable, Settle, Step, Yielded};

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

type Seen<T> = Rc<RefCell<Option<Result<T, Error>>>>;

fn observe<T: Clone + 'static>(promise: &Promise<T>) -> Seen<T> {
    let seen: Seen<T> = Rc::new(RefCell::new(None));

    let fulfilled = seen.clone();
    let rejected = seen.clone();
    promise.then_catch(
        move |value| {
            *fulfilled.borrow_mut() = Some(Ok(value));
            Settle::Value(())
        },
        move |error| {
            *rejected.borrow_mut() = Some(Err(error));
            Settle::Value(())
        },
    );

    seen
}

fn value_after(reactor: &Reactor, value: i32, ms: u64) -> Promise<i32> {
    sleep(reactor, Duration::from_millis(ms)).then(move |()| Settle::Value(value))
}

/// `yield A; yield B; return A + B` over two timer-backed promises.
struct SumOfTwo {
    reactor: Reactor,
    stage: u8,
    first: i32,
}

impl Resumable for SumOfTwo {
    type Yield = i32;
    type Output = i32;

    fn resume(&mut self, input: Option<i32>) -> Step<i32, i32> {
        self.stage += 1;
        match self.stage {
            1 => Step::Suspended(Yielded::Promise(value_after(&self.reactor, 10, 10))),
            2 => {
                self.first = input.unwrap();
                Step::Suspended(Yielded::Promise(value_after(&self.reactor, 20, 10)))
            }
            _ => Step::Completed(self.first + input.unwrap()),
        }
    }

    fn throw_into(&mut self, error: Error) -> Step<i32, i32> {
        Step::Failed(error)
    }
}

#[test]
fn test_coroutine_sums_two_awaited_promises() {
    let reactor = Reactor::new();

    let coroutine = Coroutine::spawn(
        &reactor,
        SumOfTwo {
            reactor: reactor.clone(),
            stage: 0,
            first: 0,
        },
    );

    assert!(coroutine.is_running());
    assert!(!coroutine.is_completed());

    let seen = observe(&coroutine.promise());
    reactor.run().unwrap();

    assert!(matches!(*seen.borrow(), Some(Ok(30))));
    assert!(!coroutine.is_running());
    assert!(coroutine.is_completed());
}

/// Suspends once, then raises.
struct FailsAfterSuspend {
    reactor: Reactor,
    stage: u8,
}

impl Resumable for FailsAfterSuspend {
    type Yield = i32;
    type Output = i32;

    fn resume(&mut self, _input: Option<i32>) -> Step<i32, i32> {
        self.stage += 1;
        match self.stage {
            1 => Step::Suspended(Yielded::Promise(value_after(&self.reactor, 1, 5))),
            _ => Step::Failed(Error::msg("exploded")),
        }
    }

    fn throw_into(&mut self, error: Error) -> Step<i32, i32> {
        Step::Failed(error)
    }
}

#[test]
fn test_unhandled_failure_rejects_the_coroutine_promise() {
    let reactor = Reactor::new();

    let coroutine = Coroutine::spawn(
        &reactor,
        FailsAfterSuspend {
            reactor: reactor.clone(),
            stage: 0,
        },
    );

    let seen = observe(&coroutine.promise());
    reactor.run().unwrap();

    assert!(
        matches!(*seen.borrow(), Some(Err(Error::Message(ref m))) if m == "exploded"),
        "the coroutine promise must reject with the exact failure raised"
    );
    assert!(!coroutine.is_running());
    assert!(coroutine.is_completed());
}

/// Suspends on a plain value, which must be echoed back on the next tick.
struct EchoesPlainValue {
    stage: u8,
}

impl Resumable for EchoesPlainValue {
    type Yield = i32;
    type Output = i32;

    fn resume(&mut self, input: Option<i32>) -> Step<i32, i32> {
        self.stage += 1;
        match self.stage {
            1 => Step::Suspended(Yielded::Value(5)),
            _ => Step::Completed(input.unwrap()),
        }
    }

    fn throw_into(&mut self, error: Error) -> Step<i32, i32> {
        Step::Failed(error)
    }
}

#[test]
fn test_plain_yield_is_echoed_on_the_next_tick() {
    let reactor = Reactor::new();

    let coroutine = Coroutine::spawn(&reactor, EchoesPlainValue { stage: 0 });

    assert!(
        coroutine.is_running(),
        "a plain-value suspend is a scheduling boundary, not a synchronous step"
    );

    let seen = observe(&coroutine.promise());
    reactor.run().unwrap();

    assert!(matches!(*seen.borrow(), Some(Ok(5))));
}

/// Awaits a promise that rejects, and recovers locally.
struct RecoversLocally {
    reactor: Reactor,
    stage: u8,
}

impl Resumable for RecoversLocally {
    type Yield = i32;
    type Output = i32;

    fn resume(&mut self, _input: Option<i32>) -> Step<i32, i32> {
        self.stage += 1;
        match self.stage {
            1 => Step::Suspended(Yielded::Promise(Promise::rejected(
                &self.reactor,
                Error::msg("transient"),
            ))),
            _ => Step::Completed(0),
        }
    }

    fn throw_into(&mut self, _error: Error) -> Step<i32, i32> {
        // Local recovery block at the suspend point.
        Step::Completed(-1)
    }
}

#[test]
fn test_rejection_is_raised_at_the_suspend_point() {
    let reactor = Reactor::new();

    let coroutine = Coroutine::spawn(
        &reactor,
        RecoversLocally {
            reactor: reactor.clone(),
            stage: 0,
        },
    );

    let seen = observe(&coroutine.promise());
    reactor.run().unwrap();

    assert!(
        matches!(*seen.borrow(), Some(Ok(-1))),
        "the computation must get the chance to handle the rejection locally"
    );
}

/// Completes without ever suspending.
struct NeverSuspends;

impl Resumable for NeverSuspends {
    type Yield = i32;
    type Output = i32;

    fn resume(&mut self, _input: Option<i32>) -> Step<i32, i32> {
        Step::Completed(7)
    }

    fn throw_into(&mut self, error: Error) -> Step<i32, i32> {
        Step::Failed(error)
    }
}

#[test]
fn test_immediate_completion_still_settles_asynchronously() {
    let reactor = Reactor::new();

    let coroutine = Coroutine::spawn(&reactor, NeverSuspends);

    assert!(!coroutine.is_running(), "the first step runs synchronously");
    assert!(
        !coroutine.is_completed(),
        "settlement itself is scheduled through the loop"
    );

    let seen = observe(&coroutine.promise());
    reactor.run().unwrap();

    assert!(matches!(*seen.borrow(), Some(Ok(7))));
    assert!(coroutine.is_completed());
}
