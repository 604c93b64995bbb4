use gyre::time::sleep;
use gyre::{Error, Promise, Reactor, Settle};

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

/// A promise fulfilling with `value` after `ms` milliseconds.
fn value_after(reactor: &Reactor, value: i32, ms: u64) -> Promise<i32> {
    sleep(reactor, Duration::from_millis(ms)).then(move |()| Settle::Value(value))
}

/// A promise rejecting with `reason` after `ms` milliseconds.
fn failure_after(reactor: &Reactor, reason: &'static str, ms: u64) -> Promise<i32> {
    sleep(reactor, Duration::from_millis(ms)).then(move |()| Settle::Fail(Error::msg(reason)))
}

#[test]
fn test_all_preserves_input_order() {
    let reactor = Reactor::new();

    let slow = value_after(&reactor, 1, 30);
    let fast = Promise::resolved(&reactor, 2);

    let seen = observe(&Promise::all(&reactor, vec![slow, fast]));
    reactor.run().unwrap();

    assert!(
        matches!(*seen.borrow(), Some(Ok(ref values)) if *values == vec![1, 2]),
        "values must follow input order, not settlement order"
    );
}

#[test]
fn test_all_of_nothing_fulfills_immediately() {
    let reactor = Reactor::new();

    let seen = observe(&Promise::<i32>::all(&reactor, Vec::new()));
    reactor.run().unwrap();

    assert!(matches!(*seen.borrow(), Some(Ok(ref values)) if values.is_empty()));
}

#[test]
fn test_all_rejects_with_the_first_rejection() {
    let reactor = Reactor::new();

    let late_ok = value_after(&reactor, 1, 30);
    let early_fail = failure_after(&reactor, "early", 10);

    let seen = observe(&Promise::all(&reactor, vec![late_ok, early_fail]));
    reactor.run().unwrap();

    assert!(
        matches!(*seen.borrow(), Some(Err(Error::Message(ref m))) if m == "early"),
        "the first rejection wins regardless of the other inputs' outcomes"
    );
}

#[test]
fn test_all_settled_reports_every_outcome() {
    let reactor = Reactor::new();

    let ok = Promise::resolved(&reactor, 1);
    let fail = Promise::rejected(&reactor, Error::msg("x"));

    let seen = observe(&Promise::all_settled(&reactor, vec![ok, fail]));
    reactor.run().unwrap();

    let seen = seen.borrow();
    let Some(Ok(outcomes)) = &*seen else {
        panic!("all_settled must fulfill once every input settled");
    };

    assert_eq!(outcomes.len(), 2);
    assert!(matches!(outcomes[0], Ok(1)));
    assert!(matches!(outcomes[1], Err(Error::Message(ref m)) if m == "x"));
}

#[test]
fn test_any_takes_the_first_fulfillment() {
    let reactor = Reactor::new();

    let rejected = Promise::rejected(&reactor, Error::msg("nope"));
    let fulfilled = value_after(&reactor, 7, 10);

    let seen = observe(&Promise::any(&reactor, vec![rejected, fulfilled]));
    reactor.run().unwrap();

    assert!(
        matches!(*seen.borrow(), Some(Ok(7))),
        "an early rejection must not settle `any` while a fulfillment is still possible"
    );
}

#[test]
fn test_any_aggregates_rejections_in_input_order() {
    let reactor = Reactor::new();

    let slow = failure_after(&reactor, "first", 20);
    let fast = failure_after(&reactor, "second", 5);

    let seen = observe(&Promise::any(&reactor, vec![slow, fast]));
    reactor.run().unwrap();

    let seen = seen.borrow();
    let Some(Err(Error::Aggregate(reasons))) = &*seen else {
        panic!("`any` with all inputs rejected must reject with the aggregate reason");
    };

    assert_eq!(reasons.len(), 2);
    assert!(matches!(reasons[0], Error::Message(ref m) if m == "first"));
    assert!(matches!(reasons[1], Error::Message(ref m) if m == "second"));
}

#[test]
fn test_empty_any_and_race_reject() {
    let reactor = Reactor::new();

    let any_seen = observe(&Promise::<i32>::any(&reactor, Vec::new()));
    let race_seen = observe(&Promise::<i32>::race(&reactor, Vec::new()));
    reactor.run().unwrap();

    assert!(matches!(*any_seen.borrow(), Some(Err(Error::NoInput("any")))));
    assert!(matches!(*race_seen.borrow(), Some(Err(Error::NoInput("race")))));
}

#[test]
fn test_race_settles_with_the_first_settlement() {
    let reactor = Reactor::new();

    let late_fail = failure_after(&reactor, "late", 50);
    let early_ok = value_after(&reactor, 7, 10);

    let seen = observe(&Promise::race(&reactor, vec![late_fail, early_ok]));
    reactor.run().unwrap();

    assert!(matches!(*seen.borrow(), Some(Ok(7))));
}

#[test]
fn test_race_propagates_an_early_rejection() {
    let reactor = Reactor::new();

    let early_fail = failure_after(&reactor, "first", 10);
    let late_ok = value_after(&reactor, 1, 30);

    let seen = observe(&Promise::race(&reactor, vec![early_fail, late_ok]));
    reactor.run().unwrap();

    assert!(matches!(*seen.borrow(), Some(Err(Error::Message(ref m))) if m == "first"));
}
