use gyre::{Reactor, WatcherId};

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

#[test]
fn test_delay_fires_after_duration() {
    let reactor = Reactor::new();
    let fired = Rc::new(Cell::new(false));
    let start = Instant::now();

    {
        let fired = fired.clone();
        reactor.delay(Duration::from_millis(30), move || {
            fired.set(true);
            Ok(())
        });
    }

    reactor.run().unwrap();

    assert!(fired.get());
    assert!(
        start.elapsed() >= Duration::from_millis(30),
        "a timer must not fire before its deadline"
    );
}

#[test]
fn test_delay_zero_is_still_asynchronous() {
    let reactor = Reactor::new();
    let fired = Rc::new(Cell::new(false));

    {
        let fired = fired.clone();
        reactor.delay(Duration::ZERO, move || {
            fired.set(true);
            Ok(())
        });
    }

    assert!(!fired.get(), "a zero delay must not run on the caller's stack");

    reactor.run().unwrap();

    assert!(fired.get());
}

#[test]
fn test_timers_fire_in_deadline_order() {
    let reactor = Reactor::new();
    let order = Rc::new(RefCell::new(Vec::new()));

    {
        let order = order.clone();
        reactor.delay(Duration::from_millis(30), move || {
            order.borrow_mut().push(2);
            Ok(())
        });
    }

    {
        let order = order.clone();
        reactor.delay(Duration::from_millis(10), move || {
            order.borrow_mut().push(1);
            Ok(())
        });
    }

    reactor.run().unwrap();

    assert_eq!(*order.borrow(), vec![1, 2]);
}

#[test]
fn test_equal_deadlines_fire_in_registration_order() {
    let reactor = Reactor::new();
    let order = Rc::new(RefCell::new(Vec::new()));

    for i in 1..=4 {
        let order = order.clone();
        reactor.delay(Duration::from_millis(15), move || {
            order.borrow_mut().push(i);
            Ok(())
        });
    }

    reactor.run().unwrap();

    assert_eq!(*order.borrow(), vec![1, 2, 3, 4]);
}

#[test]
fn test_cancel_timer_before_it_fires() {
    let reactor = Reactor::new();
    let fired = Rc::new(Cell::new(false));

    let id = {
        let fired = fired.clone();
        reactor.delay(Duration::from_millis(10), move || {
            fired.set(true);
            Ok(())
        })
    };

    reactor.cancel(id);
    reactor.run().unwrap();

    assert!(!fired.get(), "a cancelled timer must never fire");
}

#[test]
fn test_repeat_fires_until_cancelled() {
    let reactor = Reactor::new();
    let count = Rc::new(Cell::new(0));
    let id_cell: Rc<Cell<Option<WatcherId>>> = Rc::new(Cell::new(None));
    let start = Instant::now();

    let id = {
        let count = count.clone();
        let id_cell = id_cell.clone();
        let canceller = reactor.clone();
        reactor.repeat(Duration::from_millis(10), move || {
            count.set(count.get() + 1);
            if count.get() == 5 {
                canceller.cancel(id_cell.get().unwrap());
            }
            Ok(())
        })
    };
    id_cell.set(Some(id));

    reactor.run().unwrap();

    assert_eq!(count.get(), 5, "no firing may be observed after cancel");
    assert!(start.elapsed() >= Duration::from_millis(50));
}

#[test]
fn test_repeat_does_not_accumulate_drift() {
    let reactor = Reactor::new();
    let count = Rc::new(Cell::new(0));
    let id_cell: Rc<Cell<Option<WatcherId>>> = Rc::new(Cell::new(None));
    let start = Instant::now();

    // Each firing burns half the interval; with re-arming anchored to the
    // previous deadline the fourth firing still lands near 4 * interval.
    let id = {
        let count = count.clone();
        let id_cell = id_cell.clone();
        let canceller = reactor.clone();
        reactor.repeat(Duration::from_millis(20), move || {
            std::thread::sleep(Duration::from_millis(10));
            count.set(count.get() + 1);
            if count.get() == 4 {
                canceller.cancel(id_cell.get().unwrap());
            }
            Ok(())
        })
    };
    id_cell.set(Some(id));

    reactor.run().unwrap();
    let elapsed = start.elapsed();

    assert_eq!(count.get(), 4);
    assert!(elapsed >= Duration::from_millis(75), "fired early: {elapsed:?}");
    assert!(
        elapsed < Duration::from_millis(115),
        "callback execution time accumulated as drift: {elapsed:?}"
    );
}

#[test]
fn test_cancel_repeat_from_its_own_callback() {
    let reactor = Reactor::new();
    let count = Rc::new(Cell::new(0));
    let id_cell: Rc<Cell<Option<WatcherId>>> = Rc::new(Cell::new(None));

    let id = {
        let count = count.clone();
        let id_cell = id_cell.clone();
        let canceller = reactor.clone();
        reactor.repeat(Duration::from_millis(5), move || {
            count.set(count.get() + 1);
            canceller.cancel(id_cell.get().unwrap());
            Ok(())
        })
    };
    id_cell.set(Some(id));

    reactor.run().unwrap();

    assert_eq!(count.get(), 1);
}
