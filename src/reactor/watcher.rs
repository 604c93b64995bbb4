use crate::error::Result;

use std::cell::RefCell;
use std::rc::Rc;

/// Identifier of one registered watcher.
///
/// Returned by every scheduling operation on the reactor and accepted by
/// [`Reactor::cancel`](super::Reactor::cancel). Identifiers are never reused
/// within one reactor, so a callback may freely re-register work without
/// colliding with the watcher being torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatcherId(pub(crate) u64);

/// A one-shot callback, consumed when it fires.
pub(crate) type OnceCallback = Box<dyn FnOnce() -> Result<()>>;

/// A persistent callback, invoked every time its watcher fires.
///
/// Shared behind `Rc<RefCell<_>>` so the reactor can release its own state
/// borrow before invoking it; the callback is then free to re-enter the
/// reactor (register, cancel, stop) while it runs.
pub(crate) type RepeatCallback = Rc<RefCell<dyn FnMut() -> Result<()>>>;

/// Readiness direction a watcher is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Read,
    Write,
}
