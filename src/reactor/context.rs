use super::Reactor;

use std::cell::RefCell;

thread_local! {
    /// Thread-local default reactor.
    ///
    /// Created lazily on first access. Components take an explicit
    /// `&Reactor` everywhere; this instance only exists so applications
    /// with a single loop do not have to thread the handle through
    /// every call site.
    static CURRENT_REACTOR: RefCell<Option<Reactor>> = const { RefCell::new(None) };
}

/// Returns this thread's default reactor, creating it on first use.
///
/// The runtime is single-threaded by construction, so "process-wide"
/// means "per thread that chooses to run a loop"; handles are not
/// sendable across threads.
pub fn current() -> Reactor {
    CURRENT_REACTOR.with(|cell| {
        cell.borrow_mut()
            .get_or_insert_with(Reactor::new)
            .clone()
    })
}
