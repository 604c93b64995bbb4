use super::core::{Promise, Settle, Shared};
use crate::error::Error;

use std::cell::RefCell;
use std::rc::Rc;

/// The exclusive capability to settle one [`Promise`].
///
/// A `Deferred` is produced alongside its promise by
/// [`Promise::pair`] and is deliberately not `Clone`: whoever holds it is
/// the single writer. Both [`resolve`](Deferred::resolve) and
/// [`reject`](Deferred::reject) are idempotent guards, not errors: calling
/// either after settlement does nothing.
pub struct Deferred<T: 'static> {
    pub(crate) shared: Rc<RefCell<Shared<T>>>,
}

impl<T: Clone + 'static> Deferred<T> {
    /// Fulfills the promise with `value`.
    ///
    /// No-op if the promise has already settled.
    pub fn resolve(&self, value: T) {
        Shared::settle(&self.shared, Ok(value));
    }

    /// Rejects the promise with `error`.
    ///
    /// No-op if the promise has already settled.
    pub fn reject(&self, error: Error) {
        Shared::settle(&self.shared, Err(error));
    }

    /// Makes the promise adopt another promise's eventual settlement.
    ///
    /// This is the flattening rule: a promise is never fulfilled with a
    /// promise as its value, it follows the inner settlement instead.
    pub fn adopt(&self, promise: Promise<T>) {
        let shared = self.shared.clone();
        promise.subscribe(move |outcome| Shared::settle(&shared, outcome));
    }

    /// Applies a handler outcome to the promise.
    pub fn settle_with(&self, settle: Settle<T>) {
        match settle {
            Settle::Value(value) => self.resolve(value),
            Settle::Adopt(promise) => self.adopt(promise),
            Settle::Fail(error) => self.reject(error),
        }
    }
}
