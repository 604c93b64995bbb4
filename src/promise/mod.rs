//! Promise engine: deferred-result propagation.
//!
//! A [`Promise`] is a write-once container for a future value or failure;
//! a [`Deferred`] is the exclusive capability to settle one. Handlers chain
//! with [`then`](Promise::then)/[`catch`](Promise::catch)/
//! [`finally`](Promise::finally) and compose with the
//! `all`/`any`/`race` combinators.
//!
//! The engine depends on the reactor for exactly one thing: every handler
//! invocation is scheduled through its deferred queue, guaranteeing that no
//! handler ever runs synchronously inside the call that attached it or
//! settled its promise.

mod combinators;
mod core;
mod deferred;

pub use deferred::Deferred;
pub use self::core::{Promise, Settle};
