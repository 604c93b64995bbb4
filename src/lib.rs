//! # Gyre
//!
//! **Gyre** is a cooperative concurrency runtime built from three pieces:
//! a single-threaded reactor multiplexing timers and descriptor readiness,
//! a promise engine for composable deferred results, and a coroutine
//! driver that lets sequential-looking computations suspend at
//! asynchronous boundaries without blocking the loop.
//!
//! Unlike executor-based runtimes, Gyre has no tasks and no wakers:
//! everything is a callback submitted to one [`Reactor`], and the promise
//! and coroutine layers exist to keep those callbacks composable. Three
//! guarantees hold throughout:
//!
//! - **No synchronous re-entrancy** — every promise handler and coroutine
//!   resumption is dispatched through the reactor's deferred queue, never
//!   on the call stack that attached or settled it.
//! - **Deterministic ordering** — deferred callbacks run in FIFO order
//!   before the tick's timers and readiness; timers fire in deadline
//!   order with registration order as tie-break.
//! - **Exactly-once settlement** — a promise settles once; later resolve
//!   and reject calls are idempotent no-ops.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gyre::time::sleep;
//! use gyre::{Reactor, Settle};
//! use std::time::Duration;
//!
//! let reactor = Reactor::new();
//!
//! sleep(&reactor, Duration::from_millis(100)).then(|()| {
//!     println!("one tick, one hundred milliseconds later");
//!     Settle::Value(())
//! });
//!
//! reactor.run().unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`reactor`] — the loop: deferred callbacks, timers, readiness watchers
//! - [`promise`] — promises, deferreds, and the `all`/`any`/`race` combinators
//! - [`coroutine`] — the resumable-computation driver
//! - [`time`] — `sleep` and `timeout`
//! - [`tools`] — `retry` and friends

mod error;

pub mod coroutine;
pub mod promise;
pub mod reactor;
pub mod time;
pub mod tools;

pub use coroutine::{Coroutine, Resumable, Step, Yielded};
pub use error::{Error, Result};
pub use promise::{Deferred, Promise, Settle};
pub use reactor::{Reactor, ReactorBuilder, WatcherId};
