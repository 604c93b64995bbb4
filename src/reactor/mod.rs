//! Reactor core and watcher management.
//!
//! This module implements the loop at the heart of the runtime. The
//! reactor is responsible for:
//! - running deferred callbacks in FIFO order,
//! - firing one-shot and repeating timers,
//! - dispatching descriptor readiness reported by the polling backend.
//!
//! Everything else (promise settlement, coroutine resumption, the time
//! and tools helpers) submits work to the reactor through `defer`,
//! `delay`, `repeat`, and the readiness watchers; nothing bypasses it.

mod builder;
mod context;
mod core;
mod event;
mod registry;
mod timer;
mod watcher;

pub mod poller;

pub use builder::ReactorBuilder;
pub use context::current;
pub use event::Event;
pub use self::core::Reactor;
pub use watcher::WatcherId;
