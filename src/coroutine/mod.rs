//! Coroutine driver for resumable computations.
//!
//! A [`Coroutine`] steps a [`Resumable`] computation forward each time a
//! promise it is waiting on settles, translating suspend points into
//! promise subscriptions and resumptions into reactor-scheduled
//! continuations. The computation never blocks the loop; it only parks.

mod core;
mod resumable;

pub use resumable::{Resumable, Step, Yielded};
pub use self::core::Coroutine;
