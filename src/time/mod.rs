//! Time utilities built on reactor timers.
//!
//! - [`sleep`] — a promise that fulfills after a duration,
//! - [`timeout`] — bound a promise's settlement time by racing it against
//!   a deadline.

mod sleep;
mod timeout;

#[doc(inline)]
pub use sleep::sleep;

#[doc(inline)]
pub use timeout::timeout;
