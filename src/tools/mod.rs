//! Utilities layered on the promise engine.

mod retry;

#[doc(inline)]
pub use retry::retry;
