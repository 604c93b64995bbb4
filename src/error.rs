use std::io;
use std::rc::Rc;
use std::time::Duration;

use thiserror::Error;

/// Shorthand for results carrying the crate-wide [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// A failure flowing through the runtime.
///
/// Rejection reasons, callback failures, and backend errors all share this
/// one type so that a single reason can travel through a promise chain and
/// fan out to every attached handler. The type is `Clone` for exactly that
/// reason; OS errors are shared behind an `Rc` since the whole runtime is
/// single-threaded.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A failure raised by user code, carrying its message.
    #[error("{0}")]
    Message(String),

    /// A backend or OS-level failure.
    #[error("i/o error: {0}")]
    Io(Rc<io::Error>),

    /// A promise lost its race against a deadline.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Every input to `any` rejected.
    ///
    /// The reasons appear in the same order as the input promises.
    #[error("all promises rejected ({} reasons)", .0.len())]
    Aggregate(Vec<Error>),

    /// `any` or `race` received no inputs, so no settlement can ever occur.
    #[error("no promises to settle in `{0}`")]
    NoInput(&'static str),
}

impl Error {
    /// Builds a [`Error::Message`] failure from anything string-like.
    pub fn msg(message: impl Into<String>) -> Self {
        Error::Message(message.into())
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error::Io(Rc::new(error))
    }
}
