use super::Reactor;
use super::poller::Poller;
use crate::error::Error;

/// Builder for configuring and creating a reactor.
///
/// `ReactorBuilder` selects the polling backend and optionally installs
/// the process-wide error handler before the loop is constructed.
///
/// # Examples
///
/// ```rust,ignore
/// let reactor = ReactorBuilder::new()
///     .poller(EpollPoller::new()?)
///     .error_handler(|err| eprintln!("callback failed: {err}"))
///     .build();
/// ```
pub struct ReactorBuilder {
    /// Polling backend; the portable default when not set.
    poller: Option<Box<dyn Poller>>,

    /// Process-wide error handler; failures propagate out of `run` when
    /// not set.
    error_handler: Option<Box<dyn FnMut(Error)>>,
}

impl ReactorBuilder {
    /// Creates a new `ReactorBuilder` with default configuration.
    pub fn new() -> Self {
        Self {
            poller: None,
            error_handler: None,
        }
    }

    /// Selects the polling backend.
    pub fn poller(mut self, poller: impl Poller + 'static) -> Self {
        self.poller = Some(Box::new(poller));
        self
    }

    /// Installs the process-wide error handler.
    pub fn error_handler(mut self, handler: impl FnMut(Error) + 'static) -> Self {
        self.error_handler = Some(Box::new(handler));
        self
    }

    /// Builds the reactor with the configured options.
    pub fn build(self) -> Reactor {
        let poller = self.poller.unwrap_or_else(super::poller::default_poller);
        Reactor::with_parts(poller, self.error_handler)
    }
}

impl Default for ReactorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
