use super::poller::RawFd;

/// A readiness event reported by the poller.
///
/// An `Event` carries readiness information for a registered descriptor.
/// It is produced by the polling backend and consumed by the reactor to
/// dispatch the matching readiness watchers.
#[derive(Debug, Clone, Copy)]
pub struct Event {
    /// The descriptor the event refers to.
    pub fd: RawFd,

    /// The descriptor is ready for reading (or in an error/hang-up state
    /// that a read would observe).
    pub readable: bool,

    /// The descriptor is ready for writing.
    pub writable: bool,
}
