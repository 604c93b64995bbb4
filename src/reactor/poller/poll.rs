//! Portable `poll(2)`-based backend.
//!
//! This is the default backend on Unix targets. It keeps a registration
//! table and rebuilds the `pollfd` array on every call, which is O(n) per
//! poll but requires no setup syscalls, works on every Unix, and watches
//! any descriptor kind `poll(2)` accepts.
//!
//! High-throughput deployments can swap in [`EpollPoller`](super::EpollPoller)
//! through the reactor builder; the semantics are identical.

use super::common::{Interest, timeout_ms};
use super::{Poller, RawFd};
use crate::reactor::event::Event;

use libc::{POLLERR, POLLHUP, POLLIN, POLLNVAL, POLLOUT, pollfd};
use std::collections::HashMap;
use std::io;
use std::time::Duration;

/// Portable poller backed by `poll(2)`.
pub struct PollPoller {
    /// Registered descriptors: `fd → interest`.
    reg: HashMap<RawFd, Interest>,

    /// Reusable `pollfd` buffer.
    fds: Vec<pollfd>,
}

impl PollPoller {
    /// Creates a new `PollPoller`.
    ///
    /// Needs no OS resources, so construction cannot fail.
    pub fn new() -> Self {
        Self {
            reg: HashMap::new(),
            fds: Vec::new(),
        }
    }
}

impl Default for PollPoller {
    fn default() -> Self {
        Self::new()
    }
}

impl Poller for PollPoller {
    fn register(&mut self, fd: RawFd, interest: Interest) -> io::Result<()> {
        self.reg.insert(fd, interest);
        Ok(())
    }

    fn reregister(&mut self, fd: RawFd, interest: Interest) -> io::Result<()> {
        self.reg.insert(fd, interest);
        Ok(())
    }

    fn deregister(&mut self, fd: RawFd) -> io::Result<()> {
        self.reg.remove(&fd);
        Ok(())
    }

    fn poll(&mut self, events: &mut Vec<Event>, timeout: Option<Duration>) -> io::Result<()> {
        events.clear();

        self.fds.clear();
        for (&fd, &interest) in self.reg.iter() {
            let mut flags = 0;
            if interest.read {
                flags |= POLLIN;
            }
            if interest.write {
                flags |= POLLOUT;
            }

            self.fds.push(pollfd {
                fd,
                events: flags,
                revents: 0,
            });
        }

        let rc = unsafe {
            libc::poll(
                self.fds.as_mut_ptr(),
                self.fds.len() as libc::nfds_t,
                timeout_ms(timeout),
            )
        };

        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(());
            }
            return Err(err);
        }

        for pfd in &self.fds {
            if pfd.revents == 0 {
                continue;
            }

            let error = pfd.revents & (POLLERR | POLLHUP | POLLNVAL) != 0;

            events.push(Event {
                fd: pfd.fd,
                readable: pfd.revents & POLLIN != 0 || error,
                writable: pfd.revents & POLLOUT != 0 || error,
            });
        }

        Ok(())
    }
}
