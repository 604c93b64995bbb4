//! Linux `epoll`-based backend.
//!
//! Optional high-performance backend, selected through the reactor builder:
//!
//! ```rust,ignore
//! let reactor = ReactorBuilder::new()
//!     .poller(EpollPoller::new()?)
//!     .build();
//! ```
//!
//! Functionally equivalent to the portable [`PollPoller`](super::PollPoller);
//! registration cost moves from poll time to (de)registration time.

use super::common::{Interest, timeout_ms};
use super::{Poller, RawFd};
use crate::reactor::event::Event;

use libc::{
    EPOLL_CLOEXEC, EPOLL_CTL_ADD, EPOLL_CTL_DEL, EPOLL_CTL_MOD, EPOLLERR, EPOLLHUP, EPOLLIN,
    EPOLLOUT, epoll_create1, epoll_ctl, epoll_event, epoll_wait,
};
use std::io;
use std::time::Duration;

/// Size of the reusable kernel event buffer.
const EVENT_CAPACITY: usize = 64;

/// Linux `epoll` poller.
///
/// Owns the `epoll` instance and a reusable event buffer. Descriptors are
/// identified by their fd, stored in the event payload, so no token
/// indirection is needed.
pub struct EpollPoller {
    /// Epoll instance descriptor.
    epoll: RawFd,

    /// Reusable buffer handed to `epoll_wait`.
    buffer: Vec<epoll_event>,
}

impl EpollPoller {
    /// Creates a new `EpollPoller`.
    pub fn new() -> io::Result<Self> {
        let epoll = unsafe { epoll_create1(EPOLL_CLOEXEC) };
        if epoll < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(Self {
            epoll,
            buffer: vec![epoll_event { events: 0, u64: 0 }; EVENT_CAPACITY],
        })
    }

    fn ctl(&self, op: libc::c_int, fd: RawFd, interest: Option<Interest>) -> io::Result<()> {
        let mut event = epoll_event {
            events: interest.map(flags).unwrap_or(0),
            u64: fd as u64,
        };

        let ptr = match interest {
            Some(_) => &mut event,
            None => std::ptr::null_mut(),
        };

        let rc = unsafe { epoll_ctl(self.epoll, op, fd, ptr) };
        if rc < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(())
        }
    }
}

fn flags(interest: Interest) -> u32 {
    let mut flags = 0;
    if interest.read {
        flags |= EPOLLIN;
    }
    if interest.write {
        flags |= EPOLLOUT;
    }
    flags as u32
}

impl Poller for EpollPoller {
    fn register(&mut self, fd: RawFd, interest: Interest) -> io::Result<()> {
        self.ctl(EPOLL_CTL_ADD, fd, Some(interest))
    }

    fn reregister(&mut self, fd: RawFd, interest: Interest) -> io::Result<()> {
        self.ctl(EPOLL_CTL_MOD, fd, Some(interest))
    }

    fn deregister(&mut self, fd: RawFd) -> io::Result<()> {
        self.ctl(EPOLL_CTL_DEL, fd, None)
    }

    fn poll(&mut self, events: &mut Vec<Event>, timeout: Option<Duration>) -> io::Result<()> {
        events.clear();

        let n = unsafe {
            epoll_wait(
                self.epoll,
                self.buffer.as_mut_ptr(),
                self.buffer.len() as i32,
                timeout_ms(timeout),
            )
        };

        if n < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(());
            }
            return Err(err);
        }

        for ev in &self.buffer[..n as usize] {
            let error = ev.events & (EPOLLERR | EPOLLHUP) as u32 != 0;

            events.push(Event {
                fd: ev.u64 as RawFd,
                readable: ev.events & EPOLLIN as u32 != 0 || error,
                writable: ev.events & EPOLLOUT as u32 != 0 || error,
            });
        }

        Ok(())
    }
}

impl Drop for EpollPoller {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.epoll);
        }
    }
}
