//! Portable `WSAPoll`-based backend for Windows.
//!
//! Mirrors the Unix [`PollPoller`](super::PollPoller): a registration table
//! and a `WSAPOLLFD` array rebuilt on every call. Readiness-based rather
//! than completion-based, which keeps the reactor's dispatch model uniform
//! across platforms.

use super::common::{Interest, timeout_ms};
use super::{Poller, RawFd};
use crate::reactor::event::Event;

use std::collections::HashMap;
use std::io;
use std::mem;
use std::sync::Once;
use std::time::Duration;

use windows_sys::Win32::Networking::WinSock::{
    POLLERR, POLLHUP, POLLIN, POLLNVAL, POLLOUT, SOCKET, SOCKET_ERROR, WSADATA, WSAPOLLFD, WSAPoll,
    WSAStartup,
};

/// Winsock initialization guard.
static WINSOCK_INIT: Once = Once::new();

/// Initialize Winsock if not already initialized.
fn ensure_winsock() {
    WINSOCK_INIT.call_once(|| unsafe {
        let mut data: WSADATA = mem::zeroed();
        let rc = WSAStartup(0x0202, &mut data as *mut _);
        assert_eq!(rc, 0, "WSAStartup failed: {}", rc);
    });
}

/// Windows poller based on `WSAPoll`.
pub struct WsaPollPoller {
    /// Registered sockets: `fd → interest`.
    reg: HashMap<RawFd, Interest>,

    /// Reusable `WSAPOLLFD` buffer.
    fds: Vec<WSAPOLLFD>,
}

impl WsaPollPoller {
    /// Creates a new `WsaPollPoller`, initializing Winsock on first use.
    pub fn new() -> Self {
        ensure_winsock();

        Self {
            reg: HashMap::new(),
            fds: Vec::new(),
        }
    }
}

impl Default for WsaPollPoller {
    fn default() -> Self {
        Self::new()
    }
}

impl Poller for WsaPollPoller {
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

        // WSAPoll rejects an empty descriptor set, so a pure timer wait
        // becomes a plain sleep.
        if self.reg.is_empty() {
            if let Some(t) = timeout {
                std::thread::sleep(t);
            }
            return Ok(());
        }

        self.fds.clear();
        for (&fd, &interest) in self.reg.iter() {
            let mut ev = 0;
            if interest.read {
                ev |= POLLIN;
            }
            if interest.write {
                ev |= POLLOUT;
            }

            self.fds.push(WSAPOLLFD {
                fd: fd as SOCKET,
                events: ev,
                revents: 0,
            });
        }

        let rc =
            unsafe { WSAPoll(self.fds.as_mut_ptr(), self.fds.len() as u32, timeout_ms(timeout)) };
        if rc == SOCKET_ERROR {
            return Err(io::Error::last_os_error());
        }

        for pfd in &self.fds {
            let re = pfd.revents as i32;
            if re == 0 {
                continue;
            }

            let error = re & (POLLERR | POLLHUP | POLLNVAL) as i32 != 0;

            events.push(Event {
                fd: pfd.fd as RawFd,
                readable: re & POLLIN as i32 != 0 || error,
                writable: re & POLLOUT as i32 != 0 || error,
            });
        }

        Ok(())
    }
}
