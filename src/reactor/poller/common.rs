use std::time::Duration;

/// Readiness directions a descriptor is watched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interest {
    pub read: bool,
    pub write: bool,
}

impl Interest {
    /// True when neither direction is watched.
    pub fn is_empty(self) -> bool {
        !self.read && !self.write
    }
}

/// Converts an optional wait bound into the millisecond form the polling
/// system calls expect, where `-1` means "wait indefinitely".
///
/// Sub-millisecond remainders round **up** so a timer deadline is never
/// polled past and then re-polled in a zero-timeout spin.
pub(crate) fn timeout_ms(timeout: Option<Duration>) -> i32 {
    match timeout {
        None => -1,
        Some(t) => {
            let mut ms = t.as_millis().min(i32::MAX as u128 - 1) as i32;
            if t.subsec_nanos() % 1_000_000 != 0 {
                ms += 1;
            }
            ms
        }
    }
}
