//! Readiness multiplexing over a list of descriptors with `poll`.
//!
//! A [`Poller`] does not own the descriptors it watches. The caller registers endpoints, calls
//! [`poll`](Poller::poll) once per loop iteration, hands each [`Events`] to the matching endpoint
//! via `update`, and deregisters endpoints before dropping them. A stale entry watches a closed
//! descriptor number, or worse, a reused one.

use crate::c_wrappers;
use libc::{c_int, c_short, pollfd};
use std::{
    fmt::{self, Debug, Formatter},
    io,
    ops::{BitOr, BitOrAssign},
    os::fd::{AsFd, AsRawFd, RawFd},
    time::Duration,
};
use to_method::To;
use tracing::trace;

/// The set of conditions a [`Poller`] entry is interested in.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Interest(c_short);
impl Interest {
    /// Data can be read, or a connection can be accepted, without blocking.
    pub const READABLE: Self = Self(libc::POLLIN);
    /// An exceptional condition, such as out-of-band data.
    pub const PRIORITY: Self = Self(libc::POLLPRI);
    /// Data can be written without blocking.
    pub const WRITABLE: Self = Self(libc::POLLOUT);

    /// The raw `events` mask of `pollfd`.
    #[inline]
    pub const fn bits(self) -> c_short { self.0 }
    /// Whether every condition in `other` is also in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool { self.0 & other.0 == other.0 }
}
impl BitOr for Interest {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self { Self(self.0 | rhs.0) }
}
impl BitOrAssign for Interest {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) { self.0 |= rhs.0 }
}
impl Debug for Interest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_set();
        for (flag, name) in
            [(Self::READABLE, "READABLE"), (Self::PRIORITY, "PRIORITY"), (Self::WRITABLE, "WRITABLE")]
        {
            if self.contains(flag) {
                list.entry(&format_args!("{name}"));
            }
        }
        list.finish()
    }
}

/// The conditions observed on one [`Poller`] entry during the last pass.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Events(c_short);
impl Events {
    /// Wraps a raw `revents` mask.
    #[inline]
    pub const fn from_raw(revents: c_short) -> Self { Self(revents) }
    /// The raw `revents` mask.
    #[inline]
    pub const fn raw(self) -> c_short { self.0 }
    /// Nothing was observed.
    #[inline]
    pub const fn is_empty(self) -> bool { self.0 == 0 }

    /// A connector can receive, or an acceptor can accept, without blocking.
    #[inline]
    pub const fn is_readable(self) -> bool { self.0 & libc::POLLIN != 0 }
    /// Some exceptional condition is pending.
    #[inline]
    pub const fn is_priority(self) -> bool { self.0 & libc::POLLPRI != 0 }
    /// A connector can send without blocking.
    #[inline]
    pub const fn is_writable(self) -> bool { self.0 & libc::POLLOUT != 0 }
    /// An error is pending on the socket and can be retrieved with
    /// [`Endpoint::take_error`](crate::Endpoint::take_error).
    #[inline]
    pub const fn is_errored(self) -> bool { self.0 & libc::POLLERR != 0 }
    /// The peer hung up. Data that arrived before the hang-up may still be pending.
    #[inline]
    pub const fn is_closed(self) -> bool { self.0 & libc::POLLHUP != 0 }
    /// The descriptor is not open and must not be polled.
    #[inline]
    pub const fn is_invalid(self) -> bool { self.0 & libc::POLLNVAL != 0 }
}
impl Debug for Events {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_set();
        let flags = [
            (self.is_readable(), "READABLE"),
            (self.is_priority(), "PRIORITY"),
            (self.is_writable(), "WRITABLE"),
            (self.is_errored(), "ERRORED"),
            (self.is_closed(), "CLOSED"),
            (self.is_invalid(), "INVALID"),
        ];
        for (_, name) in flags.iter().filter(|(set, _)| *set) {
            list.entry(&format_args!("{name}"));
        }
        list.finish()
    }
}

/// An ordered list of watched descriptors, polled all at once.
///
/// Entries are addressed by position. [`remove`](Self::remove) shifts every later entry down by
/// one, so bookkeeping that maps positions to endpoints must be adjusted accordingly.
#[derive(Debug, Default)]
pub struct Poller {
    entries: Vec<pollfd>,
}
impl Poller {
    /// Creates an empty poller.
    #[inline]
    pub fn new() -> Self { Self::default() }
    /// Creates an empty poller with room for `capacity` entries.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self { Self { entries: Vec::with_capacity(capacity) } }

    /// Appends a descriptor with the given interest.
    pub fn add(&mut self, fd: &impl AsFd, interest: Interest) {
        self.entries.push(pollfd {
            fd: fd.as_fd().as_raw_fd(),
            events: interest.bits(),
            revents: 0,
        });
    }
    /// Appends a connection, watching it for both readability and writability.
    #[inline]
    pub fn add_connector(&mut self, fd: &impl AsFd) {
        self.add(fd, Interest::READABLE | Interest::WRITABLE)
    }
    /// Appends a listening socket, watching it for readability only.
    #[inline]
    pub fn add_acceptor(&mut self, fd: &impl AsFd) { self.add(fd, Interest::READABLE) }

    /// Waits until at least one entry has an observed condition or the timeout expires, and
    /// returns the number of entries with a non-empty result.
    ///
    /// A negative timeout waits indefinitely, zero returns immediately. This is the only call in
    /// the crate that blocks.
    ///
    /// # Errors
    /// Any failure of `poll` itself, including `EINTR`, is returned as is.
    pub fn poll(&mut self, timeout_ms: c_int) -> io::Result<usize> {
        let ready = c_wrappers::poll(&mut self.entries, timeout_ms)?;
        trace!(watched = self.entries.len(), ready, timeout_ms, "poll returned");
        Ok(ready)
    }
    /// Like [`poll`](Self::poll), with `None` meaning "wait indefinitely". The timeout is rounded
    /// up to whole milliseconds, so a nonzero timeout never turns into a busy poll. Timeouts that
    /// don't fit into a `c_int` worth of milliseconds are clamped.
    pub fn poll_timeout(&mut self, timeout: Option<Duration>) -> io::Result<usize> {
        let timeout_ms = match timeout {
            Some(t) => timeout_to_ms(t),
            None => -1,
        };
        self.poll(timeout_ms)
    }

    /// The conditions observed for the entry at `idx` during the last pass, or `None` if there is
    /// no such entry.
    #[inline]
    pub fn at(&self, idx: usize) -> Option<Events> {
        self.entries.get(idx).map(|e| Events::from_raw(e.revents))
    }
    /// The descriptor watched by the entry at `idx`.
    #[inline]
    pub fn fd_at(&self, idx: usize) -> Option<RawFd> { self.entries.get(idx).map(|e| e.fd) }
    /// Iterates over the descriptors and their last observed conditions, in order.
    pub fn iter(&self) -> impl Iterator<Item = (RawFd, Events)> + '_ {
        self.entries.iter().map(|e| (e.fd, Events::from_raw(e.revents)))
    }

    /// Removes the entry at `idx`, returning its descriptor. Every later entry moves down by one
    /// position.
    pub fn remove(&mut self, idx: usize) -> Option<RawFd> {
        if idx < self.entries.len() {
            Some(self.entries.remove(idx).fd)
        } else {
            None
        }
    }
    /// Removes every entry.
    #[inline]
    pub fn clear(&mut self) { self.entries.clear() }
    /// The number of entries.
    #[inline]
    pub fn len(&self) -> usize { self.entries.len() }
    /// Whether there are no entries.
    #[inline]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

fn timeout_to_ms(t: Duration) -> c_int {
    let ms = t.as_nanos().saturating_add(999_999) / 1_000_000;
    ms.try_to::<c_int>().unwrap_or(c_int::MAX)
}
