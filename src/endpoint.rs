//! The owned socket descriptor and its readiness state.

use crate::{c_wrappers, poll::Events};
use libc::c_int;
use std::{
    io,
    os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, OwnedFd, RawFd},
};
use to_method::To;
use tracing::{debug, warn};

/// Exclusive owner of one socket descriptor, remembering whether the descriptor has been reported
/// readable or writable since the last time that was consumed.
///
/// # Readiness
/// The readable and writable flags are sticky: [`update`](Self::update) sets them from the result
/// of a [`Poller`](crate::Poller) pass, and only [`take_readable`](Self::take_readable) and
/// [`take_writable`](Self::take_writable) clear them. Every nonblocking operation of the socket
/// roles consults the matching `take_*` method first and does not even attempt the system call if
/// it returns `false`.
///
/// # Blocking mode
/// Endpoints start out in nonblocking mode. [`set_blocking`](Self::set_blocking) switches to
/// blocking mode for good; from then on both `take_*` methods always return `true`, since the
/// operations will simply wait instead of failing with "would block".
///
/// # Ownership
/// The descriptor is closed when the endpoint is dropped. Close failures are ignored. Moving the
/// endpoint moves the descriptor; there is no way to copy it.
#[derive(Debug)]
pub struct Endpoint {
    fd: OwnedFd,
    readable: bool,
    writable: bool,
    nonblocking: bool,
}

/// Creation.
impl Endpoint {
    /// Creates a new socket with the given domain, type and protocol and puts it in nonblocking
    /// mode.
    ///
    /// # System calls
    /// - `socket`
    /// - `fcntl`
    pub fn open(domain: c_int, ty: c_int, protocol: c_int) -> io::Result<Self> {
        Self::adopt(c_wrappers::socket(domain, ty, protocol)?)
    }
    /// Takes ownership of an already open socket descriptor, such as one returned by `accept`,
    /// and puts it in nonblocking mode.
    pub fn adopt(fd: OwnedFd) -> io::Result<Self> {
        let mut slf = Self { fd, readable: false, writable: false, nonblocking: false };
        slf.set_nonblocking_flag(true)?;
        Ok(slf)
    }
    /// Like [`adopt`](Self::adopt), but for a raw descriptor.
    ///
    /// # Errors
    /// A negative descriptor is rejected with an error of kind
    /// [`InvalidInput`](io::ErrorKind::InvalidInput).
    ///
    /// # Safety
    /// If non-negative, `fd` must be an open descriptor that is not owned by anything else.
    pub unsafe fn from_raw_fd(fd: RawFd) -> io::Result<Self> {
        if fd < 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "invalid socket descriptor"));
        }
        // SAFETY: upheld by the caller
        Self::adopt(unsafe { OwnedFd::from_raw_fd(fd) })
    }

    fn set_nonblocking_flag(&mut self, nonblocking: bool) -> io::Result<()> {
        let flags = c_wrappers::get_status_flags(self.fd.as_fd())?;
        let flags = if nonblocking { flags | libc::O_NONBLOCK } else { flags & !libc::O_NONBLOCK };
        c_wrappers::set_status_flags(self.fd.as_fd(), flags)?;
        self.nonblocking = nonblocking;
        Ok(())
    }
}

/// Readiness.
impl Endpoint {
    /// Applies the conditions observed by one [`Poller`](crate::Poller) pass to the sticky
    /// readiness flags.
    ///
    /// Returns `Ok(false)` if the peer hung up or the descriptor is invalid, meaning that the
    /// endpoint should be discarded; the flags are left untouched in that case. Otherwise, the
    /// readable and writable conditions are added to the flags (never removed) and `Ok(true)` is
    /// returned.
    ///
    /// # Errors
    /// An errored condition is fatal. The pending socket error is read with `SO_ERROR` and
    /// returned; if the socket has no pending error, an error of kind
    /// [`Other`](io::ErrorKind::Other) is returned instead.
    pub fn update(&mut self, events: Events) -> io::Result<bool> {
        if events.is_errored() {
            let e = self.take_error()?.unwrap_or_else(|| {
                io::Error::other("socket reported an error condition without a pending error")
            });
            warn!(fd = self.fd.as_raw_fd(), error = %e, "errored readiness");
            return Err(e);
        }
        if events.is_invalid() || events.is_closed() {
            debug!(fd = self.fd.as_raw_fd(), ?events, "endpoint should be discarded");
            return Ok(false);
        }
        self.readable |= events.is_readable();
        self.writable |= events.is_writable();
        Ok(true)
    }
    /// Consumes the readable flag, returning whether it was set or the endpoint is in blocking
    /// mode.
    #[inline]
    pub fn take_readable(&mut self) -> bool {
        std::mem::take(&mut self.readable) || !self.nonblocking
    }
    /// Consumes the writable flag, returning whether it was set or the endpoint is in blocking
    /// mode.
    #[inline]
    pub fn take_writable(&mut self) -> bool {
        std::mem::take(&mut self.writable) || !self.nonblocking
    }

    /// Switches the endpoint to blocking mode permanently.
    ///
    /// # System calls
    /// - `fcntl`
    pub fn set_blocking(&mut self) -> io::Result<()> { self.set_nonblocking_flag(false) }
    /// Whether the endpoint is still in nonblocking mode.
    #[inline]
    pub fn is_nonblocking(&self) -> bool { self.nonblocking }
}

/// Socket options.
impl Endpoint {
    /// Retrieves and clears the pending socket error, to be called after a pass reported an
    /// errored condition.
    ///
    /// # System calls
    /// - `getsockopt` with `SO_ERROR`
    pub fn take_error(&self) -> io::Result<Option<io::Error>> {
        let code = self.getsockopt_int(libc::SOL_SOCKET, libc::SO_ERROR)?;
        Ok((code != 0).then(|| io::Error::from_raw_os_error(code)))
    }

    /// Reads an integer socket option.
    pub fn getsockopt_int(&self, level: c_int, name: c_int) -> io::Result<c_int> {
        c_wrappers::getsockopt_int(self.fd.as_fd(), level, name)
    }
    /// Sets an integer socket option.
    pub fn setsockopt_int(&self, level: c_int, name: c_int, value: c_int) -> io::Result<()> {
        c_wrappers::setsockopt_int(self.fd.as_fd(), level, name, value)
    }

    /// The size of the kernel send buffer (`SO_SNDBUF`), which bounds the largest packet that
    /// can be sent in one call.
    #[allow(clippy::cast_sign_loss)]
    pub fn send_buffer_size(&self) -> io::Result<usize> {
        self.getsockopt_int(libc::SOL_SOCKET, libc::SO_SNDBUF).map(|n| n.max(0) as usize)
    }
    /// Requests a kernel send buffer size. The kernel may round or clamp the value.
    pub fn set_send_buffer_size(&self, size: usize) -> io::Result<()> {
        let size = size.try_to::<c_int>().unwrap_or(c_int::MAX);
        self.setsockopt_int(libc::SOL_SOCKET, libc::SO_SNDBUF, size)
    }
}

impl AsFd for Endpoint {
    #[inline]
    fn as_fd(&self) -> BorrowedFd<'_> { self.fd.as_fd() }
}
impl AsRawFd for Endpoint {
    #[inline]
    fn as_raw_fd(&self) -> RawFd { self.fd.as_raw_fd() }
}
impl From<Endpoint> for OwnedFd {
    #[inline]
    fn from(ep: Endpoint) -> Self { ep.fd }
}
