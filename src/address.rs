//! Filesystem addresses of Unix domain sockets.

use crate::error::AddressError;
use libc::{c_char, sa_family_t, sockaddr, sockaddr_un, socklen_t};
use std::{
    ffi::OsStr,
    fmt::{self, Debug, Formatter},
    io,
    mem::{size_of, zeroed},
    os::unix::ffi::OsStrExt,
    path::Path,
    ptr::{addr_of, addr_of_mut},
};
use tracing::debug;

const SUN_LEN: usize = {
    let sun = unsafe { zeroed::<sockaddr_un>() };
    sun.sun_path.len()
};
const MAX_SIZE: usize = size_of::<sockaddr_un>();
/// Offset of `sun_path` within `sockaddr_un`, i.e. the size of the fixed header.
#[allow(clippy::arithmetic_side_effects)]
const PATH_OFFSET: usize = MAX_SIZE - SUN_LEN;

#[allow(clippy::as_conversions)]
const FAMILY: sa_family_t = libc::AF_UNIX as sa_family_t;

/// The longest filesystem path, in bytes, that a [`LocalAddress`] can hold. One byte of
/// `sun_path` is reserved for the nul terminator.
#[allow(clippy::arithmetic_side_effects)]
pub const MAX_PATH_LEN: usize = SUN_LEN - 1;

/// Wrapper around `sockaddr_un` that keeps track of how many of its bytes are meaningful.
///
/// An address is either built from a path, in which case the path is always nul-terminated within
/// `sun_path`, or [empty](Self::empty), in which case it serves as an output buffer for `accept`
/// and has whatever the kernel wrote into it afterwards.
#[derive(Copy, Clone)]
pub struct LocalAddress {
    len: socklen_t,
    sun: sockaddr_un,
}
/// Creation.
impl LocalAddress {
    /// Creates an empty address with its encoded length set to the full capacity of
    /// `sockaddr_un`. Its family tag is left unset, so it is not [valid](Self::is_valid) until the
    /// kernel fills it in.
    #[allow(clippy::as_conversions)]
    pub fn empty() -> Self {
        // SAFETY: sockaddr_un is plain old data and all-zeroes is a valid bit pattern for it
        let sun = unsafe { zeroed::<sockaddr_un>() };
        Self { len: MAX_SIZE as socklen_t, sun }
    }

    /// Encodes a filesystem path.
    ///
    /// # Errors
    /// An error of kind [`InvalidInput`](io::ErrorKind::InvalidInput) wrapping an
    /// [`AddressError`] is returned if the path is empty, contains a nul byte or is longer than
    /// [`MAX_PATH_LEN`].
    #[allow(clippy::as_conversions, clippy::arithmetic_side_effects, clippy::cast_possible_wrap)]
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let bytes = path.as_ref().as_os_str().as_bytes();
        if bytes.is_empty() {
            return Err(AddressError::Empty.into());
        }
        if bytes.contains(&0) {
            return Err(AddressError::InteriorNul.into());
        }
        if bytes.len() > MAX_PATH_LEN {
            return Err(AddressError::TooLong { len: bytes.len(), max: MAX_PATH_LEN }.into());
        }

        let mut slf = Self::empty();
        slf.sun.sun_family = FAMILY;
        for (dst, src) in slf.sun.sun_path.iter_mut().zip(bytes) {
            *dst = *src as c_char;
        }
        // The zeroed buffer already holds the terminator, this only spells it out.
        if let Some(terminator) = slf.sun.sun_path.get_mut(bytes.len()) {
            *terminator = 0;
        }
        slf.len = (PATH_OFFSET + bytes.len() + 1) as socklen_t;
        Ok(slf)
    }

    /// Creates the address of a socket that was never bound to a path, as reported for the ends
    /// of a socket pair.
    #[allow(clippy::as_conversions)]
    pub fn unnamed() -> Self {
        let mut slf = Self::empty();
        slf.sun.sun_family = FAMILY;
        slf.len = PATH_OFFSET as socklen_t;
        slf
    }
}

/// Accessors.
impl LocalAddress {
    /// Checks that the family tag is `AF_UNIX`, i.e. that the address was not produced by a socket
    /// of a different type.
    #[inline]
    pub fn is_valid(&self) -> bool { self.sun.sun_family == FAMILY }

    /// The number of bytes of the structure that are meaningful, as passed to `bind` and
    /// `connect` or as reported by `accept`.
    #[inline]
    pub fn encoded_len(&self) -> socklen_t { self.len }

    /// The raw bytes of the path, without the nul terminator. Empty for unnamed addresses and for
    /// Linux abstract namespace names.
    #[allow(clippy::as_conversions, clippy::indexing_slicing)]
    pub fn path_bytes(&self) -> &[u8] {
        let reported = (self.len as usize).saturating_sub(PATH_OFFSET).min(SUN_LEN);
        // SAFETY: c_char and u8 have the same size and every bit pattern is valid for both
        let raw: &[u8] = unsafe { &*addr_of!(self.sun.sun_path).cast::<[u8; SUN_LEN]>() };
        let raw = &raw[..reported];
        match raw.iter().position(|&b| b == 0) {
            Some(nul) => &raw[..nul],
            None => raw,
        }
    }
    /// The path as a [`Path`].
    #[inline]
    pub fn path(&self) -> &Path { Path::new(OsStr::from_bytes(self.path_bytes())) }

    /// Returns a pointer to the structure that can be passed to `bind` and `connect`.
    #[inline]
    pub(crate) fn as_ptr(&self) -> *const sockaddr { addr_of!(self.sun).cast() }

    /// Resets the encoded length to full capacity and returns the output pointers for `accept`.
    #[allow(clippy::as_conversions)]
    pub(crate) fn accept_buffer(&mut self) -> (*mut sockaddr, *mut socklen_t) {
        self.len = MAX_SIZE as socklen_t;
        (addr_of_mut!(self.sun).cast(), addr_of_mut!(self.len))
    }
    /// Caps the length reported by `accept` at the size of `sockaddr_un`. Linux reports the full
    /// length of the peer's name even when that got truncated, which happens to peers bound to a
    /// path that fills `sun_path` without a terminator.
    #[allow(clippy::as_conversions)]
    pub(crate) fn finish_accept(&mut self) { self.len = self.len.min(MAX_SIZE as socklen_t) }
}

impl LocalAddress {
    /// Removes the path from the filesystem.
    ///
    /// Failures are discarded: a path that doesn't exist or that cannot be removed must not abort
    /// a bind sequence that calls this before binding. Addresses without a path are skipped.
    pub fn unlink(&self) {
        let path = self.path();
        if path.as_os_str().is_empty() {
            return;
        }
        if let Err(e) = std::fs::remove_file(path) {
            debug!(path = %path.display(), error = %e, "unlink of local socket path failed");
        }
    }
}

impl Default for LocalAddress {
    #[inline]
    fn default() -> Self { Self::empty() }
}
impl PartialEq for LocalAddress {
    fn eq(&self, other: &Self) -> bool {
        self.sun.sun_family == other.sun.sun_family && self.path_bytes() == other.path_bytes()
    }
}
impl Eq for LocalAddress {}
impl Debug for LocalAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalAddress")
            .field("family", &self.sun.sun_family)
            .field("path", &self.path())
            .field("len", &self.len)
            .finish()
    }
}
