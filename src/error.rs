//! Construction-time validation errors.
//!
//! These never cross the crate boundary on their own: they are wrapped in an [`io::Error`] of kind
//! [`InvalidInput`](io::ErrorKind::InvalidInput), from which they can be recovered with
//! [`AddressError::from_io`].

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    io,
};

/// The reason a filesystem path could not be turned into a [`LocalAddress`](crate::LocalAddress).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AddressError {
    /// The path was empty.
    Empty,
    /// The path contained a nul byte, which would silently truncate it in the C string encoding.
    InteriorNul,
    /// The path, together with its nul terminator, does not fit into `sockaddr_un`.
    TooLong {
        /// Length of the rejected path in bytes.
        len: usize,
        /// Longest path that fits, not counting the nul terminator.
        max: usize,
    },
}
impl AddressError {
    /// Extracts the address error from an [`io::Error`] produced by this crate, if that's what it
    /// wraps.
    pub fn from_io(e: &io::Error) -> Option<Self> {
        e.get_ref()?.downcast_ref::<Self>().copied()
    }
}
impl Display for AddressError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("local socket path is empty"),
            Self::InteriorNul => f.write_str("local socket path contains a nul byte"),
            Self::TooLong { len, max } => write!(
                f,
                "local socket path length {len} exceeds capacity of sun_path of sockaddr_un \
                 ({max} bytes plus nul terminator)"
            ),
        }
    }
}
impl Error for AddressError {}
impl From<AddressError> for io::Error {
    #[cold]
    fn from(e: AddressError) -> Self { io::Error::new(io::ErrorKind::InvalidInput, e) }
}
