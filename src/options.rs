//! Option tables for creating [`Acceptor`]s and [`Connector`]s.

use crate::socket::{Acceptor, Connector};
use std::{io, path::PathBuf};

/// The backlog used by [`AcceptorOptions`] unless told otherwise.
pub const DEFAULT_BACKLOG: u32 = 128;

/// A builder for [`Acceptor`]s.
///
/// ```no_run
/// use localpoll::AcceptorOptions;
///
/// let acceptor = AcceptorOptions::new()
///     .path("/tmp/example.sock")
///     .backlog(16)
///     .reclaim_path(true)
///     .create()?;
/// # let _ = acceptor;
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct AcceptorOptions {
    pub(crate) path: PathBuf,
    pub(crate) backlog: u32,
    pub(crate) blocking: bool,
    pub(crate) unlink_stale: bool,
    pub(crate) reclaim_path: bool,
}
impl AcceptorOptions {
    /// Creates an options table with default values.
    #[inline]
    pub fn new() -> Self {
        Self {
            path: PathBuf::new(),
            backlog: DEFAULT_BACKLOG,
            blocking: false,
            unlink_stale: true,
            reclaim_path: false,
        }
    }
    /// Sets the filesystem path to bind to. There is no default; creating an acceptor without a
    /// path fails with [`AddressError::Empty`](crate::AddressError::Empty).
    #[must_use = builder_must_use!()]
    #[inline]
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }
    builder_setters! {
        /// Sets the maximum number of pending connections. Values that don't fit into a `c_int`
        /// are clamped.
        ///
        /// The default is [`DEFAULT_BACKLOG`].
        backlog: u32,
        /// Puts the acceptor in blocking mode, in which [`accept`](Acceptor::accept) waits for a
        /// client instead of consulting readiness.
        ///
        /// Disabled by default.
        blocking: bool,
        /// Sets whether whatever is at the path gets unlinked before binding.
        ///
        /// Enabled by default.
        unlink_stale: bool,
        /// Sets whether the socket file is removed when the acceptor is dropped.
        ///
        /// Disabled by default.
        reclaim_path: bool,
    }
    /// Creates the acceptor: opens a socket, unlinks a stale socket file if so configured, binds
    /// and listens.
    #[inline]
    pub fn create(self) -> io::Result<Acceptor> { Acceptor::from_options(self) }
}
impl Default for AcceptorOptions {
    #[inline]
    fn default() -> Self { Self::new() }
}

/// A builder for outbound [`Connector`]s.
#[derive(Clone, Debug, Default)]
pub struct ConnectorOptions {
    pub(crate) path: PathBuf,
    pub(crate) blocking: bool,
}
impl ConnectorOptions {
    /// Creates an options table with default values.
    #[inline]
    pub fn new() -> Self { Self::default() }
    /// Sets the filesystem path of the acceptor to connect to.
    #[must_use = builder_must_use!()]
    #[inline]
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }
    builder_setters! {
        /// Puts the connector in blocking mode once connected.
        ///
        /// Disabled by default.
        blocking: bool,
    }
    /// Opens a socket and connects it.
    #[inline]
    pub fn connect(self) -> io::Result<Connector> { Connector::from_options(self) }
}
