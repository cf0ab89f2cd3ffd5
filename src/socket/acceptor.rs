use super::{Connector, LocalSocket};
use crate::{
    address::LocalAddress, c_wrappers, endpoint::Endpoint, options::AcceptorOptions, sys::Attempt,
};
use libc::c_int;
use std::{io, os::fd::AsFd, path::PathBuf};
use to_method::To;
use tracing::{debug, trace};

/// A listening sequenced-packet socket bound to a filesystem path.
///
/// # Path lifecycle
/// Binding first unlinks whatever is at the path, so a socket file left over by a previous run
/// does not get in the way. Dropping the acceptor does *not* remove the socket file unless
/// [path reclamation](AcceptorOptions::reclaim_path) was requested; call
/// [`unlink`](Self::unlink) on clean shutdown otherwise.
#[derive(Debug)]
pub struct Acceptor {
    socket: LocalSocket,
    reclaim: ReclaimGuard,
}
impl Acceptor {
    /// Binds to the given path and starts listening, with `backlog` being the maximum number of
    /// pending connections.
    ///
    /// See [`AcceptorOptions`] for the knobs.
    ///
    /// # System calls
    /// - `socket`
    /// - `fcntl`
    /// - `unlink`
    /// - `bind`
    /// - `listen`
    #[inline]
    pub fn bind(path: impl Into<PathBuf>, backlog: u32) -> io::Result<Self> {
        AcceptorOptions::new().path(path).backlog(backlog).create()
    }
    pub(crate) fn from_options(options: AcceptorOptions) -> io::Result<Self> {
        let mut socket = LocalSocket::open(&options.path)?;
        if options.unlink_stale {
            socket.unlink_address();
        }
        socket.bind()?;
        socket.listen(options.backlog.try_to::<c_int>().unwrap_or(c_int::MAX))?;
        if options.blocking {
            socket.endpoint.set_blocking()?;
        }
        debug!(path = %options.path.display(), backlog = options.backlog, "listening");
        let reclaim = if options.reclaim_path {
            ReclaimGuard::new(options.path)
        } else {
            ReclaimGuard::default()
        };
        Ok(Self { socket, reclaim })
    }

    /// Accepts one pending connection.
    ///
    /// Returns `Ok(None)` without making a system call if the endpoint has not been reported
    /// readable since the last attempt. Under level-triggered polling another `accept` may have
    /// raced this one to the pending connection; that too yields `Ok(None)`.
    ///
    /// # Errors
    /// Besides errors reported by `accept`, an error of kind
    /// [`InvalidInput`](io::ErrorKind::InvalidInput) is returned if the peer address does not
    /// belong to the Unix domain.
    ///
    /// # System calls
    /// - `accept` (`accept4` on Linux)
    /// - `fcntl`
    pub fn accept(&mut self) -> Attempt<Connector> {
        if !self.socket.endpoint.take_readable() {
            return Ok(None);
        }
        let mut address = LocalAddress::empty();
        let Some(fd) = c_wrappers::accept(self.socket.endpoint.as_fd(), &mut address)? else {
            trace!(path = %self.socket.address.path().display(), "accept would block");
            return Ok(None);
        };
        let conn = Connector::from_accepted(Endpoint::adopt(fd)?, address)?;
        debug!(path = %self.socket.address.path().display(), peer = ?conn.address(), "accepted");
        Ok(Some(conn))
    }

    /// Removes the socket file from the filesystem, ignoring failures. Existing connections are
    /// unaffected, but new clients can no longer find the acceptor.
    #[inline]
    pub fn unlink(&self) { self.socket.unlink_address() }
    /// Disables path reclamation if it was requested, leaving the socket file in place when the
    /// acceptor is dropped.
    #[inline]
    pub fn do_not_reclaim_path_on_drop(&mut self) { self.reclaim.forget() }

    /// The address the acceptor is bound to.
    #[inline]
    pub fn address(&self) -> &LocalAddress { self.socket.address() }
    /// Borrows the underlying socket.
    #[inline]
    pub fn socket(&self) -> &LocalSocket { &self.socket }
    /// Borrows the underlying endpoint.
    #[inline]
    pub fn endpoint(&self) -> &Endpoint { &self.socket.endpoint }
}
forward_endpoint_methods!(Acceptor, socket.endpoint);
forward_endpoint_fd!(Acceptor, socket);

/// Removes the socket file on drop, if armed.
#[derive(Debug, Default)]
struct ReclaimGuard(Option<PathBuf>);
impl ReclaimGuard {
    fn new(path: PathBuf) -> Self { Self(Some(path)) }
    fn forget(&mut self) { self.0 = None }
}
impl Drop for ReclaimGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            if let Err(e) = std::fs::remove_file(&path) {
                debug!(path = %path.display(), error = %e, "path reclamation failed");
            }
        }
    }
}
