use super::LocalSocket;
use crate::{
    address::LocalAddress, c_wrappers, endpoint::Endpoint, options::ConnectorOptions, sys::Attempt,
};
use std::{
    io,
    os::fd::{AsFd, OwnedFd},
    path::Path,
};
use tracing::debug;

/// An established sequenced-packet connection.
///
/// Obtained either by [connecting](Self::connect) to a path or from [`Acceptor::accept`]; both
/// end up as the same thing. Every [`try_send`](Self::try_send) and
/// [`try_recv`](Self::try_recv) sends or receives at most one packet and is gated on the
/// readiness remembered by the endpoint.
///
/// [`Acceptor::accept`]: super::Acceptor::accept
#[derive(Debug)]
pub struct Connector {
    socket: LocalSocket,
}
impl Connector {
    /// Connects to the acceptor listening at the given path.
    ///
    /// See [`ConnectorOptions`] for the knobs.
    ///
    /// # System calls
    /// - `socket`
    /// - `fcntl`
    /// - `connect`
    #[inline]
    pub fn connect(path: impl AsRef<Path>) -> io::Result<Self> {
        ConnectorOptions::new().path(path.as_ref()).connect()
    }
    pub(crate) fn from_options(options: ConnectorOptions) -> io::Result<Self> {
        let mut socket = LocalSocket::open(&options.path)?;
        socket.connect()?;
        if options.blocking {
            socket.endpoint.set_blocking()?;
        }
        debug!(path = %socket.address.path().display(), "connected");
        Ok(Self { socket })
    }
    pub(crate) fn from_accepted(endpoint: Endpoint, address: LocalAddress) -> io::Result<Self> {
        LocalSocket::from_accepted(endpoint, address).map(|socket| Self { socket })
    }

    /// Creates a pair of connectors connected to each other, without touching the filesystem.
    ///
    /// # System calls
    /// - `socketpair`
    /// - `fcntl`
    pub fn pair() -> io::Result<(Self, Self)> {
        let (a, b) = LocalSocket::pair()?;
        Ok((Self { socket: a }, Self { socket: b }))
    }

    /// Sends one packet from `buf`, returning how many bytes the kernel took.
    ///
    /// Returns `Ok(None)` without making a system call if the endpoint has not been reported
    /// writable since the last attempt, or if the kernel reports that the send would block.
    ///
    /// # System calls
    /// - `send`
    pub fn try_send(&mut self, buf: &[u8]) -> Attempt<usize> {
        if !self.socket.endpoint.take_writable() {
            return Ok(None);
        }
        c_wrappers::send(self.socket.endpoint.as_fd(), buf)
    }
    /// Receives one packet into `buf`, returning how many bytes were written to it.
    ///
    /// `Ok(Some(0))` means that the peer performed an orderly shutdown; closing the connection in
    /// response is up to the caller. Returns `Ok(None)` without making a system call if the
    /// endpoint has not been reported readable since the last attempt, or if the kernel reports
    /// that the receive would block.
    ///
    /// # System calls
    /// - `recv`
    pub fn try_recv(&mut self, buf: &mut [u8]) -> Attempt<usize> {
        if !self.socket.endpoint.take_readable() {
            return Ok(None);
        }
        c_wrappers::recv(self.socket.endpoint.as_fd(), buf)
    }

    /// The address this connector was connected to, or the peer address reported by `accept`.
    /// The latter is usually unnamed.
    #[inline]
    pub fn address(&self) -> &LocalAddress { self.socket.address() }
    /// Borrows the underlying socket.
    #[inline]
    pub fn socket(&self) -> &LocalSocket { &self.socket }
    /// Borrows the underlying endpoint.
    #[inline]
    pub fn endpoint(&self) -> &Endpoint { &self.socket.endpoint }
}
forward_endpoint_methods!(Connector, socket.endpoint);
forward_endpoint_fd!(Connector, socket);

impl From<Connector> for OwnedFd {
    #[inline]
    fn from(c: Connector) -> Self { c.socket.endpoint.into() }
}
