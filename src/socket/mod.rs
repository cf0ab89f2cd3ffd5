//! Unix domain sequenced-packet sockets in their two roles: [`Connector`] for an established
//! connection and [`Acceptor`] for a listening endpoint.
//!
//! Both roles wrap a [`LocalSocket`], which is an [`Endpoint`] plus the [`LocalAddress`] it is
//! associated with, and add their own operations on top. The bind, listen and connect primitives of
//! [`LocalSocket`] are only reachable through the roles, which sequence them correctly.

mod acceptor;
mod connector;
pub use {acceptor::*, connector::*};

use crate::{address::LocalAddress, c_wrappers, endpoint::Endpoint};
use libc::c_int;
use std::{io, os::fd::AsFd, path::Path};
use tracing::debug;

const DOMAIN: c_int = libc::AF_UNIX;
/// Connection-oriented, preserves message boundaries.
const TYPE: c_int = libc::SOCK_SEQPACKET;
const PROTOCOL: c_int = 0;

/// An [`Endpoint`] in the Unix domain together with its address.
#[derive(Debug)]
pub struct LocalSocket {
    endpoint: Endpoint,
    address: LocalAddress,
}
impl LocalSocket {
    /// Validates the path and opens a fresh, unconnected socket for it.
    fn open(path: &Path) -> io::Result<Self> {
        let address = LocalAddress::from_path(path)?;
        let endpoint = Endpoint::open(DOMAIN, TYPE, PROTOCOL)?;
        Ok(Self { endpoint, address })
    }
    /// Wraps a descriptor produced by `accept`, rejecting peer addresses of a foreign family.
    fn from_accepted(endpoint: Endpoint, address: LocalAddress) -> io::Result<Self> {
        if !address.is_valid() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid local socket address",
            ));
        }
        Ok(Self { endpoint, address })
    }
    fn pair() -> io::Result<(Self, Self)> {
        let (a, b) = c_wrappers::socketpair(DOMAIN, TYPE, PROTOCOL)?;
        let wrap = |fd| {
            Endpoint::adopt(fd).map(|endpoint| Self { endpoint, address: LocalAddress::unnamed() })
        };
        Ok((wrap(a)?, wrap(b)?))
    }

    fn unlink_address(&self) { self.address.unlink() }
    fn bind(&self) -> io::Result<()> { c_wrappers::bind(self.endpoint.as_fd(), &self.address) }
    fn listen(&self, backlog: c_int) -> io::Result<()> {
        c_wrappers::listen(self.endpoint.as_fd(), backlog)
    }
    /// Connects to the address. A connection that the kernel reports as still in progress is not
    /// an error; its completion shows up as writability.
    fn connect(&self) -> io::Result<()> {
        match c_wrappers::connect(self.endpoint.as_fd(), &self.address) {
            Err(e) if e.raw_os_error() == Some(libc::EINPROGRESS) => {
                debug!(path = %self.address.path().display(), "connection in progress");
                Ok(())
            }
            other => other,
        }
    }

    /// The address the socket was bound or connected to, or the peer address reported by
    /// `accept`.
    #[inline]
    pub fn address(&self) -> &LocalAddress { &self.address }
    /// Borrows the endpoint.
    #[inline]
    pub fn endpoint(&self) -> &Endpoint { &self.endpoint }
    /// Mutably borrows the endpoint.
    #[inline]
    pub fn endpoint_mut(&mut self) -> &mut Endpoint { &mut self.endpoint }
}
forward_endpoint_fd!(LocalSocket, endpoint);
