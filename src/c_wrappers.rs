use crate::{
    address::LocalAddress,
    sys::{syscall, syscall_nonblocking, Attempt},
};
use libc::{c_int, c_void, pollfd, socklen_t};
use std::{
    io,
    mem::size_of,
    os::fd::{AsRawFd, BorrowedFd, FromRawFd, OwnedFd},
    ptr::{addr_of, addr_of_mut},
};
use to_method::To;

#[cfg(not(any(target_os = "linux", target_os = "android")))]
use std::os::fd::AsFd;

#[cfg(any(target_os = "linux", target_os = "android"))]
const SEND_FLAGS: c_int = libc::MSG_NOSIGNAL;
#[cfg(not(any(target_os = "linux", target_os = "android")))]
const SEND_FLAGS: c_int = 0;

#[allow(clippy::as_conversions)]
const INT_LEN: socklen_t = size_of::<c_int>() as socklen_t;

pub(crate) fn socket(domain: c_int, ty: c_int, protocol: c_int) -> io::Result<OwnedFd> {
    #[cfg(any(target_os = "linux", target_os = "android"))]
    let ty = ty | libc::SOCK_CLOEXEC;
    let fd = syscall(unsafe { libc::socket(domain, ty, protocol) })?;
    // SAFETY: we just created this descriptor
    let fd = unsafe { OwnedFd::from_raw_fd(fd) };
    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    set_cloexec(fd.as_fd())?;
    Ok(fd)
}

pub(crate) fn socketpair(domain: c_int, ty: c_int, protocol: c_int) -> io::Result<(OwnedFd, OwnedFd)> {
    #[cfg(any(target_os = "linux", target_os = "android"))]
    let ty = ty | libc::SOCK_CLOEXEC;
    let mut fds: [c_int; 2] = [-1, -1];
    syscall(unsafe { libc::socketpair(domain, ty, protocol, fds.as_mut_ptr()) })?;
    let [a, b] = fds;
    // SAFETY: both descriptors were just created and are owned by nobody else
    let pair = unsafe { (OwnedFd::from_raw_fd(a), OwnedFd::from_raw_fd(b)) };
    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    {
        set_cloexec(pair.0.as_fd())?;
        set_cloexec(pair.1.as_fd())?;
    }
    Ok(pair)
}

pub(crate) fn get_status_flags(fd: BorrowedFd<'_>) -> io::Result<c_int> {
    syscall(unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_GETFL, 0) })
}
pub(crate) fn set_status_flags(fd: BorrowedFd<'_>, flags: c_int) -> io::Result<()> {
    syscall(unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_SETFL, flags) })?;
    Ok(())
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn set_cloexec(fd: BorrowedFd<'_>) -> io::Result<()> {
    let flags = syscall(unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_GETFD, 0) })?;
    syscall(unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_SETFD, flags | libc::FD_CLOEXEC) })?;
    Ok(())
}

pub(crate) fn getsockopt_int(fd: BorrowedFd<'_>, level: c_int, name: c_int) -> io::Result<c_int> {
    let mut val: c_int = 0;
    let mut len = INT_LEN;
    syscall(unsafe {
        libc::getsockopt(fd.as_raw_fd(), level, name, addr_of_mut!(val).cast::<c_void>(), &mut len)
    })?;
    Ok(val)
}
pub(crate) fn setsockopt_int(fd: BorrowedFd<'_>, level: c_int, name: c_int, val: c_int) -> io::Result<()> {
    syscall(unsafe {
        libc::setsockopt(fd.as_raw_fd(), level, name, addr_of!(val).cast::<c_void>(), INT_LEN)
    })?;
    Ok(())
}

pub(crate) fn bind(fd: BorrowedFd<'_>, addr: &LocalAddress) -> io::Result<()> {
    syscall(unsafe { libc::bind(fd.as_raw_fd(), addr.as_ptr(), addr.encoded_len()) })?;
    Ok(())
}
pub(crate) fn listen(fd: BorrowedFd<'_>, backlog: c_int) -> io::Result<()> {
    syscall(unsafe { libc::listen(fd.as_raw_fd(), backlog) })?;
    Ok(())
}
pub(crate) fn connect(fd: BorrowedFd<'_>, addr: &LocalAddress) -> io::Result<()> {
    syscall(unsafe { libc::connect(fd.as_raw_fd(), addr.as_ptr(), addr.encoded_len()) })?;
    Ok(())
}

/// Accepts one pending connection, writing the peer's address into `addr`.
pub(crate) fn accept(fd: BorrowedFd<'_>, addr: &mut LocalAddress) -> Attempt<OwnedFd> {
    let (addr_ptr, len_ptr) = addr.accept_buffer();
    #[cfg(any(target_os = "linux", target_os = "android"))]
    let ret = unsafe { libc::accept4(fd.as_raw_fd(), addr_ptr, len_ptr, libc::SOCK_CLOEXEC) };
    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    let ret = unsafe { libc::accept(fd.as_raw_fd(), addr_ptr, len_ptr) };

    let Some(raw) = syscall_nonblocking(ret)? else { return Ok(None) };
    // SAFETY: accept just handed us this descriptor
    let new_fd = unsafe { OwnedFd::from_raw_fd(raw) };
    addr.finish_accept();
    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    set_cloexec(new_fd.as_fd())?;
    Ok(Some(new_fd))
}

#[allow(clippy::cast_sign_loss)] // only non-negative values get past the errno check
pub(crate) fn send(fd: BorrowedFd<'_>, buf: &[u8]) -> Attempt<usize> {
    let ret = unsafe { libc::send(fd.as_raw_fd(), buf.as_ptr().cast(), buf.len(), SEND_FLAGS) };
    Ok(syscall_nonblocking(ret)?.map(|n| n as usize))
}
#[allow(clippy::cast_sign_loss)]
pub(crate) fn recv(fd: BorrowedFd<'_>, buf: &mut [u8]) -> Attempt<usize> {
    let ret = unsafe { libc::recv(fd.as_raw_fd(), buf.as_mut_ptr().cast(), buf.len(), 0) };
    Ok(syscall_nonblocking(ret)?.map(|n| n as usize))
}

#[allow(clippy::cast_sign_loss)]
pub(crate) fn poll(fds: &mut [pollfd], timeout_ms: c_int) -> io::Result<usize> {
    let nfds = fds
        .len()
        .try_to::<libc::nfds_t>()
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "too many descriptors to poll"))?;
    let ready = syscall(unsafe { libc::poll(fds.as_mut_ptr(), nfds, timeout_ms) })?;
    Ok(ready as usize)
}
