use super::util::*;
use crate::{Connector, Endpoint, Events, Interest, Poller};
use color_eyre::eyre::ensure;
use std::{
    io,
    mem::{size_of, zeroed},
    net::Ipv4Addr,
    os::fd::{AsRawFd, OwnedFd},
    ptr::addr_of,
};

#[test]
fn readiness_is_sticky_until_consumed() -> TestResult {
    testinit();
    let (mut a, _b) = Connector::pair()?;
    ensure!(!a.take_readable(), "fresh endpoint reported readable");
    ensure!(!a.take_writable(), "fresh endpoint reported writable");

    ensure!(a.update(READABLE)?, "readable condition asked for discard");
    ensure!(a.take_readable(), "readable condition was lost");
    ensure!(!a.take_readable(), "readable flag survived consumption");
    ensure!(!a.take_writable(), "readable condition set the writable flag");

    // Reported twice before being consumed, still only good for one attempt.
    a.update(WRITABLE)?;
    a.update(WRITABLE)?;
    ensure!(a.take_writable(), "writable condition was lost");
    ensure!(!a.take_writable(), "writable flag survived consumption");
    Ok(())
}

#[test]
fn update_never_clears_flags() -> TestResult {
    testinit();
    let (mut a, _b) = Connector::pair()?;
    a.update(READABLE)?;
    a.update(Events::default())?;
    a.update(WRITABLE)?;
    ensure!(a.take_readable(), "later updates cleared the readable flag");
    ensure!(a.take_writable(), "writable flag missing");
    Ok(())
}

#[test]
fn blocking_mode_is_always_ready() -> TestResult {
    testinit();
    let (mut a, _b) = Connector::pair()?;
    ensure!(a.is_nonblocking(), "endpoints must start out nonblocking");
    a.set_blocking()?;
    ensure!(!a.is_nonblocking(), "set_blocking had no effect");
    for _ in 0..3 {
        ensure!(a.take_readable(), "blocking endpoint reported not readable");
        ensure!(a.take_writable(), "blocking endpoint reported not writable");
    }
    let flags = unsafe { libc::fcntl(a.as_raw_fd(), libc::F_GETFL) };
    ensure_eq!(flags & libc::O_NONBLOCK, 0);
    Ok(())
}

#[test]
fn hangup_and_invalid_ask_for_discard() -> TestResult {
    testinit();
    let (mut a, _b) = Connector::pair()?;
    ensure!(
        !a.update(Events::from_raw(libc::POLLIN | libc::POLLHUP))?,
        "hang-up did not ask for discard"
    );
    ensure!(!a.take_readable(), "discarding update still set the readable flag");
    ensure!(!a.update(Events::from_raw(libc::POLLNVAL))?, "invalid did not ask for discard");
    Ok(())
}

#[test]
fn errored_condition_is_fatal() -> TestResult {
    testinit();
    let (mut a, _b) = Connector::pair()?;
    let err = match a.update(Events::from_raw(libc::POLLERR | libc::POLLHUP)) {
        Err(e) => e,
        Ok(keep) => color_eyre::eyre::bail!("errored condition returned Ok({keep})"),
    };
    // Healthy socket, so there is no SO_ERROR to report.
    ensure_eq!(err.kind(), io::ErrorKind::Other);
    Ok(())
}

#[test]
fn errored_condition_raises_pending_error() -> TestResult {
    testinit();
    // Nobody listens on port 1, so the refusal arrives asynchronously as SO_ERROR.
    let mut ep = Endpoint::open(libc::AF_INET, libc::SOCK_STREAM, 0)?;
    let mut sin: libc::sockaddr_in = unsafe { zeroed() };
    sin.sin_family = libc::AF_INET as libc::sa_family_t;
    sin.sin_port = 1_u16.to_be();
    sin.sin_addr.s_addr = u32::from(Ipv4Addr::LOCALHOST).to_be();
    let ret = unsafe {
        libc::connect(
            ep.as_raw_fd(),
            addr_of!(sin).cast(),
            size_of::<libc::sockaddr_in>() as libc::socklen_t,
        )
    };
    ensure_eq!(ret, -1);
    ensure_eq!(io::Error::last_os_error().raw_os_error(), Some(libc::EINPROGRESS));

    let mut poller = Poller::new();
    poller.add(&ep, Interest::READABLE | Interest::WRITABLE);
    poller.poll(1000)?;
    let ev = poller.at(0).unwrap_or_default();
    ensure!(ev.is_errored(), "refused connection not reported as errored: {ev:?}");

    let err = match ep.update(ev) {
        Err(e) => e,
        Ok(keep) => color_eyre::eyre::bail!("errored condition returned Ok({keep})"),
    };
    ensure_eq!(err.kind(), io::ErrorKind::ConnectionRefused);
    ensure_eq!(err.raw_os_error(), Some(libc::ECONNREFUSED));
    // Reading SO_ERROR clears it.
    ensure!(ep.take_error()?.is_none(), "pending error was not consumed");
    Ok(())
}

#[test]
fn healthy_socket_has_no_pending_error() -> TestResult {
    testinit();
    let (a, _b) = Connector::pair()?;
    ensure!(a.take_error()?.is_none(), "unexpected pending error");
    Ok(())
}

#[test]
fn adopting_invalid_descriptor_fails() -> TestResult {
    testinit();
    let err = unsafe { Endpoint::from_raw_fd(-1) }.unwrap_err();
    ensure_eq!(err.kind(), io::ErrorKind::InvalidInput);
    Ok(())
}

#[test]
fn opened_endpoint_is_nonblocking() -> TestResult {
    testinit();
    let ep = Endpoint::open(libc::AF_UNIX, libc::SOCK_SEQPACKET, 0)?;
    ensure!(ep.is_nonblocking(), "new endpoint not marked nonblocking");
    let flags = unsafe { libc::fcntl(ep.as_raw_fd(), libc::F_GETFL) };
    ensure!(flags & libc::O_NONBLOCK != 0, "O_NONBLOCK not set on {}", ep.as_raw_fd());
    Ok(())
}

#[test]
fn ownership_moves_with_the_descriptor() -> TestResult {
    testinit();
    let ep = Endpoint::open(libc::AF_UNIX, libc::SOCK_SEQPACKET, 0)?;
    let raw = ep.as_raw_fd();
    let moved = ep;
    let fd = OwnedFd::from(moved);
    ensure_eq!(fd.as_raw_fd(), raw);
    let still_open = unsafe { libc::fcntl(raw, libc::F_GETFD) } != -1;
    ensure!(still_open, "descriptor {raw} was closed by a move");
    Ok(())
}

#[test]
fn send_buffer_size_can_be_raised() -> TestResult {
    testinit();
    let (a, _b) = Connector::pair()?;
    a.endpoint().set_send_buffer_size(64 * 1024)?;
    let size = a.endpoint().send_buffer_size()?;
    ensure!(size >= 64 * 1024, "send buffer is only {size} bytes");
    Ok(())
}
