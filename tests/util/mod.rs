//! Test utilities for picking a free socket path, binding an acceptor to it and driving a
//! [`Poller`](crate::Poller).
#![allow(dead_code, unused_macros)]

#[macro_use]
mod eyre;
#[macro_use]
mod namegen;
mod xorshift;

#[allow(unused_imports)]
pub use {eyre::*, namegen::*, xorshift::*};

use crate::{Acceptor, AcceptorOptions, Events};
use color_eyre::eyre::WrapErr;
use std::io;

/// Installs the report handler and the log subscriber. Called first thing in every test.
pub fn testinit() { eyre::install(); }

pub fn test_wrapper(f: impl FnOnce() -> TestResult) -> TestResult {
    testinit();
    f()
}

pub fn message(idx: usize) -> Box<str> { format!("Message {idx} from client!").into() }

pub const READABLE: Events = Events::from_raw(libc::POLLIN);
pub const WRITABLE: Events = Events::from_raw(libc::POLLOUT);

/// Returns a path nobody is listening on, most likely.
pub fn fresh_path(id: &'static str) -> String {
    NameGen::new(id).next().unwrap() // Infinite iterator
}

/// Binds an acceptor to the first generated path that isn't taken. The acceptor reclaims its path
/// on drop so that test runs don't litter `/tmp`.
pub fn listen_and_pick_path(id: &'static str, backlog: u32) -> TestResult<(String, Acceptor)> {
    use io::ErrorKind::*;
    let path_and_acceptor = NameGen::new(id)
        .find_map(|path| {
            eprintln!("Trying path {path:?}...");
            let options = AcceptorOptions::new()
                .path(&path)
                .backlog(backlog)
                .unlink_stale(false)
                .reclaim_path(true);
            match options.create() {
                Ok(acceptor) => Some(Ok((path, acceptor))),
                Err(e) if matches!(e.kind(), AddrInUse | PermissionDenied) => {
                    eprintln!("\"{}\", skipping", e.kind());
                    None
                }
                Err(e) => Some(Err(e)),
            }
        })
        .unwrap() // Infinite iterator
        .context("acceptor bind failed")?;
    eprintln!("Acceptor successfully created: {path_and_acceptor:#?}");
    Ok(path_and_acceptor)
}
