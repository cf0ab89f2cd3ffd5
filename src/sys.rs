//! Translation of raw system call returns into typed outcomes.
//!
//! Every call into the C library made by this crate funnels its return value through one of two
//! functions:
//! - [`syscall`], which turns the `-1` sentinel into the [`io::Error`] captured from `errno`;
//! - [`syscall_nonblocking`], which additionally treats `EAGAIN`/`EWOULDBLOCK` as "nothing yet"
//!   and yields `Ok(None)` instead of an error. It is meant for calls that are only made once the
//!   caller already believes the descriptor to be ready.
//!
//! The portable error code of a failure is available through [`io::Error::kind`] and
//! [`io::Error::raw_os_error`]; applying `?` to the result is how a failure is propagated.

use libc::c_int;
use std::io;

/// The outcome of a nonblocking operation.
///
/// - `Ok(Some(..))` – the operation completed;
/// - `Ok(None)` – the operation would have blocked, or was not attempted because the endpoint has
///   not been reported ready since the last attempt;
/// - `Err(..)` – the operating system reported a genuine failure.
pub type Attempt<T> = io::Result<Option<T>>;

/// Return types of C library calls that signal failure with `-1`.
pub trait SysRet: Copy {
    /// Whether the value is the failure sentinel.
    fn is_failure(self) -> bool;
}
impl SysRet for c_int {
    #[inline(always)]
    fn is_failure(self) -> bool { self == -1 }
}
impl SysRet for isize {
    #[inline(always)]
    fn is_failure(self) -> bool { self == -1 }
}

/// Wraps the return value of a C library call, capturing `errno` if it signals failure.
///
/// Must be called immediately after the call in question, before anything else gets a chance to
/// overwrite `errno`.
#[inline]
pub fn syscall<R: SysRet>(ret: R) -> io::Result<R> {
    if ret.is_failure() {
        Err(io::Error::last_os_error())
    } else {
        Ok(ret)
    }
}

/// Like [`syscall`], but maps "would block" to `Ok(None)`.
#[inline]
pub fn syscall_nonblocking<R: SysRet>(ret: R) -> Attempt<R> { syscall(ret).or_would_block() }

/// Returns `true` if the error is the "would block" or "resource temporarily unavailable" signal
/// of a nonblocking operation.
pub fn is_would_block(e: &io::Error) -> bool {
    #[allow(unreachable_patterns)] // EAGAIN and EWOULDBLOCK are the same number on most platforms
    match e.raw_os_error() {
        Some(libc::EAGAIN | libc::EWOULDBLOCK) => true,
        Some(_) => false,
        None => e.kind() == io::ErrorKind::WouldBlock,
    }
}

/// Conversion of "would block" failures into the "nothing yet" outcome.
pub trait WouldBlockExt<T>: Sized {
    /// Maps success to `Ok(Some(..))`, "would block" to `Ok(None)` and passes every other error
    /// through.
    fn or_would_block(self) -> Attempt<T>;
}
impl<T> WouldBlockExt<T> for io::Result<T> {
    #[inline]
    fn or_would_block(self) -> Attempt<T> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(e) if is_would_block(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
