use super::unixprelude::*;
use crate::error::{ErrorKind, Operation};
use std::{ffi::CStr, io};

pub(crate) const CONNECTION_RESET: i32 = libc::ECONNRESET;

pub(crate) fn classify(code: i32, operation: Operation) -> ErrorKind {
    use ErrorKind::*;
    match code {
        // EAGAIN and EWOULDBLOCK are the same value on most, but not all, systems.
        c if c == libc::EWOULDBLOCK || c == libc::EAGAIN => WouldBlock,
        libc::EBADF => InvalidHandle,
        libc::ENOTSOCK => NotASocket,
        libc::ETIMEDOUT => TimedOut,
        libc::EINTR => Interrupted,
        libc::ENOTCONN => NotConnected,
        libc::ECONNRESET => ConnectionReset,
        libc::ECONNABORTED => ConnectionAborted,
        libc::EPIPE if operation == Operation::Write => ConnectionReset,
        _ => Other,
    }
}

#[inline]
pub(crate) fn last_error_code() -> i32 { io::Error::last_os_error().raw_os_error().unwrap_or(0) }

pub(crate) fn message(code: i32) -> String {
    let mut buf = [0 as c_char; 256];
    let success = unsafe { libc::strerror_r(code, buf.as_mut_ptr(), buf.len()) == 0 };
    if !success {
        return format!("unknown error {code}");
    }
    // strerror_r() always nul-terminates on success.
    unsafe { CStr::from_ptr(buf.as_ptr()) }
        .to_string_lossy()
        .into_owned()
}
