use crate::error::{ErrorKind, Operation};
use std::ptr;
use windows_sys::Win32::{
    Networking::WinSock::{self as ws, WSAGetLastError},
    System::Diagnostics::Debug::{
        FormatMessageW, FORMAT_MESSAGE_FROM_SYSTEM, FORMAT_MESSAGE_IGNORE_INSERTS,
    },
};

pub(crate) const CONNECTION_RESET: i32 = ws::WSAECONNRESET;

pub(crate) fn classify(code: i32, _operation: Operation) -> ErrorKind {
    use ErrorKind::*;
    match code {
        ws::WSANOTINITIALISED => NotInitialized,
        ws::WSAEWOULDBLOCK => WouldBlock,
        ws::WSAEBADF => InvalidHandle,
        ws::WSAENOTSOCK => NotASocket,
        ws::WSAETIMEDOUT => TimedOut,
        ws::WSAEINTR => Interrupted,
        ws::WSAENOTCONN | ws::WSAESHUTDOWN => NotConnected,
        ws::WSAECONNRESET | ws::WSAENETRESET => ConnectionReset,
        ws::WSAECONNABORTED => ConnectionAborted,
        _ => Other,
    }
}

#[inline]
pub(crate) fn last_error_code() -> i32 { unsafe { WSAGetLastError() } }

pub(crate) fn message(code: i32) -> String {
    let mut buf = [0_u16; 512];
    let len = unsafe {
        FormatMessageW(
            FORMAT_MESSAGE_FROM_SYSTEM | FORMAT_MESSAGE_IGNORE_INSERTS,
            ptr::null(),
            code as u32,
            0,
            buf.as_mut_ptr(),
            buf.len() as u32,
            ptr::null(),
        )
    };
    if len == 0 {
        return format!("unknown error {code}");
    }
    let text = String::from_utf16_lossy(&buf[..len as usize]);
    // System messages end in a period followed by CRLF.
    text.trim_end().to_owned()
}
