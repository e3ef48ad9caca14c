//! The error taxonomy: semantic [`ErrorKind`]s derived from raw OS codes, and the crate-wide
//! [`Error`] type.
//!
//! Raw error codes differ between platforms (`errno` values on Unix, `WSA*` codes on Windows),
//! but [`classify`] maps both onto the same closed set of kinds, so callers can decide between
//! reconnecting, aborting and fixing their input without matching on platform constants.

use std::{
    fmt::{self, Display, Formatter},
    io,
};
use thiserror::Error;

impmod! {errno,
    classify as os_classify,
    last_error_code as os_last_error_code,
    message as os_message,
    CONNECTION_RESET,
}

/// The direction of the I/O call whose failure is being classified.
///
/// Some codes only make sense for one direction (a broken pipe is a write-side condition) and are classified accordingly.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// A receive call.
    Read,
    /// A send call.
    Write,
}

/// Semantic classification of an OS socket error code.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The socket subsystem has not been initialized. Only produced on Windows.
    NotInitialized,
    /// The operation would have blocked on a nonblocking socket.
    WouldBlock,
    /// The handle does not refer to an open descriptor.
    InvalidHandle,
    /// The handle refers to something other than a socket.
    NotASocket,
    /// The operation timed out at the OS level.
    TimedOut,
    /// The call was interrupted by a signal before it completed. Never retried by this crate.
    Interrupted,
    /// The socket is not connected.
    NotConnected,
    /// The connection was reset by the peer.
    ConnectionReset,
    /// The connection was aborted locally.
    ConnectionAborted,
    /// Any code without a more specific classification.
    Other,
}
impl ErrorKind {
    const fn msg(self) -> &'static str {
        use ErrorKind::*;
        match self {
            NotInitialized => "socket subsystem not initialized",
            WouldBlock => "operation would block",
            InvalidHandle => "invalid handle",
            NotASocket => "not a socket",
            TimedOut => "timed out",
            Interrupted => "interrupted",
            NotConnected => "not connected",
            ConnectionReset => "connection reset",
            ConnectionAborted => "connection aborted",
            Other => "other error",
        }
    }
}
impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { f.write_str(self.msg()) }
}

/// Classifies a raw OS error code. Total: codes without an entry in the platform table map to
/// [`ErrorKind::Other`].
#[inline]
pub fn classify(code: i32, operation: Operation) -> ErrorKind { os_classify(code, operation) }

/// Reads the calling thread's last socket error code (`errno` on Unix, `WSAGetLastError()` on
/// Windows).
#[inline]
pub fn last_error_code() -> i32 { os_last_error_code() }

/// Returns the OS-provided human-readable description of an error code.
#[inline]
pub fn message(code: i32) -> String { os_message(code) }

/// The error type of every fallible operation in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// An operation was attempted on a resource that has already been closed. This is a
    /// programming error on the caller's side rather than an environmental condition.
    #[error("cannot perform {operation} on {resource}: the resource is closed")]
    Closed {
        /// The kind of object the operation was attempted on.
        resource: &'static str,
        /// The operation that was attempted.
        operation: &'static str,
    },
    /// An operation was attempted through a handle which does not own a descriptor.
    #[error("{resource}::{operation}: invalid socket handle")]
    InvalidHandle {
        /// The kind of object the operation was attempted on.
        resource: &'static str,
        /// The operation that was attempted.
        operation: &'static str,
    },
    /// A native socket call other than a send or receive failed.
    #[error("{operation} failed with error code {code}: {message}")]
    Method {
        /// Name of the native call that failed.
        operation: &'static str,
        /// Raw OS error code.
        code: i32,
        /// OS-provided description of `code`.
        message: String,
    },
    /// A receive call failed, or the peer closed the stream before a complete read.
    ///
    /// In the latter case no receive call actually failed. The code is then the platform's
    /// connection-reset code, filled in by this crate rather than reported by the OS.
    #[error("socket read failed ({kind}), error code {code}: {message}")]
    Read {
        /// Classification of `code`.
        kind: ErrorKind,
        /// Raw OS error code.
        code: i32,
        /// OS-provided description of `code`.
        message: String,
    },
    /// A send call failed.
    #[error("socket write failed ({kind}), error code {code}: {message}")]
    Write {
        /// Classification of `code`.
        kind: ErrorKind,
        /// Raw OS error code.
        code: i32,
        /// OS-provided description of `code`.
        message: String,
    },
    /// Name resolution failed. The code belongs to the resolver's own namespace (`EAI_*` on
    /// Unix), not to the one [`classify`] understands.
    #[error("address resolution failed with code {code}: {message}")]
    Resolution {
        /// Resolver error code.
        code: i32,
        /// Resolver-provided description of `code`.
        message: String,
    },
    /// Resolution succeeded but yielded nothing usable.
    #[error("no usable addresses found for {host}")]
    NoAddresses {
        /// The host that was being resolved.
        host: String,
    },
    /// An argument was rejected before any OS call was made.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A delimited read exceeded the configured maximum frame length.
    #[error("no delimiter found within the maximum frame length of {limit} bytes")]
    FrameTooLong {
        /// The configured maximum.
        limit: usize,
    },
    /// The OS returned an address of a family other than IPv4 or IPv6.
    #[error("unsupported address family {0}")]
    UnsupportedFamily(i32),
    /// The transport does not implement the requested operation.
    #[error("{0} is not supported by this transport")]
    Unsupported(&'static str),
}
impl Error {
    pub(crate) fn method(operation: &'static str, code: i32) -> Self {
        Self::Method { operation, code, message: message(code) }
    }
    pub(crate) fn read(code: i32) -> Self {
        Self::Read { kind: classify(code, Operation::Read), code, message: message(code) }
    }
    pub(crate) fn write(code: i32) -> Self {
        Self::Write { kind: classify(code, Operation::Write), code, message: message(code) }
    }
    /// The peer performed an orderly shutdown while a read still needed more data. Reported as a
    /// connection reset, the same way the OS reports a subsequent receive on such a stream.
    pub(crate) fn peer_closed() -> Self { Self::read(CONNECTION_RESET) }

    /// The semantic kind of the underlying OS failure, if there was one.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Read { kind, .. } | Self::Write { kind, .. } => Some(*kind),
            Self::InvalidHandle { .. } => Some(ErrorKind::InvalidHandle),
            _ => None,
        }
    }
    /// The raw OS or resolver error code, if there was one.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Method { code, .. }
            | Self::Read { code, .. }
            | Self::Write { code, .. }
            | Self::Resolution { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<Error> for io::Error {
    fn from(e: Error) -> Self {
        use io::ErrorKind as K;
        let kind = match &e {
            Error::Method { code, .. } | Error::Read { code, .. } | Error::Write { code, .. } => {
                io::Error::from_raw_os_error(*code).kind()
            }
            Error::Closed { .. } => K::NotConnected,
            Error::InvalidHandle { .. } | Error::InvalidArgument(..) => K::InvalidInput,
            Error::NoAddresses { .. } => K::NotFound,
            Error::FrameTooLong { .. } => K::InvalidData,
            Error::Unsupported(..) | Error::UnsupportedFamily(..) => K::Unsupported,
            Error::Resolution { .. } => K::Other,
        };
        io::Error::new(kind, e)
    }
}

/// Result type used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
