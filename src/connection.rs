//! Buffered connections with bounded, exact-count and delimiter-terminated reads.

use crate::{
    addr::IpAddress,
    error::{Error, Result},
    handle::Handle,
    misc::find_subslice,
    resolve::{resolve, ResolveHints},
    transport::Transport,
};
use std::{
    fmt::{self, Debug, Formatter},
    io,
};

/// Initial size of the receive buffer of a [`Connection`], in bytes. Roughly one Ethernet frame's
/// worth of TCP payload.
pub const DEFAULT_BUFFER_CAPACITY: usize = 1400;

/// A builder for [`Connection`]s.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ConnectionOptions {
    pub(crate) buffer_capacity: usize,
    pub(crate) max_frame_len: Option<usize>,
}

/// Creation.
impl ConnectionOptions {
    /// Creates an options table with default values.
    #[inline]
    pub fn new() -> Self {
        Self { buffer_capacity: DEFAULT_BUFFER_CAPACITY, max_frame_len: None }
    }
}
impl Default for ConnectionOptions {
    #[inline]
    fn default() -> Self { Self::new() }
}

/// Option setters.
impl ConnectionOptions {
    builder_setters! {
        /// Sets the initial size of the receive buffer.
        ///
        /// [`read_until()`](Connection::read_until) grows the buffer past this as needed. The
        /// default is [`DEFAULT_BUFFER_CAPACITY`].
        buffer_capacity: usize,
        /// Sets the longest frame, delimiter included, that
        /// [`read_until()`](Connection::read_until) will buffer before giving up with
        /// [`Error::FrameTooLong`].
        ///
        /// Unlimited by default.
        max_frame_len: Option<usize>,
    }
}

/// Connection constructors.
impl ConnectionOptions {
    /// Wraps an already connected handle.
    #[inline]
    pub fn wrap(self, handle: Handle) -> Connection { self.wrap_transport(handle) }

    /// Wraps any [`Transport`].
    pub fn wrap_transport(self, transport: impl Transport + 'static) -> Connection {
        Connection {
            transport: Box::new(transport),
            buffer: Vec::with_capacity(self.buffer_capacity),
            buffer_capacity: self.buffer_capacity.max(1),
            max_frame_len: self.max_frame_len,
            closed: false,
        }
    }

    /// Resolves `host` and `service` as a TCP endpoint and connects to the first address the
    /// resolver returns.
    ///
    /// # Errors
    /// - Resolution errors from [`resolve()`].
    /// - [`Error::NoAddresses`] if the resolver succeeded but returned nothing.
    /// - [`Error::Method`] for `"socket"` or `"connect"`.
    pub fn connect(self, host: &str, service: &str) -> Result<Connection> {
        let candidates = resolve(host, service, &ResolveHints::tcp())?;
        let Some(candidate) = candidates.first() else {
            return Err(Error::NoAddresses { host: host.to_owned() });
        };
        let handle = Handle::open(candidate.family(), candidate.sock_type(), candidate.protocol())?;
        handle.connect(candidate.address())?;
        Ok(self.wrap(handle))
    }
}

/// Connects to `host` on `service` (a port number or service name) with default options.
///
/// See [`ConnectionOptions::connect()`].
#[inline]
pub fn connect_to(host: &str, service: &str) -> Result<Connection> {
    ConnectionOptions::new().connect(host, service)
}

/// A connected byte stream with an internal receive buffer.
///
/// The read methods return a slice of the internal buffer which stays valid until the next
/// operation on the connection. Every operation first checks that the connection has not been
/// [closed](Self::close), failing with [`Error::Closed`] before the transport is touched, and
/// then that the transport is still valid, failing with [`Error::InvalidHandle`] otherwise.
///
/// Nothing is ever retried. An [`Interrupted`](crate::ErrorKind::Interrupted) failure is
/// reported to the caller like any other, and the data received so far by the failed call is
/// discarded.
pub struct Connection {
    transport: Box<dyn Transport>,
    buffer: Vec<u8>,
    buffer_capacity: usize,
    max_frame_len: Option<usize>,
    closed: bool,
}
impl Connection {
    /// Wraps a connected handle with default options.
    #[inline]
    pub fn new(handle: Handle) -> Self { ConnectionOptions::new().wrap(handle) }
    /// Wraps any [`Transport`] with default options.
    #[inline]
    pub fn from_transport(transport: impl Transport + 'static) -> Self {
        ConnectionOptions::new().wrap_transport(transport)
    }

    fn check_state(&self, operation: &'static str) -> Result<()> {
        if self.closed {
            return Err(Error::Closed { resource: "Connection", operation });
        }
        if !self.transport.is_valid() {
            return Err(Error::InvalidHandle { resource: "Connection", operation });
        }
        Ok(())
    }

    /// Receives at most `max_n` bytes with a single receive call.
    ///
    /// May return fewer bytes than requested. An empty slice means the peer has closed the
    /// connection, which is not treated as an error here.
    pub fn read(&mut self, max_n: usize) -> Result<&[u8]> {
        self.check_state("read")?;
        self.reset_buffer(max_n)?;
        match self.transport.recv(&mut self.buffer) {
            Ok(received) => {
                self.buffer.truncate(received);
                Ok(&self.buffer)
            }
            Err(e) => {
                self.buffer.clear();
                Err(e)
            }
        }
    }

    /// Receives exactly `n` bytes, calling the transport as many times as it takes.
    ///
    /// # Errors
    /// If the peer closes the connection before `n` bytes have arrived, fails with
    /// [`Error::Read`] of kind [`ConnectionReset`](crate::ErrorKind::ConnectionReset). A short
    /// result is never returned.
    ///
    /// A count too large to allocate a buffer for fails with [`Error::InvalidArgument`] before
    /// the transport is touched. The same holds for [`read()`](Self::read).
    pub fn read_exactly(&mut self, n: usize) -> Result<&[u8]> {
        self.check_state("read_exactly")?;
        self.reset_buffer(n)?;
        if let Err(e) = self.fill_exactly() {
            self.buffer.clear();
            return Err(e);
        }
        Ok(&self.buffer)
    }
    /// Empties the buffer and zero-fills it to `len` bytes.
    fn reset_buffer(&mut self, len: usize) -> Result<()> {
        self.buffer.clear();
        self.grow_buffer(len)
    }
    fn grow_buffer(&mut self, len: usize) -> Result<()> {
        let additional = len.saturating_sub(self.buffer.len());
        self.buffer.try_reserve(additional).map_err(|_| {
            Error::InvalidArgument(format!("cannot allocate a receive buffer of {len} bytes"))
        })?;
        self.buffer.resize(len, 0);
        Ok(())
    }
    fn fill_exactly(&mut self) -> Result<()> {
        let n = self.buffer.len();
        let mut filled = 0_usize;
        while filled < n {
            let received = self.transport.recv(&mut self.buffer[filled..])?;
            if received == 0 {
                return Err(Error::peer_closed());
            }
            filled += received.min(n - filled);
        }
        Ok(())
    }

    /// Receives until `delim` has been seen and returns everything up to and including it.
    ///
    /// Data that arrived in the same receive call after the delimiter is discarded. The buffer
    /// starts at the configured capacity and doubles whenever it fills up without a match, so
    /// frames of any length are accepted unless a maximum frame length was set.
    ///
    /// # Errors
    /// - [`Error::InvalidArgument`] if `delim` is empty.
    /// - [`Error::Read`] of kind [`ConnectionReset`](crate::ErrorKind::ConnectionReset) if the
    ///   peer closes the connection before the delimiter arrives.
    /// - [`Error::FrameTooLong`] if a maximum frame length is configured and no delimiter was
    ///   found within it.
    pub fn read_until(&mut self, delim: &[u8]) -> Result<&[u8]> {
        self.check_state("read_until")?;
        if delim.is_empty() {
            return Err(Error::InvalidArgument("the delimiter must not be empty".to_owned()));
        }
        self.reset_buffer(self.buffer_capacity)?;
        match self.fill_until(delim) {
            Ok(frame_len) => {
                self.buffer.truncate(frame_len);
                Ok(&self.buffer)
            }
            Err(e) => {
                self.buffer.clear();
                Err(e)
            }
        }
    }
    fn fill_until(&mut self, delim: &[u8]) -> Result<usize> {
        let mut filled = 0_usize;
        loop {
            // A delimiter may straddle the previous chunk boundary.
            let search_start = filled.saturating_sub(delim.len() - 1);

            if let Some(limit) = self.max_frame_len {
                if filled >= limit {
                    return Err(Error::FrameTooLong { limit });
                }
            }
            if filled == self.buffer.len() {
                let new_len = filled.saturating_mul(2).max(1);
                tracing::trace!(from = filled, to = new_len, "growing receive buffer");
                self.grow_buffer(new_len)?;
            }
            let window_end = match self.max_frame_len {
                Some(limit) => self.buffer.len().min(limit),
                None => self.buffer.len(),
            };

            let received = self.transport.recv(&mut self.buffer[filled..window_end])?;
            if received == 0 {
                return Err(Error::peer_closed());
            }
            filled += received.min(window_end - filled);

            if let Some(pos) = find_subslice(&self.buffer[search_start..filled], delim) {
                return Ok(search_start + pos + delim.len());
            }
        }
    }

    /// Sends `bytes` with a single send call and returns how many were accepted, which may be
    /// fewer than `bytes.len()`.
    pub fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        self.check_state("write")?;
        self.transport.send(bytes)
    }

    /// Whether [`close()`](Self::close) has been called.
    #[inline]
    pub fn closed(&self) -> bool { self.closed }

    /// Closes the transport. Calling this again has no effect. The connection counts as closed
    /// even if the transport reports an error.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.buffer = Vec::new();
        if self.transport.is_valid() {
            self.transport.close()?;
        }
        Ok(())
    }

    /// Address of the remote end.
    pub fn peer_address(&self) -> Result<IpAddress> {
        self.check_state("peer_address")?;
        self.transport.peer_address()
    }
    /// Address of the local end.
    pub fn local_address(&self) -> Result<IpAddress> {
        self.check_state("local_address")?;
        self.transport.local_address()
    }

    /// The initial size of the receive buffer used by [`read_until()`](Self::read_until).
    #[inline]
    pub fn buffer_capacity(&self) -> usize { self.buffer_capacity }
    /// The configured maximum frame length, if any.
    #[inline]
    pub fn max_frame_len(&self) -> Option<usize> { self.max_frame_len }
}

impl Debug for Connection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("transport", &self.transport)
            .field("buffered", &self.buffer.len())
            .field("buffer_capacity", &self.buffer_capacity)
            .field("max_frame_len", &self.max_frame_len)
            .field("closed", &self.closed)
            .finish()
    }
}

/// Reads straight into the caller's buffer with a single receive call, bypassing the internal
/// buffer.
impl io::Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.check_state("read")?;
        Ok(self.transport.recv(buf)?)
    }
}
/// Writes with a single send call. Flushing does nothing, as there is no write buffer.
impl io::Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.check_state("write")?;
        Ok(self.transport.send(buf)?)
    }
    #[inline]
    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}
