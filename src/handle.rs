//! Exclusive ownership of one OS socket.

use crate::{
    addr::{IpAddress, IpFamily, Protocol, SockType},
    error::{Error, Result},
};
use std::fmt::{self, Debug, Formatter};

impmod! {c_wrappers,
    self as c_wrappers,
    SysSocket,
}
impmod! {sockaddr,
    NativeAddr,
}

#[cfg(unix)]
pub(crate) type BorrowedSock<'a> = std::os::fd::BorrowedFd<'a>;
#[cfg(windows)]
pub(crate) type BorrowedSock<'a> = std::os::windows::io::BorrowedSocket<'a>;

flag_set! {
    /// Flags for [`Handle::send()`] and [`Handle::recv()`], translated to the platform's `MSG_*`
    /// constants.
    pub struct MsgFlags {
        /// Receive without removing the data from the queue.
        const PEEK = 0;
        /// Send or receive out-of-band data.
        const OUT_OF_BAND = 1;
        /// Block until the full buffer is filled. May still return less on errors or shutdown.
        const WAIT_ALL = 2;
        /// Bypass routing and send directly to the interface.
        const DONT_ROUTE = 3;
    }
}

/// An exclusively owned OS socket, or nothing.
///
/// A handle becomes invalid when it is [closed](Self::close) or constructed with
/// [`invalid()`](Self::invalid). Every operation on an invalid handle fails with
/// [`Error::InvalidHandle`] without touching the OS. Dropping a valid handle closes the socket;
/// a socket is never closed twice.
pub struct Handle {
    sock: Option<SysSocket>,
}
impl Handle {
    /// Opens a new socket.
    ///
    /// The socket is created non-inheritable (close-on-exec on Unix). On platforms where sending
    /// to a closed peer would raise `SIGPIPE`, the signal is suppressed.
    ///
    /// # Errors
    /// - [`Error::InvalidArgument`] if `family` is [`IpFamily::Any`].
    /// - [`Error::Method`] for `"socket"` if the OS refuses.
    pub fn open(family: IpFamily, sock_type: SockType, protocol: Protocol) -> Result<Self> {
        if family == IpFamily::Any {
            return Err(Error::InvalidArgument(
                "a socket can only be opened for a concrete address family".to_owned(),
            ));
        }
        let sock = c_wrappers::socket(
            c_wrappers::native_family(family),
            c_wrappers::native_sock_type(sock_type),
            c_wrappers::native_protocol(protocol),
        )
        .map_err(|code| Error::method("socket", code))?;
        tracing::debug!(?family, ?sock_type, ?protocol, "opened socket");
        Ok(Self { sock: Some(sock) })
    }

    /// A handle that owns nothing.
    #[inline]
    pub const fn invalid() -> Self { Self { sock: None } }

    /// Whether the handle currently owns a socket.
    #[inline]
    pub fn is_valid(&self) -> bool { self.sock.is_some() }

    pub(crate) fn borrowed(&self, operation: &'static str) -> Result<BorrowedSock<'_>> {
        #[cfg(unix)]
        use std::os::fd::AsFd as AsSock;
        #[cfg(windows)]
        use std::os::windows::io::AsSocket as AsSock;

        match &self.sock {
            #[cfg(unix)]
            Some(sock) => Ok(sock.as_fd()),
            #[cfg(windows)]
            Some(sock) => Ok(sock.as_socket()),
            None => Err(Error::InvalidHandle { resource: "Handle", operation }),
        }
    }

    /// Binds the socket to a local address.
    pub fn bind(&self, address: &IpAddress) -> Result<()> {
        let sock = self.borrowed("bind")?;
        c_wrappers::bind(sock, &NativeAddr::from(address))
            .map_err(|code| Error::method("bind", code))?;
        tracing::debug!(%address, port = address.port(), "bound socket");
        Ok(())
    }

    /// Connects the socket to a remote address, blocking until the connection is established or
    /// refused.
    pub fn connect(&self, address: &IpAddress) -> Result<()> {
        let sock = self.borrowed("connect")?;
        c_wrappers::connect(sock, &NativeAddr::from(address))
            .map_err(|code| Error::method("connect", code))?;
        tracing::debug!(%address, port = address.port(), "connected");
        Ok(())
    }

    /// Marks the socket as passive, with room for `backlog` pending connections.
    pub fn listen(&self, backlog: u32) -> Result<()> {
        let sock = self.borrowed("listen")?;
        let backlog = i32::try_from(backlog).unwrap_or(i32::MAX);
        c_wrappers::listen(sock, backlog).map_err(|code| Error::method("listen", code))?;
        tracing::debug!(backlog, "listening");
        Ok(())
    }

    /// Blocks until a client connects and returns the handle of the new connection.
    #[inline]
    pub fn accept(&self) -> Result<Handle> { self.accept_from().map(|(handle, _)| handle) }

    /// Like [`accept()`](Self::accept), but also reports the address of the client.
    pub fn accept_from(&self) -> Result<(Handle, IpAddress)> {
        let sock = self.borrowed("accept")?;
        let (new_sock, native) =
            c_wrappers::accept(sock).map_err(|code| Error::method("accept", code))?;
        let new_handle = Self { sock: Some(new_sock) };
        let peer = native.to_ip_address()?;
        tracing::debug!(%peer, port = peer.port(), "accepted connection");
        Ok((new_handle, peer))
    }

    /// The address of the remote end of a connected socket.
    pub fn peer_address(&self) -> Result<IpAddress> {
        let sock = self.borrowed("peer_address")?;
        c_wrappers::peer_name(sock)
            .map_err(|code| Error::method("getpeername", code))?
            .to_ip_address()
    }

    /// The address the socket is bound to. Useful to learn the port after binding to port 0.
    pub fn local_address(&self) -> Result<IpAddress> {
        let sock = self.borrowed("local_address")?;
        c_wrappers::sock_name(sock)
            .map_err(|code| Error::method("getsockname", code))?
            .to_ip_address()
    }

    /// Performs one send call and returns how many bytes the OS accepted, which may be fewer than
    /// `buf.len()`. Never retries.
    pub fn send(&self, buf: &[u8], flags: MsgFlags) -> Result<usize> {
        let sock = self.borrowed("send")?;
        let sent = c_wrappers::send(sock, buf, c_wrappers::native_msg_flags(flags))
            .map_err(Error::write)?;
        tracing::trace!(requested = buf.len(), sent, "send");
        Ok(sent)
    }

    /// Performs one receive call. Returns 0 if the peer has performed an orderly shutdown.
    /// Never retries.
    pub fn recv(&self, buf: &mut [u8], flags: MsgFlags) -> Result<usize> {
        let sock = self.borrowed("recv")?;
        let capacity = buf.len();
        let received = c_wrappers::recv(sock, buf, c_wrappers::native_msg_flags(flags))
            .map_err(Error::read)?;
        tracing::trace!(capacity, received, "recv");
        Ok(received)
    }

    /// Releases the socket. The handle is invalid afterwards, even if the OS reports an error.
    pub fn close(&mut self) -> Result<()> {
        let Some(sock) = self.sock.take() else {
            return Err(Error::InvalidHandle { resource: "Handle", operation: "close" });
        };
        c_wrappers::close(sock).map_err(|code| Error::method("close", code))?;
        tracing::debug!("closed socket");
        Ok(())
    }
}

impl Default for Handle {
    #[inline]
    fn default() -> Self { Self::invalid() }
}

impl Debug for Handle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("Handle");
        match self.borrowed("fmt") {
            #[cfg(unix)]
            Ok(sock) => dbg.field("fd", &std::os::fd::AsRawFd::as_raw_fd(&sock)),
            #[cfg(windows)]
            Ok(sock) => dbg.field("socket", &std::os::windows::io::AsRawSocket::as_raw_socket(&sock)),
            Err(..) => dbg.field("socket", &"invalid"),
        };
        dbg.finish()
    }
}

#[cfg(unix)]
impl From<std::os::fd::OwnedFd> for Handle {
    /// Takes ownership of a descriptor, which is assumed to be a socket.
    #[inline]
    fn from(fd: std::os::fd::OwnedFd) -> Self { Self { sock: Some(fd) } }
}
#[cfg(windows)]
impl From<std::os::windows::io::OwnedSocket> for Handle {
    #[inline]
    fn from(sock: std::os::windows::io::OwnedSocket) -> Self { Self { sock: Some(sock) } }
}
