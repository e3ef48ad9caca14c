//! Listening TCP sockets.

use crate::{
    addr::{IpAddress, IpFamily, Protocol, SockType},
    connection::{Connection, ConnectionOptions},
    error::{Error, Result},
    handle::Handle,
    resolve::{resolve, AddrInfoFlags, ResolveHints},
};
use std::iter::FusedIterator;

/// Length of the queue of pending connections used unless specified otherwise.
pub const DEFAULT_BACKLOG: u32 = 1024;

/// A builder for [`Listener`]s.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ListenerOptions {
    pub(crate) backlog: u32,
    pub(crate) flags: AddrInfoFlags,
    pub(crate) reuse_address: bool,
    pub(crate) ipv6_only: Option<bool>,
    pub(crate) connection: ConnectionOptions,
}

/// Creation.
impl ListenerOptions {
    /// Creates an options table with default values.
    #[inline]
    pub fn new() -> Self {
        Self {
            backlog: DEFAULT_BACKLOG,
            flags: AddrInfoFlags::PASSIVE | AddrInfoFlags::ADDRESS_CONFIG,
            reuse_address: false,
            ipv6_only: None,
            connection: ConnectionOptions::new(),
        }
    }
}
impl Default for ListenerOptions {
    #[inline]
    fn default() -> Self { Self::new() }
}

/// Option setters.
impl ListenerOptions {
    builder_setters! {
        /// Sets the length of the queue of pending connections.
        ///
        /// The default is [`DEFAULT_BACKLOG`].
        backlog: u32,
        /// Sets the resolver flags used by [`bind()`](Self::bind).
        ///
        /// The default is `PASSIVE | ADDRESS_CONFIG`.
        flags: AddrInfoFlags,
        /// Sets whether `SO_REUSEADDR` is enabled before binding.
        ///
        /// Disabled by default.
        reuse_address: bool,
        /// Sets whether an IPv6 listener refuses IPv4-mapped connections. `None` leaves the
        /// system default in place.
        ipv6_only: Option<bool>,
        /// Sets the options applied to every accepted connection.
        connection: ConnectionOptions,
    }
}

/// Listener constructors.
impl ListenerOptions {
    /// Resolves `host` and `service` as a passive TCP endpoint, then binds to and listens on the
    /// first address returned.
    ///
    /// An empty `host` binds to the wildcard address.
    ///
    /// # Errors
    /// - Resolution errors from [`resolve()`].
    /// - [`Error::NoAddresses`] if the resolver succeeded but returned nothing.
    /// - [`Error::Method`] for `"socket"`, `"setsockopt"`, `"bind"` or `"listen"`.
    pub fn bind(self, host: &str, service: &str) -> Result<Listener> {
        let hints = ResolveHints::tcp().flags(self.flags);
        let candidates = resolve(host, service, &hints)?;
        let Some(candidate) = candidates.first() else {
            return Err(Error::NoAddresses { host: host.to_owned() });
        };
        let handle = Handle::open(candidate.family(), candidate.sock_type(), candidate.protocol())?;
        self.listen_on(handle, candidate.address())
    }

    /// Binds to and listens on a known address, without consulting the resolver.
    pub fn bind_address(self, address: &IpAddress) -> Result<Listener> {
        let handle = Handle::open(address.family(), SockType::Stream, Protocol::Tcp)?;
        self.listen_on(handle, address)
    }

    fn listen_on(self, handle: Handle, address: &IpAddress) -> Result<Listener> {
        if self.reuse_address {
            handle.set_reuse_address(true)?;
        }
        if let (Some(ipv6_only), IpFamily::V6) = (self.ipv6_only, address.family()) {
            handle.set_ipv6_only(ipv6_only)?;
        }
        handle.bind(address)?;
        handle.listen(self.backlog)?;
        Ok(Listener { handle, connection: self.connection })
    }
}

/// A TCP socket listening for incoming connections.
///
/// Dropping the listener closes the socket.
#[derive(Debug)]
pub struct Listener {
    handle: Handle,
    connection: ConnectionOptions,
}
impl Listener {
    /// Resolves `host` and `service` and listens on the first address found, with room for
    /// `backlog` pending connections.
    ///
    /// See [`ListenerOptions::bind()`].
    pub fn bind_and_listen(host: &str, service: &str, backlog: u32) -> Result<Self> {
        ListenerOptions::new().backlog(backlog).bind(host, service)
    }

    /// Listens on a known address with room for `backlog` pending connections.
    pub fn bind_address(address: &IpAddress, backlog: u32) -> Result<Self> {
        ListenerOptions::new().backlog(backlog).bind_address(address)
    }

    /// Blocks until a client connects.
    #[inline]
    pub fn accept(&self) -> Result<Connection> { self.accept_from().map(|(conn, _)| conn) }

    /// Blocks until a client connects, and also reports the client's address.
    pub fn accept_from(&self) -> Result<(Connection, IpAddress)> {
        let (handle, peer) = self.handle.accept_from()?;
        Ok((self.connection.wrap(handle), peer))
    }

    /// The address the listener is bound to.
    #[inline]
    pub fn local_address(&self) -> Result<IpAddress> { self.handle.local_address() }

    /// An infinite iterator over incoming connections, calling [`accept()`](Self::accept) once
    /// per item.
    #[inline]
    pub fn incoming(&self) -> Incoming<'_> { Incoming(self) }

    /// The underlying handle, for setting further socket options.
    #[inline]
    pub fn handle(&self) -> &Handle { &self.handle }
}

/// An infinite iterator over the connections accepted by a [`Listener`].
///
/// Errors are yielded as items and do not end the iteration.
#[derive(Debug)]
pub struct Incoming<'l>(&'l Listener);
impl Iterator for Incoming<'_> {
    type Item = Result<Connection>;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> { Some(self.0.accept()) }
    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) { (usize::MAX, None) }
}
impl FusedIterator for Incoming<'_> {}
impl<'l> IntoIterator for &'l Listener {
    type Item = Result<Connection>;
    type IntoIter = Incoming<'l>;
    #[inline]
    fn into_iter(self) -> Self::IntoIter { self.incoming() }
}
