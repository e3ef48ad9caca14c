//! The byte-stream seam underneath [`Connection`](crate::Connection).

use crate::{
    addr::IpAddress,
    error::{Error, Result},
    handle::{Handle, MsgFlags},
};
use std::fmt::Debug;

/// A blocking, connected byte stream that a [`Connection`](crate::Connection) reads from and
/// writes to.
///
/// [`Handle`] is the production implementation. Anything else implementing this trait, such as
/// an in-memory stream, can be wrapped with
/// [`ConnectionOptions::wrap_transport()`](crate::ConnectionOptions::wrap_transport).
pub trait Transport: Debug + Send {
    /// Whether the transport can still be used. Checked before every connection operation.
    fn is_valid(&self) -> bool;
    /// Receives up to `buf.len()` bytes with one underlying call. Returns 0 on orderly shutdown.
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize>;
    /// Sends as much of `buf` as one underlying call accepts and returns the amount.
    fn send(&mut self, buf: &[u8]) -> Result<usize>;
    /// Releases the transport. It must report itself as invalid afterwards.
    fn close(&mut self) -> Result<()>;
    /// Address of the remote end.
    fn peer_address(&self) -> Result<IpAddress> { Err(Error::Unsupported("peer_address")) }
    /// Address of the local end.
    fn local_address(&self) -> Result<IpAddress> { Err(Error::Unsupported("local_address")) }
}

impl Transport for Handle {
    #[inline]
    fn is_valid(&self) -> bool { Handle::is_valid(self) }
    #[inline]
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize> { Handle::recv(self, buf, MsgFlags::NONE) }
    #[inline]
    fn send(&mut self, buf: &[u8]) -> Result<usize> { Handle::send(self, buf, MsgFlags::NONE) }
    #[inline]
    fn close(&mut self) -> Result<()> { Handle::close(self) }
    #[inline]
    fn peer_address(&self) -> Result<IpAddress> { Handle::peer_address(self) }
    #[inline]
    fn local_address(&self) -> Result<IpAddress> { Handle::local_address(self) }
}
