//! Pass-through socket options on [`Handle`].

use crate::{
    error::{Error, Result},
    handle::Handle,
};
#[cfg(unix)]
use libc::{
    IPPROTO_IPV6, IPV6_V6ONLY, SOL_SOCKET, SO_BROADCAST, SO_DEBUG, SO_KEEPALIVE, SO_RCVBUF,
    SO_REUSEADDR, SO_SNDBUF,
};
#[cfg(windows)]
use windows_sys::Win32::Networking::WinSock::{
    IPPROTO_IPV6, IPV6_V6ONLY, SOL_SOCKET, SO_BROADCAST, SO_DEBUG, SO_KEEPALIVE, SO_RCVBUF,
    SO_REUSEADDR, SO_SNDBUF,
};

impmod! {c_wrappers,
    setsockopt_int,
    getsockopt_int,
}

impl Handle {
    fn set_int_option(&self, operation: &'static str, level: i32, name: i32, value: i32) -> Result<()> {
        let sock = self.borrowed(operation)?;
        setsockopt_int(sock, level, name, value).map_err(|code| Error::method("setsockopt", code))?;
        tracing::debug!(option = operation, value, "set socket option");
        Ok(())
    }
    fn get_int_option(&self, operation: &'static str, level: i32, name: i32) -> Result<i32> {
        let sock = self.borrowed(operation)?;
        getsockopt_int(sock, level, name).map_err(|code| Error::method("getsockopt", code))
    }

    /// Allows binding to an address that is still in `TIME_WAIT` from a previous socket.
    pub fn set_reuse_address(&self, enable: bool) -> Result<()> {
        self.set_int_option("set_reuse_address", SOL_SOCKET, SO_REUSEADDR, enable.into())
    }
    /// Enables or disables TCP keepalive probes.
    pub fn set_keepalive(&self, enable: bool) -> Result<()> {
        self.set_int_option("set_keepalive", SOL_SOCKET, SO_KEEPALIVE, enable.into())
    }
    /// Turns on debug recording in the protocol stack. Enabling it may require elevated
    /// privileges.
    pub fn set_debug(&self, enable: bool) -> Result<()> {
        self.set_int_option("set_debug", SOL_SOCKET, SO_DEBUG, enable.into())
    }
    /// Whether debug recording is on.
    pub fn debug(&self) -> Result<bool> {
        self.get_int_option("debug", SOL_SOCKET, SO_DEBUG).map(|v| v != 0)
    }
    /// Permits sending to broadcast addresses. Only meaningful for datagram sockets.
    pub fn set_broadcast(&self, enable: bool) -> Result<()> {
        self.set_int_option("set_broadcast", SOL_SOCKET, SO_BROADCAST, enable.into())
    }
    /// Restricts an IPv6 socket to IPv6 traffic only, or lets it also accept IPv4-mapped
    /// connections. Must be set before binding.
    pub fn set_ipv6_only(&self, enable: bool) -> Result<()> {
        self.set_int_option("set_ipv6_only", IPPROTO_IPV6 as i32, IPV6_V6ONLY, enable.into())
    }
    /// Whether an IPv6 socket is restricted to IPv6 traffic.
    pub fn ipv6_only(&self) -> Result<bool> {
        self.get_int_option("ipv6_only", IPPROTO_IPV6 as i32, IPV6_V6ONLY).map(|v| v != 0)
    }
    /// Sets the size of the kernel send buffer. The OS may round or double the value.
    pub fn set_send_buffer_size(&self, size: usize) -> Result<()> {
        let size = i32::try_from(size).unwrap_or(i32::MAX);
        self.set_int_option("set_send_buffer_size", SOL_SOCKET, SO_SNDBUF, size)
    }
    /// Sets the size of the kernel receive buffer. The OS may round or double the value.
    pub fn set_recv_buffer_size(&self, size: usize) -> Result<()> {
        let size = i32::try_from(size).unwrap_or(i32::MAX);
        self.set_int_option("set_recv_buffer_size", SOL_SOCKET, SO_RCVBUF, size)
    }
}
