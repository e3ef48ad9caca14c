//! IPv4/IPv6 address values stored in network byte order.
//!
//! [`IpAddress`] is what every other part of the crate passes around: the listener binds to one,
//! accepted connections report one for the peer, and [`resolve`](crate::resolve::resolve) yields
//! them inside [`CandidateAddress`](crate::resolve::CandidateAddress)es. All multi-byte fields are
//! kept as big-endian byte arrays, which is exactly how the native address structures hold them,
//! so conversions in and out of those structures are plain byte copies.

use crate::error::{Error, Result};
use std::{
    fmt::{self, Display, Formatter},
    net::{Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6},
};

/// Address family selector, used both for opening sockets and as a resolver hint.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum IpFamily {
    /// Unspecified. Only meaningful as a resolver hint.
    #[default]
    Any,
    /// IPv4.
    V4,
    /// IPv6.
    V6,
}

/// Socket type.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum SockType {
    /// Reliable byte stream (TCP).
    #[default]
    Stream,
    /// Datagrams (UDP).
    Datagram,
    /// Raw protocol access.
    Raw,
}

/// Transport protocol.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Let the OS pick the default protocol for the socket type.
    #[default]
    Unspecified,
    /// TCP.
    Tcp,
    /// UDP.
    Udp,
}

/// An IPv4 endpoint: address and port, both in network byte order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct V4Address {
    port: [u8; 2],
    address: [u8; 4],
}
impl V4Address {
    /// Creates an endpoint from address octets and a port in host byte order.
    #[inline]
    pub const fn new(address: [u8; 4], port: u16) -> Self {
        Self { port: port.to_be_bytes(), address }
    }
    /// Creates an endpoint from raw network-order fields, copied as-is.
    #[inline]
    pub const fn from_network_bytes(address: [u8; 4], port: [u8; 2]) -> Self {
        Self { port, address }
    }
    /// The port in host byte order.
    #[inline]
    pub const fn port(&self) -> u16 { u16::from_be_bytes(self.port) }
    /// The port as stored, in network byte order.
    #[inline]
    pub const fn port_bytes(&self) -> [u8; 2] { self.port }
    /// The address octets, most significant first.
    #[inline]
    pub const fn octets(&self) -> [u8; 4] { self.address }
    /// Whether the address is in `127.0.0.0/8`.
    #[inline]
    pub const fn is_loopback(&self) -> bool { self.address[0] == 127 }
}

/// An IPv6 endpoint. Port, flow information and scope ID are all kept in network byte order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct V6Address {
    port: [u8; 2],
    flow_info: [u8; 4],
    address: [u8; 16],
    scope_id: [u8; 4],
}
impl V6Address {
    /// Creates an endpoint from the address bytes and host-order port, flow information and
    /// scope ID.
    #[inline]
    pub const fn new(address: [u8; 16], port: u16, flow_info: u32, scope_id: u32) -> Self {
        Self {
            port: port.to_be_bytes(),
            flow_info: flow_info.to_be_bytes(),
            address,
            scope_id: scope_id.to_be_bytes(),
        }
    }
    /// Creates an endpoint from raw network-order fields, copied as-is.
    #[inline]
    pub const fn from_network_bytes(
        address: [u8; 16],
        port: [u8; 2],
        flow_info: [u8; 4],
        scope_id: [u8; 4],
    ) -> Self {
        Self { port, flow_info, address, scope_id }
    }
    /// The port in host byte order.
    #[inline]
    pub const fn port(&self) -> u16 { u16::from_be_bytes(self.port) }
    /// The port as stored, in network byte order.
    #[inline]
    pub const fn port_bytes(&self) -> [u8; 2] { self.port }
    /// The flow information in host byte order.
    #[inline]
    pub const fn flow_info(&self) -> u32 { u32::from_be_bytes(self.flow_info) }
    /// The flow information as stored, in network byte order.
    #[inline]
    pub const fn flow_info_bytes(&self) -> [u8; 4] { self.flow_info }
    /// The scope ID in host byte order.
    #[inline]
    pub const fn scope_id(&self) -> u32 { u32::from_be_bytes(self.scope_id) }
    /// The scope ID as stored, in network byte order.
    #[inline]
    pub const fn scope_id_bytes(&self) -> [u8; 4] { self.scope_id }
    /// The 16 address bytes, most significant first.
    #[inline]
    pub const fn octets(&self) -> [u8; 16] { self.address }
    /// Whether the address is exactly `::1`.
    #[inline]
    pub fn is_loopback(&self) -> bool { self.address == Ipv6Addr::LOCALHOST.octets() }
}

/// An IPv4 or IPv6 endpoint. The variant is the address family, so the two can never disagree.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IpAddress {
    /// IPv4 endpoint.
    V4(V4Address),
    /// IPv6 endpoint.
    V6(V6Address),
}
impl IpAddress {
    /// Parses an address in dotted-decimal (IPv4) or colon-hex (IPv6) notation and pairs it with
    /// a port given in host byte order.
    ///
    /// Fails with [`Error::InvalidArgument`] if `family` is [`IpFamily::Any`] or `text` is not a
    /// valid literal of the requested family.
    pub fn parse(family: IpFamily, text: &str, port: u16) -> Result<Self> {
        let bad_text = || Error::InvalidArgument(format!("{text:?} is not a valid {family:?} address"));
        match family {
            IpFamily::V4 => {
                let ip = text.parse::<Ipv4Addr>().map_err(|_| bad_text())?;
                Ok(Self::V4(V4Address::new(ip.octets(), port)))
            }
            IpFamily::V6 => {
                let ip = text.parse::<Ipv6Addr>().map_err(|_| bad_text())?;
                Ok(Self::V6(V6Address::new(ip.octets(), port, 0, 0)))
            }
            IpFamily::Any => Err(Error::InvalidArgument(
                "address family must be either IPv4 or IPv6".to_owned(),
            )),
        }
    }

    /// The address family.
    #[inline]
    pub const fn family(&self) -> IpFamily {
        match self {
            Self::V4(..) => IpFamily::V4,
            Self::V6(..) => IpFamily::V6,
        }
    }
    /// The port in host byte order.
    #[inline]
    pub const fn port(&self) -> u16 {
        match self {
            Self::V4(a) => a.port(),
            Self::V6(a) => a.port(),
        }
    }
    /// Whether this is the loopback address of its family.
    #[inline]
    pub fn is_loopback(&self) -> bool {
        match self {
            Self::V4(a) => a.is_loopback(),
            Self::V6(a) => a.is_loopback(),
        }
    }
    /// Returns `true` for IPv4 endpoints.
    #[inline]
    pub const fn is_ipv4(&self) -> bool { matches!(self, Self::V4(..)) }
    /// Returns `true` for IPv6 endpoints.
    #[inline]
    pub const fn is_ipv6(&self) -> bool { matches!(self, Self::V6(..)) }
    /// The IPv4 payload, if this is an IPv4 endpoint.
    #[inline]
    pub const fn as_v4(&self) -> Option<&V4Address> {
        match self {
            Self::V4(a) => Some(a),
            Self::V6(..) => None,
        }
    }
    /// The IPv6 payload, if this is an IPv6 endpoint.
    #[inline]
    pub const fn as_v6(&self) -> Option<&V6Address> {
        match self {
            Self::V6(a) => Some(a),
            Self::V4(..) => None,
        }
    }
}

/// Formats the address alone, without the port, in canonical textual form.
impl Display for IpAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4(a) => Display::fmt(&Ipv4Addr::from(a.octets()), f),
            Self::V6(a) => Display::fmt(&Ipv6Addr::from(a.octets()), f),
        }
    }
}

impl From<V4Address> for IpAddress {
    #[inline]
    fn from(a: V4Address) -> Self { Self::V4(a) }
}
impl From<V6Address> for IpAddress {
    #[inline]
    fn from(a: V6Address) -> Self { Self::V6(a) }
}
impl From<SocketAddr> for IpAddress {
    fn from(sa: SocketAddr) -> Self {
        match sa {
            SocketAddr::V4(sa) => Self::V4(V4Address::new(sa.ip().octets(), sa.port())),
            SocketAddr::V6(sa) => Self::V6(V6Address::new(
                sa.ip().octets(),
                sa.port(),
                sa.flowinfo(),
                sa.scope_id(),
            )),
        }
    }
}
impl From<IpAddress> for SocketAddr {
    fn from(a: IpAddress) -> Self {
        match a {
            IpAddress::V4(a) => SocketAddrV4::new(a.octets().into(), a.port()).into(),
            IpAddress::V6(a) => {
                SocketAddrV6::new(a.octets().into(), a.port(), a.flow_info(), a.scope_id()).into()
            }
        }
    }
}
