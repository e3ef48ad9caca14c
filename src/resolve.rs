//! Name resolution through the system resolver.

use crate::{
    addr::{IpAddress, IpFamily, Protocol, SockType},
    error::Result,
    misc::to_cstring,
};

impmod! {resolver,
    resolve as os_resolve,
}

flag_set! {
    /// Resolver behavior flags, translated to the platform's `AI_*` constants.
    pub struct AddrInfoFlags {
        /// The host is a numeric address literal; never perform a name lookup.
        const NUMERIC_HOST = 0;
        /// The service is a numeric port; never consult the services database.
        const NUMERIC_SERVICE = 1;
        /// The result will be used for binding. With no host, yields the wildcard address.
        const PASSIVE = 2;
        /// Only return address families for which the system has a configured interface.
        const ADDRESS_CONFIG = 3;
        /// Return IPv4-mapped IPv6 addresses when an IPv6 lookup finds only IPv4 ones.
        const V4_MAPPED = 4;
    }
}

/// Constraints passed to the resolver along with the host and service.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ResolveHints {
    /// Resolver flags.
    pub flags: AddrInfoFlags,
    /// Requested address family, or [`IpFamily::Any`] for both.
    pub family: IpFamily,
    /// Requested socket type, or `None` to let the resolver return every type it knows of.
    pub sock_type: Option<SockType>,
    /// Requested protocol.
    pub protocol: Protocol,
}
impl ResolveHints {
    /// Hints with no constraints at all.
    #[inline]
    pub fn new() -> Self { Self::default() }
    /// Hints for TCP stream sockets of any family.
    #[inline]
    pub fn tcp() -> Self {
        Self { sock_type: Some(SockType::Stream), protocol: Protocol::Tcp, ..Self::default() }
    }
    builder_setters! {
        /// Sets the resolver flags.
        flags: AddrInfoFlags,
        /// Sets the requested address family.
        family: IpFamily,
        /// Sets the requested socket type.
        sock_type: Option<SockType>,
        /// Sets the requested protocol.
        protocol: Protocol,
    }
}

/// One entry of a resolver result: an address together with the socket parameters it is meant
/// to be used with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CandidateAddress {
    pub(crate) family: IpFamily,
    pub(crate) sock_type: SockType,
    pub(crate) protocol: Protocol,
    pub(crate) address: IpAddress,
}
impl CandidateAddress {
    /// Address family of the entry. Always [`IpFamily::V4`] or [`IpFamily::V6`].
    #[inline]
    pub fn family(&self) -> IpFamily { self.family }
    /// Socket type to open for this entry.
    #[inline]
    pub fn sock_type(&self) -> SockType { self.sock_type }
    /// Protocol to open for this entry.
    #[inline]
    pub fn protocol(&self) -> Protocol { self.protocol }
    /// The resolved endpoint.
    #[inline]
    pub fn address(&self) -> &IpAddress { &self.address }
}

/// Resolves `host` and `service` into candidate addresses, in the order the resolver returned
/// them.
///
/// An empty `host` or `service` is passed to the resolver as absent; combined with
/// [`AddrInfoFlags::PASSIVE`], an absent host yields the wildcard address. Entries of families
/// other than IPv4 and IPv6 are skipped.
///
/// # Errors
/// - [`Error::InvalidArgument`](crate::Error::InvalidArgument) if either string contains a nul
///   byte. Nothing is passed to the OS in that case.
/// - [`Error::Resolution`](crate::Error::Resolution) if the resolver fails. Its code belongs to
///   the resolver's namespace, not to the one [`classify`](crate::error::classify) understands.
pub fn resolve(host: &str, service: &str, hints: &ResolveHints) -> Result<Vec<CandidateAddress>> {
    let c_host = (!host.is_empty()).then(|| to_cstring(host, "host")).transpose()?;
    let c_service = (!service.is_empty()).then(|| to_cstring(service, "service")).transpose()?;
    let candidates = os_resolve(c_host.as_deref(), c_service.as_deref(), hints).map_err(|e| {
        tracing::debug!(host, service, error = %e, "address resolution failed");
        e
    })?;
    tracing::debug!(host, service, count = candidates.len(), "resolved");
    Ok(candidates)
}
