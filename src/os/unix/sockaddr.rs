use super::unixprelude::*;
use crate::{
    addr::{IpAddress, V4Address, V6Address},
    error::{Error, Result},
};
use std::{
    fmt::{self, Debug, Formatter},
    mem::{size_of, zeroed},
    ptr,
};

/// A `sockaddr_storage` together with the length of the part of it that is valid.
#[derive(Copy, Clone)]
pub(crate) struct NativeAddr {
    storage: sockaddr_storage,
    len: socklen_t,
}
impl NativeAddr {
    /// A zeroed buffer with the full capacity advertised, ready to be filled in by the OS.
    pub(crate) fn buffer() -> Self {
        Self {
            storage: unsafe { zeroed() },
            len: size_of::<sockaddr_storage>() as socklen_t,
        }
    }

    /// Copies an address out of memory owned by someone else, such as a resolver result list.
    ///
    /// # Safety
    /// `addr` must be valid for reads of `len` bytes.
    pub(crate) unsafe fn copy_from(addr: *const sockaddr, len: socklen_t) -> Self {
        let mut ret = Self::buffer();
        let len = (len as usize).min(size_of::<sockaddr_storage>());
        unsafe {
            ptr::copy_nonoverlapping(
                addr.cast::<u8>(),
                ptr::addr_of_mut!(ret.storage).cast::<u8>(),
                len,
            )
        };
        ret.len = len as socklen_t;
        ret
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *const sockaddr { ptr::addr_of!(self.storage).cast() }
    #[inline]
    pub(crate) fn len(&self) -> socklen_t { self.len }
    /// Pointer and in-out length for calls that write an address back, like `accept()`.
    #[inline]
    pub(crate) fn as_out_parts(&mut self) -> (*mut sockaddr, &mut socklen_t) {
        (ptr::addr_of_mut!(self.storage).cast(), &mut self.len)
    }

    pub(crate) fn to_ip_address(&self) -> Result<IpAddress> {
        match c_int::from(self.storage.ss_family) {
            AF_INET => {
                let sin = unsafe { ptr::addr_of!(self.storage).cast::<sockaddr_in>().read() };
                Ok(V4Address::from_network_bytes(
                    sin.sin_addr.s_addr.to_ne_bytes(),
                    sin.sin_port.to_ne_bytes(),
                )
                .into())
            }
            AF_INET6 => {
                let sin6 = unsafe { ptr::addr_of!(self.storage).cast::<sockaddr_in6>().read() };
                Ok(V6Address::from_network_bytes(
                    sin6.sin6_addr.s6_addr,
                    sin6.sin6_port.to_ne_bytes(),
                    sin6.sin6_flowinfo.to_ne_bytes(),
                    // The only field the OS keeps in host byte order.
                    sin6.sin6_scope_id.to_be_bytes(),
                )
                .into())
            }
            family => Err(Error::UnsupportedFamily(family)),
        }
    }
}

impl From<&IpAddress> for NativeAddr {
    fn from(addr: &IpAddress) -> Self {
        let mut ret = Self::buffer();
        let dst = ptr::addr_of_mut!(ret.storage);
        ret.len = match addr {
            IpAddress::V4(a) => {
                let mut sin: sockaddr_in = unsafe { zeroed() };
                sin.sin_family = AF_INET as sa_family_t;
                sin.sin_port = u16::from_ne_bytes(a.port_bytes());
                sin.sin_addr.s_addr = u32::from_ne_bytes(a.octets());
                #[cfg(any(
                    target_os = "macos",
                    target_os = "ios",
                    target_os = "freebsd",
                    target_os = "openbsd",
                    target_os = "netbsd",
                    target_os = "dragonfly",
                ))]
                {
                    sin.sin_len = size_of::<sockaddr_in>() as u8;
                }
                unsafe { dst.cast::<sockaddr_in>().write(sin) };
                size_of::<sockaddr_in>() as socklen_t
            }
            IpAddress::V6(a) => {
                let mut sin6: sockaddr_in6 = unsafe { zeroed() };
                sin6.sin6_family = AF_INET6 as sa_family_t;
                sin6.sin6_port = u16::from_ne_bytes(a.port_bytes());
                sin6.sin6_flowinfo = u32::from_ne_bytes(a.flow_info_bytes());
                sin6.sin6_addr.s6_addr = a.octets();
                sin6.sin6_scope_id = a.scope_id();
                #[cfg(any(
                    target_os = "macos",
                    target_os = "ios",
                    target_os = "freebsd",
                    target_os = "openbsd",
                    target_os = "netbsd",
                    target_os = "dragonfly",
                ))]
                {
                    sin6.sin6_len = size_of::<sockaddr_in6>() as u8;
                }
                unsafe { dst.cast::<sockaddr_in6>().write(sin6) };
                size_of::<sockaddr_in6>() as socklen_t
            }
        };
        ret
    }
}

impl Debug for NativeAddr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeAddr")
            .field("family", &self.storage.ss_family)
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}
