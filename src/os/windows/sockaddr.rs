use super::winprelude::*;
use crate::{
    addr::{IpAddress, V4Address, V6Address},
    error::{Error, Result},
};
use std::{
    fmt::{self, Debug, Formatter},
    mem::{size_of, zeroed},
    ptr,
};

/// A `SOCKADDR_STORAGE` together with the length of the part of it that is valid.
#[derive(Copy, Clone)]
pub(crate) struct NativeAddr {
    storage: SOCKADDR_STORAGE,
    len: i32,
}
impl NativeAddr {
    /// A zeroed buffer with the full capacity advertised, ready to be filled in by the OS.
    pub(crate) fn buffer() -> Self {
        Self {
            storage: unsafe { zeroed() },
            len: size_of::<SOCKADDR_STORAGE>() as i32,
        }
    }

    /// Copies an address out of memory owned by someone else, such as a resolver result list.
    ///
    /// # Safety
    /// `addr` must be valid for reads of `len` bytes.
    pub(crate) unsafe fn copy_from(addr: *const SOCKADDR, len: usize) -> Self {
        let mut ret = Self::buffer();
        let len = len.min(size_of::<SOCKADDR_STORAGE>());
        unsafe {
            ptr::copy_nonoverlapping(
                addr.cast::<u8>(),
                ptr::addr_of_mut!(ret.storage).cast::<u8>(),
                len,
            )
        };
        ret.len = len as i32;
        ret
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *const SOCKADDR { ptr::addr_of!(self.storage).cast() }
    #[inline]
    pub(crate) fn len(&self) -> i32 { self.len }
    /// Pointer and in-out length for calls that write an address back, like `accept()`.
    #[inline]
    pub(crate) fn as_out_parts(&mut self) -> (*mut SOCKADDR, &mut i32) {
        (ptr::addr_of_mut!(self.storage).cast(), &mut self.len)
    }

    pub(crate) fn to_ip_address(&self) -> Result<IpAddress> {
        match self.storage.ss_family {
            AF_INET => {
                let sin = unsafe { ptr::addr_of!(self.storage).cast::<SOCKADDR_IN>().read() };
                let s_addr = unsafe { sin.sin_addr.S_un.S_addr };
                Ok(V4Address::from_network_bytes(s_addr.to_ne_bytes(), sin.sin_port.to_ne_bytes())
                    .into())
            }
            AF_INET6 => {
                let sin6 = unsafe { ptr::addr_of!(self.storage).cast::<SOCKADDR_IN6>().read() };
                let (octets, scope_id) =
                    unsafe { (sin6.sin6_addr.u.Byte, sin6.Anonymous.sin6_scope_id) };
                Ok(V6Address::from_network_bytes(
                    octets,
                    sin6.sin6_port.to_ne_bytes(),
                    sin6.sin6_flowinfo.to_ne_bytes(),
                    // The only field the OS keeps in host byte order.
                    scope_id.to_be_bytes(),
                )
                .into())
            }
            family => Err(Error::UnsupportedFamily(i32::from(family))),
        }
    }
}

impl From<&IpAddress> for NativeAddr {
    fn from(addr: &IpAddress) -> Self {
        let mut ret = Self::buffer();
        let dst = ptr::addr_of_mut!(ret.storage);
        ret.len = match addr {
            IpAddress::V4(a) => {
                let mut sin: SOCKADDR_IN = unsafe { zeroed() };
                sin.sin_family = AF_INET as ADDRESS_FAMILY;
                sin.sin_port = u16::from_ne_bytes(a.port_bytes());
                sin.sin_addr.S_un.S_addr = u32::from_ne_bytes(a.octets());
                unsafe { dst.cast::<SOCKADDR_IN>().write(sin) };
                size_of::<SOCKADDR_IN>() as i32
            }
            IpAddress::V6(a) => {
                let mut sin6: SOCKADDR_IN6 = unsafe { zeroed() };
                sin6.sin6_family = AF_INET6 as ADDRESS_FAMILY;
                sin6.sin6_port = u16::from_ne_bytes(a.port_bytes());
                sin6.sin6_flowinfo = u32::from_ne_bytes(a.flow_info_bytes());
                sin6.sin6_addr.u.Byte = a.octets();
                sin6.Anonymous.sin6_scope_id = a.scope_id();
                unsafe { dst.cast::<SOCKADDR_IN6>().write(sin6) };
                size_of::<SOCKADDR_IN6>() as i32
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
