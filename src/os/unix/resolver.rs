use super::{c_wrappers, sockaddr::NativeAddr, unixprelude::*};
use crate::{
    error::{self, Error, Result},
    resolve::{AddrInfoFlags, CandidateAddress, ResolveHints},
};
use std::{
    ffi::CStr,
    mem::zeroed,
    ptr::{self, NonNull},
};

/// Owns the list returned by `getaddrinfo()` and frees it on drop.
struct AddrInfoList(NonNull<libc::addrinfo>);
impl AddrInfoList {
    fn iter(&self) -> impl Iterator<Item = &libc::addrinfo> {
        let mut cur = Some(self.0);
        std::iter::from_fn(move || {
            let node = unsafe { cur?.as_ref() };
            cur = NonNull::new(node.ai_next);
            Some(node)
        })
    }
}
impl Drop for AddrInfoList {
    fn drop(&mut self) { unsafe { libc::freeaddrinfo(self.0.as_ptr()) } }
}

fn native_flags(flags: AddrInfoFlags) -> c_int {
    let mut native = 0;
    if flags.contains(AddrInfoFlags::NUMERIC_HOST) {
        native |= libc::AI_NUMERICHOST;
    }
    if flags.contains(AddrInfoFlags::NUMERIC_SERVICE) {
        native |= libc::AI_NUMERICSERV;
    }
    if flags.contains(AddrInfoFlags::PASSIVE) {
        native |= libc::AI_PASSIVE;
    }
    if flags.contains(AddrInfoFlags::ADDRESS_CONFIG) {
        native |= libc::AI_ADDRCONFIG;
    }
    if flags.contains(AddrInfoFlags::V4_MAPPED) {
        native |= libc::AI_V4MAPPED;
    }
    native
}

fn resolution_error(code: c_int) -> Error {
    let gai_msg = unsafe { CStr::from_ptr(libc::gai_strerror(code)) }
        .to_string_lossy()
        .into_owned();
    let message = if code == libc::EAI_SYSTEM {
        format!("{gai_msg}: {}", error::message(error::last_error_code()))
    } else {
        gai_msg
    };
    Error::Resolution { code, message }
}

pub(crate) fn resolve(
    host: Option<&CStr>,
    service: Option<&CStr>,
    hints: &ResolveHints,
) -> Result<Vec<CandidateAddress>> {
    let mut native_hints: libc::addrinfo = unsafe { zeroed() };
    native_hints.ai_flags = native_flags(hints.flags);
    native_hints.ai_family = c_wrappers::native_family(hints.family);
    native_hints.ai_socktype = hints.sock_type.map_or(0, c_wrappers::native_sock_type);
    native_hints.ai_protocol = c_wrappers::native_protocol(hints.protocol);

    let mut list = ptr::null_mut();
    let code = unsafe {
        libc::getaddrinfo(
            host.map_or(ptr::null(), CStr::as_ptr),
            service.map_or(ptr::null(), CStr::as_ptr),
            &native_hints,
            &mut list,
        )
    };
    if code != 0 {
        return Err(resolution_error(code));
    }
    let Some(list) = NonNull::new(list).map(AddrInfoList) else {
        return Ok(Vec::new());
    };

    let mut candidates = Vec::new();
    for info in list.iter() {
        let Some(family) = c_wrappers::family_from_native(info.ai_family) else {
            continue;
        };
        let Some(sock_type) =
            c_wrappers::sock_type_from_native(info.ai_socktype).or(hints.sock_type)
        else {
            continue;
        };
        if info.ai_addr.is_null() {
            continue;
        }
        let native = unsafe { NativeAddr::copy_from(info.ai_addr, info.ai_addrlen) };
        candidates.push(CandidateAddress {
            family,
            sock_type,
            protocol: c_wrappers::protocol_from_native(info.ai_protocol),
            address: native.to_ip_address()?,
        });
    }
    Ok(candidates)
}
