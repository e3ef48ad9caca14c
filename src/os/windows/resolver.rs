use super::{c_wrappers, sockaddr::NativeAddr};
use crate::{
    error::{self, Error, Result},
    resolve::{AddrInfoFlags, CandidateAddress, ResolveHints},
};
use std::{
    ffi::CStr,
    mem::zeroed,
    ptr::{self, NonNull},
};
use windows_sys::Win32::Networking::WinSock::{self as ws, ADDRINFOA};

/// Owns the list returned by `getaddrinfo()` and frees it on drop.
struct AddrInfoList(NonNull<ADDRINFOA>);
impl AddrInfoList {
    fn iter(&self) -> impl Iterator<Item = &ADDRINFOA> {
        let mut cur = Some(self.0);
        std::iter::from_fn(move || {
            let node = unsafe { cur?.as_ref() };
            cur = NonNull::new(node.ai_next);
            Some(node)
        })
    }
}
impl Drop for AddrInfoList {
    fn drop(&mut self) { unsafe { ws::freeaddrinfo(self.0.as_ptr()) } }
}

fn native_flags(flags: AddrInfoFlags) -> i32 {
    let mut native = 0;
    if flags.contains(AddrInfoFlags::NUMERIC_HOST) {
        native |= ws::AI_NUMERICHOST;
    }
    if flags.contains(AddrInfoFlags::NUMERIC_SERVICE) {
        native |= ws::AI_NUMERICSERV;
    }
    if flags.contains(AddrInfoFlags::PASSIVE) {
        native |= ws::AI_PASSIVE;
    }
    if flags.contains(AddrInfoFlags::ADDRESS_CONFIG) {
        native |= ws::AI_ADDRCONFIG;
    }
    if flags.contains(AddrInfoFlags::V4_MAPPED) {
        native |= ws::AI_V4MAPPED;
    }
    native as i32
}

pub(crate) fn resolve(
    host: Option<&CStr>,
    service: Option<&CStr>,
    hints: &ResolveHints,
) -> Result<Vec<CandidateAddress>> {
    c_wrappers::ensure_started().map_err(|code| Error::method("WSAStartup", code))?;

    let mut native_hints: ADDRINFOA = unsafe { zeroed() };
    native_hints.ai_flags = native_flags(hints.flags);
    native_hints.ai_family = c_wrappers::native_family(hints.family);
    native_hints.ai_socktype = hints.sock_type.map_or(0, c_wrappers::native_sock_type);
    native_hints.ai_protocol = c_wrappers::native_protocol(hints.protocol);

    let mut list = ptr::null_mut();
    let code = unsafe {
        ws::getaddrinfo(
            host.map_or(ptr::null(), |h| h.as_ptr().cast()),
            service.map_or(ptr::null(), |s| s.as_ptr().cast()),
            &native_hints,
            &mut list,
        )
    };
    if code != 0 {
        // Resolver codes share the WSA namespace here, so the system message table covers them.
        return Err(Error::Resolution { code, message: error::message(code) });
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
