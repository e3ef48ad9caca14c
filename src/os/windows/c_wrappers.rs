use super::{sockaddr::NativeAddr, winprelude::*};
use crate::{
    addr::{IpFamily, Protocol, SockType},
    handle::MsgFlags,
    misc::clamp_to_c_int,
};
use std::{
    mem::{size_of, zeroed},
    ptr,
    sync::OnceLock,
};
use windows_sys::Win32::Networking::WinSock::{self as ws, WSADATA};

pub(crate) type SysSocket = OwnedSocket;
pub(crate) type SysResult<T> = Result<T, i32>;

/// Performs `WSAStartup()` the first time it is called in the process and reports its outcome on
/// every call after that.
pub(crate) fn ensure_started() -> SysResult<()> {
    static STARTUP: OnceLock<i32> = OnceLock::new();
    let code = *STARTUP.get_or_init(|| {
        let mut data: WSADATA = unsafe { zeroed() };
        unsafe { ws::WSAStartup(0x0202, &mut data) }
    });
    if code == 0 {
        Ok(())
    } else {
        Err(code)
    }
}

pub(crate) fn native_family(family: IpFamily) -> i32 {
    (match family {
        IpFamily::Any => AF_UNSPEC,
        IpFamily::V4 => AF_INET,
        IpFamily::V6 => AF_INET6,
    }) as i32
}
pub(crate) fn family_from_native(family: i32) -> Option<IpFamily> {
    match family {
        f if f == AF_INET as i32 => Some(IpFamily::V4),
        f if f == AF_INET6 as i32 => Some(IpFamily::V6),
        _ => None,
    }
}
pub(crate) fn native_sock_type(ty: SockType) -> i32 {
    match ty {
        SockType::Stream => ws::SOCK_STREAM,
        SockType::Datagram => ws::SOCK_DGRAM,
        SockType::Raw => ws::SOCK_RAW,
    }
}
pub(crate) fn sock_type_from_native(ty: i32) -> Option<SockType> {
    match ty {
        ws::SOCK_STREAM => Some(SockType::Stream),
        ws::SOCK_DGRAM => Some(SockType::Datagram),
        ws::SOCK_RAW => Some(SockType::Raw),
        _ => None,
    }
}
pub(crate) fn native_protocol(proto: Protocol) -> i32 {
    match proto {
        Protocol::Unspecified => 0,
        Protocol::Tcp => ws::IPPROTO_TCP,
        Protocol::Udp => ws::IPPROTO_UDP,
    }
}
pub(crate) fn protocol_from_native(proto: i32) -> Protocol {
    match proto {
        ws::IPPROTO_TCP => Protocol::Tcp,
        ws::IPPROTO_UDP => Protocol::Udp,
        _ => Protocol::Unspecified,
    }
}
pub(crate) fn native_msg_flags(flags: MsgFlags) -> i32 {
    let mut native = 0;
    if flags.contains(MsgFlags::PEEK) {
        native |= ws::MSG_PEEK;
    }
    if flags.contains(MsgFlags::OUT_OF_BAND) {
        native |= ws::MSG_OOB;
    }
    if flags.contains(MsgFlags::WAIT_ALL) {
        native |= ws::MSG_WAITALL;
    }
    if flags.contains(MsgFlags::DONT_ROUTE) {
        native |= ws::MSG_DONTROUTE;
    }
    native
}

#[inline]
fn raw(sock: BorrowedSocket<'_>) -> SOCKET { sock.as_raw_socket() as SOCKET }

/// Takes ownership of a freshly returned socket, or reports the thread's error code.
fn own(sock: SOCKET) -> SysResult<OwnedSocket> {
    ok_or_errno!(sock != INVALID_SOCKET => unsafe { OwnedSocket::from_raw_socket(sock as RawSocket) })
}

pub(crate) fn socket(family: i32, ty: i32, proto: i32) -> SysResult<OwnedSocket> {
    ensure_started()?;
    let sock = unsafe {
        ws::WSASocketW(
            family,
            ty,
            proto,
            ptr::null(),
            0,
            ws::WSA_FLAG_OVERLAPPED | ws::WSA_FLAG_NO_HANDLE_INHERIT,
        )
    };
    own(sock)
}

pub(crate) fn bind(sock: BorrowedSocket<'_>, addr: &NativeAddr) -> SysResult<()> {
    let success = unsafe { ws::bind(raw(sock), addr.as_ptr(), addr.len()) != SOCKET_ERROR };
    ok_or_errno!(success => ())
}

pub(crate) fn connect(sock: BorrowedSocket<'_>, addr: &NativeAddr) -> SysResult<()> {
    let success = unsafe { ws::connect(raw(sock), addr.as_ptr(), addr.len()) != SOCKET_ERROR };
    ok_or_errno!(success => ())
}

pub(crate) fn listen(sock: BorrowedSocket<'_>, backlog: i32) -> SysResult<()> {
    let success = unsafe { ws::listen(raw(sock), backlog) != SOCKET_ERROR };
    ok_or_errno!(success => ())
}

pub(crate) fn accept(sock: BorrowedSocket<'_>) -> SysResult<(OwnedSocket, NativeAddr)> {
    let mut addr = NativeAddr::buffer();
    let (addr_ptr, addr_len) = addr.as_out_parts();
    let new_sock = own(unsafe { ws::accept(raw(sock), addr_ptr, addr_len) })?;
    Ok((new_sock, addr))
}

pub(crate) fn peer_name(sock: BorrowedSocket<'_>) -> SysResult<NativeAddr> {
    let mut addr = NativeAddr::buffer();
    let (addr_ptr, addr_len) = addr.as_out_parts();
    let success = unsafe { ws::getpeername(raw(sock), addr_ptr, addr_len) != SOCKET_ERROR };
    ok_or_errno!(success => addr)
}

pub(crate) fn sock_name(sock: BorrowedSocket<'_>) -> SysResult<NativeAddr> {
    let mut addr = NativeAddr::buffer();
    let (addr_ptr, addr_len) = addr.as_out_parts();
    let success = unsafe { ws::getsockname(raw(sock), addr_ptr, addr_len) != SOCKET_ERROR };
    ok_or_errno!(success => addr)
}

pub(crate) fn send(sock: BorrowedSocket<'_>, buf: &[u8], flags: i32) -> SysResult<usize> {
    let (bytes_sent, success) = unsafe {
        let ret = ws::send(raw(sock), buf.as_ptr(), clamp_to_c_int(buf.len()), flags);
        (ret as usize, ret != SOCKET_ERROR)
    };
    ok_or_errno!(success => bytes_sent)
}

pub(crate) fn recv(sock: BorrowedSocket<'_>, buf: &mut [u8], flags: i32) -> SysResult<usize> {
    let (bytes_read, success) = unsafe {
        let ret = ws::recv(raw(sock), buf.as_mut_ptr(), clamp_to_c_int(buf.len()), flags);
        (ret as usize, ret != SOCKET_ERROR)
    };
    ok_or_errno!(success => bytes_read)
}

pub(crate) fn close(sock: OwnedSocket) -> SysResult<()> {
    let success = unsafe { ws::closesocket(sock.into_raw_socket() as SOCKET) != SOCKET_ERROR };
    ok_or_errno!(success => ())
}

pub(crate) fn setsockopt_int(
    sock: BorrowedSocket<'_>,
    level: i32,
    name: i32,
    value: i32,
) -> SysResult<()> {
    let success = unsafe {
        ws::setsockopt(
            raw(sock),
            level,
            name,
            ptr::addr_of!(value).cast(),
            size_of::<i32>() as i32,
        ) != SOCKET_ERROR
    };
    ok_or_errno!(success => ())
}

pub(crate) fn getsockopt_int(sock: BorrowedSocket<'_>, level: i32, name: i32) -> SysResult<i32> {
    let mut value: i32 = 0;
    let mut len = size_of::<i32>() as i32;
    let success = unsafe {
        ws::getsockopt(raw(sock), level, name, ptr::addr_of_mut!(value).cast(), &mut len)
            != SOCKET_ERROR
    };
    ok_or_errno!(success => value)
}
