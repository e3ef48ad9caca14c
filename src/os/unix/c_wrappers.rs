use super::{sockaddr::NativeAddr, unixprelude::*};
use crate::{
    addr::{IpFamily, Protocol, SockType},
    handle::MsgFlags,
};
use std::{mem::size_of, ptr};

pub(crate) type SysSocket = OwnedFd;
pub(crate) type SysResult<T> = Result<T, c_int>;

pub(crate) fn native_family(family: IpFamily) -> c_int {
    match family {
        IpFamily::Any => AF_UNSPEC,
        IpFamily::V4 => AF_INET,
        IpFamily::V6 => AF_INET6,
    }
}
pub(crate) fn family_from_native(family: c_int) -> Option<IpFamily> {
    match family {
        AF_INET => Some(IpFamily::V4),
        AF_INET6 => Some(IpFamily::V6),
        _ => None,
    }
}
pub(crate) fn native_sock_type(ty: SockType) -> c_int {
    match ty {
        SockType::Stream => libc::SOCK_STREAM,
        SockType::Datagram => libc::SOCK_DGRAM,
        SockType::Raw => libc::SOCK_RAW,
    }
}
pub(crate) fn sock_type_from_native(ty: c_int) -> Option<SockType> {
    match ty {
        libc::SOCK_STREAM => Some(SockType::Stream),
        libc::SOCK_DGRAM => Some(SockType::Datagram),
        libc::SOCK_RAW => Some(SockType::Raw),
        _ => None,
    }
}
pub(crate) fn native_protocol(proto: Protocol) -> c_int {
    match proto {
        Protocol::Unspecified => 0,
        Protocol::Tcp => libc::IPPROTO_TCP,
        Protocol::Udp => libc::IPPROTO_UDP,
    }
}
pub(crate) fn protocol_from_native(proto: c_int) -> Protocol {
    match proto {
        libc::IPPROTO_TCP => Protocol::Tcp,
        libc::IPPROTO_UDP => Protocol::Udp,
        _ => Protocol::Unspecified,
    }
}
pub(crate) fn native_msg_flags(flags: MsgFlags) -> c_int {
    let mut native = 0;
    if flags.contains(MsgFlags::PEEK) {
        native |= libc::MSG_PEEK;
    }
    if flags.contains(MsgFlags::OUT_OF_BAND) {
        native |= libc::MSG_OOB;
    }
    if flags.contains(MsgFlags::WAIT_ALL) {
        native |= libc::MSG_WAITALL;
    }
    if flags.contains(MsgFlags::DONT_ROUTE) {
        native |= libc::MSG_DONTROUTE;
    }
    native
}

pub(crate) fn socket(family: c_int, ty: c_int, proto: c_int) -> SysResult<OwnedFd> {
    #[cfg(any(target_os = "linux", target_os = "android"))]
    let ty = ty | libc::SOCK_CLOEXEC;
    let (fd, success) = unsafe {
        let ret = libc::socket(family, ty, proto);
        (ret, ret != -1)
    };
    let fd = ok_or_errno!(success => unsafe { OwnedFd::from_raw_fd(fd) })?;
    prepare_new_socket(fd.as_fd())?;
    Ok(fd)
}

/// Descriptor setup that could not be requested atomically at creation time.
#[allow(unused_variables)]
fn prepare_new_socket(fd: BorrowedFd<'_>) -> SysResult<()> {
    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    set_cloexec(fd)?;
    // No MSG_NOSIGNAL there, so a send to a closed peer would raise SIGPIPE otherwise.
    #[cfg(any(target_os = "macos", target_os = "ios"))]
    setsockopt_int(fd, libc::SOL_SOCKET, libc::SO_NOSIGPIPE, 1)?;
    Ok(())
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn set_cloexec(fd: BorrowedFd<'_>) -> SysResult<()> {
    let (flags, success) = unsafe {
        let ret = libc::fcntl(fd.as_raw_fd(), libc::F_GETFD, 0);
        (ret, ret != -1)
    };
    ok_or_errno!(success => ())?;
    let success =
        unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_SETFD, flags | libc::FD_CLOEXEC) != -1 };
    ok_or_errno!(success => ())
}

pub(crate) fn bind(fd: BorrowedFd<'_>, addr: &NativeAddr) -> SysResult<()> {
    let success = unsafe { libc::bind(fd.as_raw_fd(), addr.as_ptr(), addr.len()) != -1 };
    ok_or_errno!(success => ())
}

pub(crate) fn connect(fd: BorrowedFd<'_>, addr: &NativeAddr) -> SysResult<()> {
    let success = unsafe { libc::connect(fd.as_raw_fd(), addr.as_ptr(), addr.len()) != -1 };
    ok_or_errno!(success => ())
}

pub(crate) fn listen(fd: BorrowedFd<'_>, backlog: c_int) -> SysResult<()> {
    let success = unsafe { libc::listen(fd.as_raw_fd(), backlog) != -1 };
    ok_or_errno!(success => ())
}

pub(crate) fn accept(fd: BorrowedFd<'_>) -> SysResult<(OwnedFd, NativeAddr)> {
    let mut addr = NativeAddr::buffer();
    let (addr_ptr, addr_len) = addr.as_out_parts();
    let (new_fd, success) = unsafe {
        #[cfg(any(target_os = "linux", target_os = "android"))]
        let ret = libc::accept4(fd.as_raw_fd(), addr_ptr, addr_len, libc::SOCK_CLOEXEC);
        #[cfg(not(any(target_os = "linux", target_os = "android")))]
        let ret = libc::accept(fd.as_raw_fd(), addr_ptr, addr_len);
        (ret, ret != -1)
    };
    let new_fd = ok_or_errno!(success => unsafe { OwnedFd::from_raw_fd(new_fd) })?;
    prepare_new_socket(new_fd.as_fd())?;
    Ok((new_fd, addr))
}

pub(crate) fn peer_name(fd: BorrowedFd<'_>) -> SysResult<NativeAddr> {
    let mut addr = NativeAddr::buffer();
    let (addr_ptr, addr_len) = addr.as_out_parts();
    let success = unsafe { libc::getpeername(fd.as_raw_fd(), addr_ptr, addr_len) != -1 };
    ok_or_errno!(success => addr)
}

pub(crate) fn sock_name(fd: BorrowedFd<'_>) -> SysResult<NativeAddr> {
    let mut addr = NativeAddr::buffer();
    let (addr_ptr, addr_len) = addr.as_out_parts();
    let success = unsafe { libc::getsockname(fd.as_raw_fd(), addr_ptr, addr_len) != -1 };
    ok_or_errno!(success => addr)
}

pub(crate) fn send(fd: BorrowedFd<'_>, buf: &[u8], flags: c_int) -> SysResult<usize> {
    #[cfg(any(target_os = "linux", target_os = "android"))]
    let flags = flags | libc::MSG_NOSIGNAL;
    let (bytes_sent, success) = unsafe {
        let ret = libc::send(fd.as_raw_fd(), buf.as_ptr().cast(), buf.len(), flags);
        (ret as usize, ret >= 0)
    };
    ok_or_errno!(success => bytes_sent)
}

pub(crate) fn recv(fd: BorrowedFd<'_>, buf: &mut [u8], flags: c_int) -> SysResult<usize> {
    let (bytes_read, success) = unsafe {
        let ret = libc::recv(fd.as_raw_fd(), buf.as_mut_ptr().cast(), buf.len(), flags);
        (ret as usize, ret >= 0)
    };
    ok_or_errno!(success => bytes_read)
}

/// Closes the descriptor exactly once. Not retried on `EINTR`, since the descriptor is released
/// regardless on every system this crate targets.
pub(crate) fn close(fd: OwnedFd) -> SysResult<()> {
    let success = unsafe { libc::close(fd.into_raw_fd()) != -1 };
    ok_or_errno!(success => ())
}

pub(crate) fn setsockopt_int(
    fd: BorrowedFd<'_>,
    level: c_int,
    name: c_int,
    value: c_int,
) -> SysResult<()> {
    let success = unsafe {
        libc::setsockopt(
            fd.as_raw_fd(),
            level,
            name,
            ptr::addr_of!(value).cast(),
            size_of::<c_int>() as socklen_t,
        ) != -1
    };
    ok_or_errno!(success => ())
}

pub(crate) fn getsockopt_int(fd: BorrowedFd<'_>, level: c_int, name: c_int) -> SysResult<c_int> {
    let mut value: c_int = 0;
    let mut len = size_of::<c_int>() as socklen_t;
    let success = unsafe {
        libc::getsockopt(
            fd.as_raw_fd(),
            level,
            name,
            ptr::addr_of_mut!(value).cast(),
            &mut len,
        ) != -1
    };
    ok_or_errno!(success => value)
}
