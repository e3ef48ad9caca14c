use crate::{tests::util::*, Error, IpAddress, IpFamily, V4Address, V6Address};
use color_eyre::eyre::{ensure, eyre};
use std::net::{Ipv6Addr, SocketAddr, SocketAddrV6};

#[test]
fn v4_parse_is_network_order() -> TestResult {
    testinit();
    let addr = IpAddress::parse(IpFamily::V4, "13.37.4.20", 777)?;
    let v4 = addr.as_v4().ok_or_else(|| eyre!("parsed as IPv6"))?;
    ensure_eq!(v4.octets(), [13, 37, 4, 20]);
    ensure_eq!(v4.port_bytes(), [0x03, 0x09]);
    ensure_eq!(addr.port(), 777);
    ensure_eq!(addr.family(), IpFamily::V4);
    ensure_eq!(addr.to_string(), "13.37.4.20");
    Ok(())
}

#[test]
fn v6_parse_is_network_order() -> TestResult {
    testinit();
    let addr = IpAddress::parse(IpFamily::V6, "1337:0:0eab:DEAD::abcd:4e", 8080)?;
    let v6 = addr.as_v6().ok_or_else(|| eyre!("parsed as IPv4"))?;
    ensure_eq!(
        v6.octets(),
        [0x13, 0x37, 0, 0, 0x0e, 0xab, 0xde, 0xad, 0, 0, 0, 0, 0xab, 0xcd, 0, 0x4e]
    );
    ensure_eq!(v6.port_bytes(), [0x1f, 0x90]);
    ensure_eq!(v6.flow_info(), 0);
    ensure_eq!(v6.scope_id(), 0);
    ensure_eq!(addr.to_string(), "1337:0:eab:dead::abcd:4e");
    Ok(())
}

#[test]
fn parse_rejects_bad_input() -> TestResult {
    testinit();
    ensure_err!(IpAddress::parse(IpFamily::Any, "127.0.0.1", 1), Error::InvalidArgument(..));
    ensure_err!(IpAddress::parse(IpFamily::V4, "300.1.1.1", 1), Error::InvalidArgument(..));
    ensure_err!(IpAddress::parse(IpFamily::V4, "::1", 1), Error::InvalidArgument(..));
    ensure_err!(IpAddress::parse(IpFamily::V6, "127.0.0.1", 1), Error::InvalidArgument(..));
    ensure_err!(IpAddress::parse(IpFamily::V6, "", 1), Error::InvalidArgument(..));
    Ok(())
}

#[test]
fn loopback() -> TestResult {
    testinit();
    for (family, text, expected) in [
        (IpFamily::V4, "127.0.0.1", true),
        (IpFamily::V4, "127.5.5.5", true),
        (IpFamily::V4, "128.0.0.1", false),
        (IpFamily::V4, "0.0.0.0", false),
        (IpFamily::V6, "::1", true),
        (IpFamily::V6, "::2", false),
        (IpFamily::V6, "::", false),
        (IpFamily::V6, "1::1", false),
    ] {
        ensure_eq!(IpAddress::parse(family, text, 0)?.is_loopback(), expected, "{text}");
    }
    Ok(())
}

#[test]
fn raw_field_constructors() -> TestResult {
    testinit();
    let v4 = V4Address::from_network_bytes([10, 0, 0, 1], [0x12, 0x34]);
    ensure_eq!(v4.port(), 0x1234);
    ensure_eq!(V4Address::new([10, 0, 0, 1], 0x1234), v4);

    let v6 = V6Address::new(Ipv6Addr::LOCALHOST.octets(), 1, 0x0a0b0c0d, 7);
    ensure_eq!(v6.flow_info_bytes(), [0x0a, 0x0b, 0x0c, 0x0d]);
    ensure_eq!(v6.scope_id_bytes(), [0, 0, 0, 7]);
    ensure!(v6.is_loopback(), "::1 not recognized as loopback");
    Ok(())
}

#[test]
fn socket_addr_conversion() -> TestResult {
    testinit();
    let std_addr = SocketAddr::V6(SocketAddrV6::new(
        "fe80::1".parse()?,
        4433,
        0x01020304,
        3,
    ));
    let addr = IpAddress::from(std_addr);
    let v6 = addr.as_v6().ok_or_else(|| eyre!("converted to IPv4"))?;
    ensure_eq!(v6.flow_info_bytes(), [1, 2, 3, 4]);
    ensure_eq!(v6.scope_id_bytes(), [0, 0, 0, 3]);
    ensure_eq!(SocketAddr::from(addr), std_addr);

    let std_addr: SocketAddr = "192.168.1.2:65535".parse()?;
    ensure_eq!(SocketAddr::from(IpAddress::from(std_addr)), std_addr);
    Ok(())
}

#[cfg(unix)]
#[test]
fn native_layout_v4() -> TestResult {
    use crate::os::unix::sockaddr::NativeAddr;
    testinit();
    let addr = IpAddress::parse(IpFamily::V4, "13.37.4.20", 777)?;
    let native = NativeAddr::from(&addr);
    ensure_eq!(native.len() as usize, std::mem::size_of::<libc::sockaddr_in>());
    let sin = unsafe { native.as_ptr().cast::<libc::sockaddr_in>().read() };
    ensure_eq!(libc::c_int::from(sin.sin_family), libc::AF_INET);
    ensure_eq!(sin.sin_port.to_ne_bytes(), [0x03, 0x09]);
    ensure_eq!(sin.sin_addr.s_addr.to_ne_bytes(), [13, 37, 4, 20]);
    ensure_eq!(native.to_ip_address()?, addr);
    Ok(())
}

#[cfg(unix)]
#[test]
fn native_layout_v6() -> TestResult {
    use crate::os::unix::sockaddr::NativeAddr;
    testinit();
    let addr = IpAddress::from(V6Address::new(Ipv6Addr::LOCALHOST.octets(), 777, 0x01020304, 5));
    let native = NativeAddr::from(&addr);
    let sin6 = unsafe { native.as_ptr().cast::<libc::sockaddr_in6>().read() };
    ensure_eq!(libc::c_int::from(sin6.sin6_family), libc::AF_INET6);
    ensure_eq!(sin6.sin6_port.to_ne_bytes(), [0x03, 0x09]);
    ensure_eq!(sin6.sin6_flowinfo.to_ne_bytes(), [1, 2, 3, 4]);
    ensure_eq!(sin6.sin6_addr.s6_addr, Ipv6Addr::LOCALHOST.octets());
    // Host byte order in the native structure.
    ensure_eq!(sin6.sin6_scope_id, 5);
    ensure_eq!(native.to_ip_address()?, addr);
    Ok(())
}
