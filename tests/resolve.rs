use crate::{
    resolve, tests::util::*, AddrInfoFlags, Error, IpAddress, IpFamily, ResolveHints, SockType,
};
use color_eyre::eyre::{ensure, eyre};

const NUMERIC: AddrInfoFlags = AddrInfoFlags::NUMERIC_HOST.with(AddrInfoFlags::NUMERIC_SERVICE);

#[test]
fn numeric_v4() -> TestResult {
    testinit();
    let hints = ResolveHints::tcp().flags(NUMERIC);
    let candidates = resolve("127.0.0.1", "8080", &hints)?;
    let first = candidates.first().ok_or_else(|| eyre!("no candidates"))?;
    ensure_eq!(first.family(), IpFamily::V4);
    ensure_eq!(first.sock_type(), SockType::Stream);
    ensure_eq!(*first.address(), IpAddress::parse(IpFamily::V4, "127.0.0.1", 8080)?);
    ensure!(first.address().is_loopback(), "127.0.0.1 not recognized as loopback");
    Ok(())
}

#[test]
fn passive_wildcard() -> TestResult {
    testinit();
    let hints = ResolveHints::tcp()
        .flags(AddrInfoFlags::PASSIVE | AddrInfoFlags::NUMERIC_SERVICE)
        .family(IpFamily::V4);
    let candidates = resolve("", "4000", &hints)?;
    ensure!(!candidates.is_empty(), "no candidates for the wildcard address");
    for candidate in &candidates {
        ensure_eq!(candidate.address().to_string(), "0.0.0.0");
        ensure_eq!(candidate.address().port(), 4000);
    }
    Ok(())
}

#[test]
fn family_hint_is_honored() -> TestResult {
    testinit();
    let hints = ResolveHints::new().flags(NUMERIC).family(IpFamily::V6);
    for candidate in resolve("::1", "22", &hints)? {
        ensure_eq!(candidate.family(), IpFamily::V6);
        ensure!(candidate.address().is_ipv6(), "IPv6 hint yielded {:?}", candidate.address());
    }
    Ok(())
}

#[test]
fn resolver_failure() -> TestResult {
    testinit();
    let hints = ResolveHints::tcp().flags(NUMERIC);
    ensure_err!(resolve("definitely not an address", "80", &hints), Error::Resolution { .. });
    Ok(())
}

#[test]
fn nul_bytes_are_rejected() -> TestResult {
    testinit();
    let hints = ResolveHints::tcp();
    ensure_err!(resolve("local\0host", "80", &hints), Error::InvalidArgument(..));
    ensure_err!(resolve("localhost", "8\00", &hints), Error::InvalidArgument(..));
    Ok(())
}

#[test]
fn flag_set_ops() -> TestResult {
    testinit();
    let flags = AddrInfoFlags::PASSIVE | AddrInfoFlags::ADDRESS_CONFIG;
    ensure!(flags.contains(AddrInfoFlags::PASSIVE), "{flags:?}");
    ensure!(!flags.contains(AddrInfoFlags::NUMERIC_HOST), "{flags:?}");
    ensure!(AddrInfoFlags::NONE.is_empty(), "NONE is not empty");
    ensure_eq!(format!("{flags:?}"), "{PASSIVE, ADDRESS_CONFIG}");
    Ok(())
}
