use crate::{
    tests::util::*,
    Connection, ConnectionOptions, Error, ErrorKind, DEFAULT_BUFFER_CAPACITY,
};
use color_eyre::eyre::{ensure, Context};
use std::io::{self, Read, Write};

#[cfg(unix)]
const EINTR: i32 = libc::EINTR;
#[cfg(windows)]
const EINTR: i32 = windows_sys::Win32::Networking::WinSock::WSAEINTR;
#[cfg(unix)]
const ECONNRESET: i32 = libc::ECONNRESET;
#[cfg(windows)]
const ECONNRESET: i32 = windows_sys::Win32::Networking::WinSock::WSAECONNRESET;

#[test]
fn read_returns_whatever_arrived() -> TestResult {
    testinit();
    let mut conn = Connection::from_transport(ScriptedTransport::new(&[b"abc"]));
    ensure_eq!(conn.read(10)?, b"abc");
    // Orderly shutdown is not an error for a plain read.
    ensure_eq!(conn.read(10)?, b"");
    Ok(())
}

#[test]
fn read_never_exceeds_request() -> TestResult {
    testinit();
    let mut conn = Connection::from_transport(ScriptedTransport::new(&[b"abcdef"]));
    ensure_eq!(conn.read(4)?, b"abcd");
    ensure_eq!(conn.read(4)?, b"ef");
    Ok(())
}

#[test]
fn unallocatable_read_sizes_are_rejected() -> TestResult {
    testinit();
    let transport = ScriptedTransport::new(&[b"abc"]);
    let log = transport.log();
    let mut conn = Connection::from_transport(transport);
    ensure_err!(conn.read(usize::MAX), Error::InvalidArgument(..));
    ensure_err!(conn.read_exactly(usize::MAX), Error::InvalidArgument(..));
    ensure_eq!(log.lock().unwrap().recv_calls, 0);
    // The connection stays usable.
    ensure_eq!(conn.read(10)?, b"abc");
    Ok(())
}

#[test]
fn read_until_grows_from_zero_capacity() -> TestResult {
    testinit();
    let options = ConnectionOptions::new().buffer_capacity(0);
    let mut conn = options.wrap_transport(ScriptedTransport::new(&[b"abc\n"]));
    ensure_eq!(conn.read_until(b"\n")?, b"abc\n");
    Ok(())
}

#[test]
fn read_exactly_across_chunkings() -> TestResult {
    testinit();
    let data = payload(64);
    for (chunk_len, expected_calls) in [(1, 64), (7, 10), (1000, 1)] {
        let stub = ScriptedTransport::chunked(&data, chunk_len);
        let log = stub.log();
        let mut conn = Connection::from_transport(stub);
        let got = conn
            .read_exactly(64)
            .with_context(|| format!("read_exactly failed with {chunk_len}-byte chunks"))?;
        ensure_eq!(got, data.as_slice(), "chunk length {chunk_len}");
        ensure_eq!(log.lock().unwrap().recv_calls, expected_calls, "chunk length {chunk_len}");
    }
    Ok(())
}

#[test]
fn read_exactly_fails_on_early_close() -> TestResult {
    testinit();
    let mut conn = Connection::from_transport(ScriptedTransport::new(&[b"abc"]));
    ensure_err!(
        conn.read_exactly(5),
        Error::Read { kind: ErrorKind::ConnectionReset, code: ECONNRESET, .. }
    );
    Ok(())
}

#[test]
fn read_exactly_zero_does_not_touch_transport() -> TestResult {
    testinit();
    let mut conn = Connection::from_transport(PanickingTransport);
    ensure_eq!(conn.read_exactly(0)?, b"");
    Ok(())
}

#[test]
fn read_until_single_byte_delimiter_split() -> TestResult {
    testinit();
    let mut conn = Connection::from_transport(ScriptedTransport::new(&[b"ab", b"c\n"]));
    ensure_eq!(conn.read_until(b"\n")?, b"abc\n");
    Ok(())
}

#[test]
fn read_until_delimiter_straddles_chunks() -> TestResult {
    testinit();
    let mut conn = Connection::from_transport(ScriptedTransport::new(&[b"abc\r", b"\ndef"]));
    ensure_eq!(conn.read_until(b"\r\n")?, b"abc\r\n");
    Ok(())
}

#[test]
fn read_until_discards_excess() -> TestResult {
    testinit();
    let mut conn = Connection::from_transport(ScriptedTransport::new(&[b"ab\ncd"]));
    ensure_eq!(conn.read_until(b"\n")?, b"ab\n");
    // "cd" arrived in the same call and is gone.
    ensure_eq!(conn.read(10)?, b"");

    let mut conn = Connection::from_transport(ScriptedTransport::new(&[
        b"abc",
        &[b'd', b'e', b'\r', b'\n', 5, 6, 7],
    ]));
    ensure_eq!(conn.read_until(b"\r\n")?, b"abcde\r\n");
    Ok(())
}

#[test]
fn read_until_grows_past_capacity() -> TestResult {
    testinit();
    let mut data = payload(100);
    data.retain(|&b| b != b'\n');
    let body_len = data.len();
    data.push(b'\n');

    let stub = ScriptedTransport::chunked(&data, 3);
    let mut conn = ConnectionOptions::new().buffer_capacity(4).wrap_transport(stub);
    let frame = conn.read_until(b"\n")?;
    ensure_eq!(frame.len(), body_len + 1);
    ensure_eq!(frame, data.as_slice());
    ensure_eq!(conn.buffer_capacity(), 4);
    Ok(())
}

#[test]
fn read_until_multibyte_delimiter_at_buffer_edge() -> TestResult {
    testinit();
    // With a 4-byte buffer, the delimiter is split exactly where the buffer doubles.
    let stub = ScriptedTransport::new(&[b"xyz\r", b"\n"]);
    let mut conn = ConnectionOptions::new().buffer_capacity(4).wrap_transport(stub);
    ensure_eq!(conn.read_until(b"\r\n")?, b"xyz\r\n");
    Ok(())
}

#[test]
fn read_until_fails_on_early_close() -> TestResult {
    testinit();
    let mut conn = Connection::from_transport(ScriptedTransport::new(&[b"no newline"]));
    ensure_err!(
        conn.read_until(b"\n"),
        Error::Read { kind: ErrorKind::ConnectionReset, .. }
    );
    Ok(())
}

#[test]
fn read_until_rejects_empty_delimiter() -> TestResult {
    testinit();
    let stub = ScriptedTransport::new(&[b"abc"]);
    let log = stub.log();
    let mut conn = Connection::from_transport(stub);
    ensure_err!(conn.read_until(b""), Error::InvalidArgument(..));
    ensure_eq!(log.lock().unwrap().recv_calls, 0);
    Ok(())
}

#[test]
fn read_until_respects_max_frame_len() -> TestResult {
    testinit();
    let options = ConnectionOptions::new().buffer_capacity(2).max_frame_len(Some(8));

    let mut conn = options.wrap_transport(ScriptedTransport::new(&[b"0123456789\n"]));
    ensure_err!(conn.read_until(b"\n"), Error::FrameTooLong { limit: 8 });

    let mut conn = options.wrap_transport(ScriptedTransport::new(&[b"0123", b"456\n"]));
    ensure_eq!(conn.read_until(b"\n")?, b"0123456\n");
    Ok(())
}

#[test]
fn interruption_is_reported_not_retried() -> TestResult {
    testinit();
    let stub = ScriptedTransport::from_steps([
        Step::Data(b"ab".to_vec()),
        Step::Fail(EINTR),
        Step::Data(b"c\n".to_vec()),
    ]);
    let log = stub.log();
    let mut conn = Connection::from_transport(stub);
    ensure_err!(
        conn.read_until(b"\n"),
        Error::Read { kind: ErrorKind::Interrupted, .. }
    );
    ensure_eq!(log.lock().unwrap().recv_calls, 2);
    // The partial frame went down with the failed call.
    ensure_eq!(conn.read_until(b"\n")?, b"c\n");
    Ok(())
}

#[test]
fn write_reports_short_sends() -> TestResult {
    testinit();
    let stub = ScriptedTransport::new(&[]).max_send(3);
    let log = stub.log();
    let mut conn = Connection::from_transport(stub);
    ensure_eq!(conn.write(b"hello")?, 3);
    let log = log.lock().unwrap();
    ensure_eq!(log.send_calls, 1);
    ensure_eq!(log.sent, b"hel");
    Ok(())
}

#[test]
fn closed_guard_precedes_transport() -> TestResult {
    testinit();
    let mut conn = Connection::from_transport(PanickingTransport);
    ensure!(!conn.closed(), "fresh connection reported as closed");
    conn.close()?;
    ensure!(conn.closed(), "close() did not mark the connection closed");

    ensure_err!(conn.read(1), Error::Closed { operation: "read", .. });
    ensure_err!(conn.read_exactly(1), Error::Closed { operation: "read_exactly", .. });
    ensure_err!(conn.read_until(b"\n"), Error::Closed { operation: "read_until", .. });
    ensure_err!(conn.write(b"x"), Error::Closed { operation: "write", .. });
    ensure_err!(conn.peer_address(), Error::Closed { .. });

    // Idempotent.
    conn.close()?;
    ensure!(conn.closed(), "second close() reopened the connection");
    Ok(())
}

#[test]
fn close_releases_transport() -> TestResult {
    testinit();
    let stub = ScriptedTransport::new(&[]);
    let log = stub.log();
    let mut conn = Connection::from_transport(stub);
    conn.close()?;
    conn.close()?;
    ensure!(log.lock().unwrap().closed, "transport was not closed");
    Ok(())
}

#[test]
fn invalid_transport_is_rejected() -> TestResult {
    testinit();
    let mut conn = Connection::from_transport(ScriptedTransport::invalid());
    ensure_err!(conn.read(1), Error::InvalidHandle { resource: "Connection", .. });
    ensure_err!(conn.write(b"x"), Error::InvalidHandle { .. });
    Ok(())
}

#[test]
fn unsupported_addresses_on_stub() -> TestResult {
    testinit();
    let conn = Connection::from_transport(ScriptedTransport::new(&[]));
    ensure_err!(conn.local_address(), Error::Unsupported("local_address"));
    Ok(())
}

#[test]
fn std_io_traits() -> TestResult {
    testinit();
    let data = payload(50);
    let stub = ScriptedTransport::chunked(&data, 16);
    let log = stub.log();
    let mut conn = Connection::from_transport(stub);

    let mut got = Vec::new();
    Read::read_to_end(&mut conn, &mut got)?;
    ensure_eq!(got, data);

    Write::write_all(&mut conn, b"abc")?;
    Write::flush(&mut conn)?;
    ensure_eq!(log.lock().unwrap().sent, b"abc");

    conn.close()?;
    let err = Read::read(&mut conn, &mut [0; 4]).unwrap_err();
    ensure_eq!(err.kind(), io::ErrorKind::NotConnected);
    Ok(())
}

#[test]
fn default_options() -> TestResult {
    testinit();
    let conn = Connection::from_transport(ScriptedTransport::new(&[]));
    ensure_eq!(conn.buffer_capacity(), DEFAULT_BUFFER_CAPACITY);
    ensure_eq!(conn.max_frame_len(), None);
    Ok(())
}
