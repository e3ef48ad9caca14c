use super::TestResult;
use crate::{IpAddress, IpFamily, Listener, DEFAULT_BACKLOG};
use color_eyre::eyre::{eyre, Context};
use std::thread;

/// Binds a listener to an ephemeral loopback port, then runs `client` on a separate thread with
/// the listener's address and `server` on the current one. Reports which side failed.
pub fn drive_server_and_client(
    server: impl FnOnce(Listener) -> TestResult,
    client: impl FnOnce(IpAddress) -> TestResult + Send + 'static,
) -> TestResult {
    let any_port = IpAddress::parse(IpFamily::V4, "127.0.0.1", 0)?;
    let listener =
        Listener::bind_address(&any_port, DEFAULT_BACKLOG).context("listener bind failed")?;
    let addr = listener.local_address().context("could not query listener address")?;
    eprintln!("Listener bound to {addr}:{}", addr.port());

    let client_thread = thread::spawn(move || client(addr));
    let server_result = server(listener).context("server exited early with error");
    let client_result = client_thread
        .join()
        .map_err(|_| eyre!("client thread panicked"))?
        .context("client exited early with error");
    server_result.and(client_result)
}
