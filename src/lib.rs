#![doc = include_str!("../README.md")]
#![cfg_attr(feature = "doc_cfg", feature(doc_cfg))]
// If this was in Cargo.toml, it would cover tests as well
#![warn(missing_docs, clippy::panic_in_result_fn, clippy::missing_assert_message)]

#[cfg(not(any(unix, windows)))]
compile_error!("sockstream only supports Unix-like systems and Windows");

#[macro_use]
mod macros;

pub mod addr;
pub mod connection;
pub mod error;
pub mod handle;
pub mod listener;
pub mod resolve;
pub mod transport;

mod misc;
mod sockopt;

/// Native socket API bindings. Only the one for the target platform is compiled.
pub(crate) mod os {
    #[cfg(unix)]
    pub(crate) mod unix;
    #[cfg(windows)]
    pub(crate) mod windows;
}

pub use {
    addr::{IpAddress, IpFamily, Protocol, SockType, V4Address, V6Address},
    connection::{connect_to, Connection, ConnectionOptions, DEFAULT_BUFFER_CAPACITY},
    error::{Error, ErrorKind, Operation, Result},
    handle::{Handle, MsgFlags},
    listener::{Incoming, Listener, ListenerOptions, DEFAULT_BACKLOG},
    resolve::{resolve, AddrInfoFlags, CandidateAddress, ResolveHints},
    transport::Transport,
};

#[cfg(test)]
#[path = "../tests/index.rs"]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects, clippy::indexing_slicing)]
mod tests;
