//! Test utilities: error reporting setup, in-memory transports for exercising the framing logic,
//! and a driver that runs a loopback server against a client thread.
#![allow(dead_code, unused_macros)]

#[macro_use]
mod eyre;
mod drive;
mod stub;

#[allow(unused_imports)]
pub use {drive::*, eyre::*, stub::*};

pub fn testinit() { eyre::install(); }

/// Deterministic non-repeating-looking test data.
pub fn payload(len: usize) -> Vec<u8> { (0..len).map(|i| (i * 7 + 3) as u8).collect() }
