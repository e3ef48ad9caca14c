//! Winsock through `windows-sys`.

mod winprelude;

pub(crate) mod c_wrappers;
pub(crate) mod errno;
pub(crate) mod resolver;
pub(crate) mod sockaddr;
