//! BSD sockets through `libc`.

mod unixprelude;

pub(crate) mod c_wrappers;
pub(crate) mod errno;
pub(crate) mod resolver;
pub(crate) mod sockaddr;
