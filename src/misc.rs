use crate::error::{Error, Result};
use std::ffi::CString;

/// Converts a host or service name into a C string, rejecting interior nul bytes before the
/// resolver ever sees the string.
pub(crate) fn to_cstring(s: &str, what: &str) -> Result<CString> {
    CString::new(s).map_err(|_| Error::InvalidArgument(format!("{what} contains a nul byte")))
}

/// Caps a buffer length at what a C `int` can describe. Used where the native API takes buffer
/// sizes as `int` rather than `size_t`; the call then simply transfers fewer bytes.
#[inline]
#[allow(dead_code)] // only Windows calls this
pub(crate) fn clamp_to_c_int(len: usize) -> i32 { i32::try_from(len).unwrap_or(i32::MAX) }

/// Position of the first occurrence of `needle` in `haystack`.
#[inline]
pub(crate) fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    match needle {
        [] => Some(0),
        [b] => haystack.iter().position(|x| x == b),
        _ => haystack.windows(needle.len()).position(|w| w == needle),
    }
}
