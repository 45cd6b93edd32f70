//! C ABI.
//!
//! This module exposes the [`codec`](crate::codec) encoder and decoder
//! instances to C through opaque handles. The declarations are in
//! `include/ldpc_codec.h`.
//!
//! Constructors return a null pointer on failure. The decode functions return
//! the number of iterations if decoding converged, [`EXHAUSTED`] if the
//! maximum number of iterations was reached, and [`INVALID_ARGUMENTS`] if a
//! pointer is null or a buffer has the wrong size. The encode function returns
//! zero or [`INVALID_ARGUMENTS`]. Errors are logged using the [`log`] crate.

use libc::size_t;
use std::{
    convert::TryFrom,
    ffi::{c_char, CStr},
};

pub mod decoder;
pub mod encoder;

/// Return code of a decode call that reached the maximum number of
/// iterations.
pub const EXHAUSTED: i32 = -1;
/// Return code of a call with invalid arguments.
pub const INVALID_ARGUMENTS: i32 = -2;

unsafe fn c_to_string(s: *const c_char) -> Option<String> {
    if s.is_null() {
        return None;
    }
    Some(String::from_utf8_lossy(CStr::from_ptr(s).to_bytes()).to_string())
}

#[allow(clippy::useless_conversion)]
fn size_t_to_usize(n: size_t) -> Option<usize> {
    usize::try_from(n).ok()
}

// Builds a slice from a C buffer. Returns `None` for a null pointer.
unsafe fn c_slice<'a, T>(ptr: *const T, len: size_t) -> Option<&'a [T]> {
    if ptr.is_null() {
        return None;
    }
    Some(std::slice::from_raw_parts(ptr, size_t_to_usize(len)?))
}

unsafe fn c_slice_mut<'a, T>(ptr: *mut T, len: size_t) -> Option<&'a mut [T]> {
    if ptr.is_null() {
        return None;
    }
    Some(std::slice::from_raw_parts_mut(ptr, size_t_to_usize(len)?))
}
