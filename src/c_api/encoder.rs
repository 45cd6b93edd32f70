//! Encoder handles.

use super::{c_slice, c_slice_mut, c_to_string, INVALID_ARGUMENTS};
use crate::codec::Encoder;
use libc::size_t;
use std::ffi::{c_char, c_void};

fn from_alist_file(alist_file: &str, puncturing: &str) -> Result<Encoder, Box<dyn std::error::Error>> {
    let alist = std::fs::read_to_string(alist_file)?;
    Ok(Encoder::new(&alist, puncturing)?)
}

/// Creates an encoder from an alist file.
///
/// The alist must use one-based indices. `puncturing` can be an empty string
/// for no puncturing. Returns a null pointer on failure.
///
/// # Safety
///
/// The arguments must be null or point to NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn ldpc_codec_encoder_ctor(
    alist_file_path: *const c_char,
    puncturing: *const c_char,
) -> *mut c_void {
    let (Some(alist_file_path), Some(puncturing)) =
        (c_to_string(alist_file_path), c_to_string(puncturing))
    else {
        log::warn!("null argument passed to encoder constructor");
        return std::ptr::null_mut();
    };
    match from_alist_file(&alist_file_path, &puncturing) {
        Ok(encoder) => Box::into_raw(Box::new(encoder)) as *mut c_void,
        Err(e) => {
            log::warn!("could not create encoder from {alist_file_path}: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Creates an encoder from the contents of an alist.
///
/// This behaves as [`ldpc_codec_encoder_ctor`], but takes the alist text
/// instead of a file path.
///
/// # Safety
///
/// The arguments must be null or point to NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn ldpc_codec_encoder_ctor_alist_string(
    alist: *const c_char,
    puncturing: *const c_char,
) -> *mut c_void {
    let (Some(alist), Some(puncturing)) = (c_to_string(alist), c_to_string(puncturing)) else {
        log::warn!("null argument passed to encoder constructor");
        return std::ptr::null_mut();
    };
    match Encoder::new(&alist, &puncturing) {
        Ok(encoder) => Box::into_raw(Box::new(encoder)) as *mut c_void,
        Err(e) => {
            log::warn!("could not create encoder: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Destroys an encoder.
///
/// # Safety
///
/// `encoder` must be null or a handle returned by an encoder constructor that
/// has not been destroyed yet.
#[no_mangle]
pub unsafe extern "C" fn ldpc_codec_encoder_dtor(encoder: *mut c_void) {
    if !encoder.is_null() {
        drop(Box::from_raw(encoder as *mut Encoder));
    }
}

/// Encodes a message.
///
/// The `input` buffer contains the `k` message bits, and the `output` buffer
/// receives the punctured codeword. Returns 0 on success or -2 for invalid
/// arguments.
///
/// # Safety
///
/// `encoder` must be a valid encoder handle or null. `output` and `input`
/// must be null or point to buffers of the given lengths.
#[no_mangle]
pub unsafe extern "C" fn ldpc_codec_encoder_encode(
    encoder: *mut c_void,
    output: *mut u8,
    output_len: size_t,
    input: *const u8,
    input_len: size_t,
) -> i32 {
    let (Some(output), Some(input), Some(encoder)) = (
        c_slice_mut(output, output_len),
        c_slice(input, input_len),
        (encoder as *const Encoder).as_ref(),
    ) else {
        log::warn!("invalid arguments passed to encode function");
        return INVALID_ARGUMENTS;
    };
    match encoder.encode_into(output, input) {
        Ok(()) => 0,
        Err(e) => {
            log::warn!("encode failed: {e}");
            INVALID_ARGUMENTS
        }
    }
}
