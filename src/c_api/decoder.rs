//! Decoder handles.

use super::{c_slice, c_slice_mut, c_to_string, EXHAUSTED, INVALID_ARGUMENTS};
use crate::codec::{Decoder, Error, Outcome};
use libc::size_t;
use std::{
    convert::TryFrom,
    ffi::{c_char, c_void},
};

fn into_handle(decoder: Result<Decoder, Error>) -> *mut c_void {
    match decoder {
        Ok(decoder) => Box::into_raw(Box::new(decoder)) as *mut c_void,
        Err(e) => {
            log::warn!("could not create decoder: {e}");
            std::ptr::null_mut()
        }
    }
}

fn return_code(outcome: Result<Outcome, Error>) -> i32 {
    match outcome {
        Ok(outcome) => match i32::try_from(outcome.status_code()) {
            Ok(code) => code,
            Err(_) => EXHAUSTED,
        },
        Err(e) => {
            log::warn!("decode failed: {e}");
            INVALID_ARGUMENTS
        }
    }
}

fn from_alist_file(
    alist_file: &str,
    implementation: &str,
    puncturing: &str,
) -> Result<Decoder, Box<dyn std::error::Error>> {
    let alist = std::fs::read_to_string(alist_file)?;
    Ok(Decoder::new(&alist, implementation, puncturing)?)
}

/// Creates a decoder from an alist file.
///
/// The alist must use one-based indices. `puncturing` can be an empty string
/// for no puncturing. Returns a null pointer on failure.
///
/// # Safety
///
/// The arguments must be null or point to NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn ldpc_codec_decoder_ctor(
    alist_file_path: *const c_char,
    implementation: *const c_char,
    puncturing: *const c_char,
) -> *mut c_void {
    let (Some(alist_file_path), Some(implementation), Some(puncturing)) = (
        c_to_string(alist_file_path),
        c_to_string(implementation),
        c_to_string(puncturing),
    ) else {
        log::warn!("null argument passed to decoder constructor");
        return std::ptr::null_mut();
    };
    match from_alist_file(&alist_file_path, &implementation, &puncturing) {
        Ok(decoder) => Box::into_raw(Box::new(decoder)) as *mut c_void,
        Err(e) => {
            log::warn!("could not create decoder from {alist_file_path}: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Creates a decoder from the contents of an alist.
///
/// This behaves as [`ldpc_codec_decoder_ctor`], but takes the alist text
/// instead of a file path.
///
/// # Safety
///
/// The arguments must be null or point to NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn ldpc_codec_decoder_ctor_alist_string(
    alist: *const c_char,
    implementation: *const c_char,
    puncturing: *const c_char,
) -> *mut c_void {
    let (Some(alist), Some(implementation), Some(puncturing)) = (
        c_to_string(alist),
        c_to_string(implementation),
        c_to_string(puncturing),
    ) else {
        log::warn!("null argument passed to decoder constructor");
        return std::ptr::null_mut();
    };
    into_handle(Decoder::new(&alist, &implementation, &puncturing))
}

/// Destroys a decoder.
///
/// # Safety
///
/// `decoder` must be null or a handle returned by a decoder constructor that
/// has not been destroyed yet.
#[no_mangle]
pub unsafe extern "C" fn ldpc_codec_decoder_dtor(decoder: *mut c_void) {
    if !decoder.is_null() {
        drop(Box::from_raw(decoder as *mut Decoder));
    }
}

unsafe fn decode<T>(
    decoder: *const c_void,
    output: *mut u8,
    output_len: size_t,
    llrs: *const T,
    llrs_len: size_t,
    max_iterations: u32,
    decode_into: impl FnOnce(&Decoder, &mut [u8], &[T], usize) -> Result<Outcome, Error>,
) -> i32 {
    let (Some(output), Some(llrs), Some(decoder), Ok(max_iterations)) = (
        c_slice_mut(output, output_len),
        c_slice(llrs, llrs_len),
        (decoder as *const Decoder).as_ref(),
        usize::try_from(max_iterations),
    ) else {
        log::warn!("invalid arguments passed to decode function");
        return INVALID_ARGUMENTS;
    };
    return_code(decode_into(decoder, output, llrs, max_iterations))
}

/// Decodes a codeword given by `double` LLRs.
///
/// The `output` buffer receives the `k` message bits. Returns the number of
/// iterations, -1 if decoding did not converge, or -2 for invalid arguments.
///
/// # Safety
///
/// `decoder` must be a valid decoder handle or null. `output` and `llrs` must
/// be null or point to buffers of the given lengths.
#[no_mangle]
pub unsafe extern "C" fn ldpc_codec_decoder_decode_f64(
    decoder: *mut c_void,
    output: *mut u8,
    output_len: size_t,
    llrs: *const f64,
    llrs_len: size_t,
    max_iterations: u32,
) -> i32 {
    decode(
        decoder,
        output,
        output_len,
        llrs,
        llrs_len,
        max_iterations,
        Decoder::decode_into,
    )
}

/// Decodes a codeword given by `float` LLRs.
///
/// This behaves as [`ldpc_codec_decoder_decode_f64`].
///
/// # Safety
///
/// `decoder` must be a valid decoder handle or null. `output` and `llrs` must
/// be null or point to buffers of the given lengths.
#[no_mangle]
pub unsafe extern "C" fn ldpc_codec_decoder_decode_f32(
    decoder: *mut c_void,
    output: *mut u8,
    output_len: size_t,
    llrs: *const f32,
    llrs_len: size_t,
    max_iterations: u32,
) -> i32 {
    decode(
        decoder,
        output,
        output_len,
        llrs,
        llrs_len,
        max_iterations,
        Decoder::decode_into_f32,
    )
}
