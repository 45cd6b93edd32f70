//! # LDPC codec
//!
//! `ldpc_codec` is a forward error correction codec for binary LDPC codes. It
//! loads a parity check matrix in alist format, encodes messages
//! systematically, optionally punctures the codewords, and decodes received
//! LLRs with belief propagation.
//!
//! The main entry points are the [`codec::Encoder`] and [`codec::Decoder`]
//! instances. The lower level building blocks (sparse matrices, Tanner graph,
//! systematic layout, puncturing and decoders) are also public.
//!
//! It can be used as a Rust library, as a C library through the functions in
//! [`c_api`], or as a CLI tool. See [`cli`] for documentation about the usage of
//! the CLI tool.

#![warn(missing_docs)]

pub mod c_api;
pub mod cli;
pub mod codec;
pub mod decoder;
pub mod encoder;
pub mod gf2;
pub mod graph;
pub mod puncturing;
pub mod sparse;
pub mod systematic;

mod linalg;
