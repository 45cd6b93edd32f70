//! LDPC encoder and decoder instances.
//!
//! This module puts together the parity check matrix, its systematic layout,
//! the puncturing pattern and the belief propagation decoder into an
//! [`Encoder`] and a [`Decoder`] that work with unpacked bits (one byte per
//! bit) and LLRs at the boundary with the channel.
//!
//! Both instances are constructed once and are immutable afterwards. All the
//! structural problems with the code (malformed alist, rank deficient parity
//! check matrix, invalid decoder implementation or puncturing pattern) are
//! reported at construction. The encode and decode calls only fail if the
//! sizes of their buffers are wrong, and in that case the instance can still
//! be used.
//!
//! # Example
//!
//! ```
//! use ldpc_codec::codec::{Decoder, Encoder};
//!
//! let alist = "4 2\n2 3\n1 2 2 1\n3 3\n1\n1 2\n1 2\n2\n1 2 3\n2 3 4\n";
//! let encoder = Encoder::new(alist, "").unwrap();
//! let codeword = encoder.encode(&[1, 0]).unwrap();
//! assert_eq!(codeword, vec![1, 0, 1, 1]);
//!
//! let decoder = Decoder::new(alist, "Phif64", "").unwrap();
//! let llrs = codeword
//!     .iter()
//!     .map(|&b| if b == 0 { 10.0 } else { -10.0 })
//!     .collect::<Vec<f64>>();
//! let decoded = decoder.decode(&llrs, 10).unwrap();
//! assert_eq!(decoded.bits, vec![1, 0]);
//! ```

use crate::{
    decoder::{
        factory::{self, DecoderImplementation},
        DecodeStatus, LdpcDecoder,
    },
    encoder,
    graph::{self, TannerGraph},
    puncturing::{self, Puncturer, PuncturingPattern},
    sparse::{self, SparseMatrix},
    systematic::{self, SystematicLayout},
};
use std::sync::Arc;
use thiserror::Error;

/// Error kind.
///
/// Classifies the [`Error`]s returned by the encoder and decoder instances.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// The alist description of the parity check matrix is malformed.
    Format,
    /// The code cannot be used (for instance, its parity check matrix is not
    /// full rank).
    Structural,
    /// The decoder implementation or the puncturing pattern is not valid.
    Configuration,
    /// A buffer passed to an encode or decode call has the wrong size.
    InputSize,
}

/// Encoder and decoder instance error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The alist is malformed.
    #[error("invalid alist: {0}")]
    Format(#[from] sparse::Error),
    /// The Tanner graph of the code is not valid.
    #[error("invalid Tanner graph: {0}")]
    Graph(#[from] graph::Error),
    /// The code has no systematic layout.
    #[error("invalid code: {0}")]
    Layout(#[from] systematic::Error),
    /// The encoder cannot be constructed.
    #[error("invalid code: {0}")]
    Encoder(#[from] encoder::Error),
    /// The decoder implementation is not valid.
    #[error(transparent)]
    Implementation(#[from] factory::Error),
    /// The puncturing pattern is not valid.
    #[error("invalid puncturing: {0}")]
    Puncturing(#[from] puncturing::Error),
    /// A buffer has the wrong size.
    #[error("{what} has length {got} but its length should be {expected}")]
    InputSize {
        /// Buffer that has the wrong size.
        what: &'static str,
        /// Expected size.
        expected: usize,
        /// Actual size.
        got: usize,
    },
}

impl Error {
    /// Returns the kind of the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Format(_) => ErrorKind::Format,
            Error::Graph(_) | Error::Layout(_) | Error::Encoder(_) => ErrorKind::Structural,
            Error::Implementation(_) => ErrorKind::Configuration,
            Error::Puncturing(puncturing::Error::LengthMismatch { .. }) => ErrorKind::InputSize,
            Error::Puncturing(_) => ErrorKind::Configuration,
            Error::InputSize { .. } => ErrorKind::InputSize,
        }
    }
}

fn check_size(what: &'static str, expected: usize, got: usize) -> Result<(), Error> {
    if expected != got {
        return Err(Error::InputSize {
            what,
            expected,
            got,
        });
    }
    Ok(())
}

fn parse_puncturer(puncturing: &str, codeword_len: usize) -> Result<Puncturer, Error> {
    let pattern = puncturing.parse::<PuncturingPattern>()?;
    Ok(Puncturer::new(&pattern, codeword_len)?)
}

/// LDPC encoder instance.
#[derive(Debug, Clone)]
pub struct Encoder {
    encoder: encoder::Encoder,
    puncturer: Puncturer,
}

impl Encoder {
    /// Creates an encoder from an alist and a textual puncturing pattern.
    ///
    /// See [`PuncturingPattern`] for the syntax of the puncturing pattern.
    /// The alist is parsed with one-based indices, as [`SparseMatrix::from_alist`]
    /// does. A zero-based alist can be parsed with
    /// [`SparseMatrix::from_alist_with`] and passed to [`Encoder::from_parts`].
    pub fn new(alist: &str, puncturing: &str) -> Result<Encoder, Error> {
        let h = SparseMatrix::from_alist(alist)?;
        let pattern = puncturing.parse::<PuncturingPattern>()?;
        Encoder::from_parts(&h, &pattern)
    }

    /// Creates an encoder from a parity check matrix and a puncturing pattern.
    pub fn from_parts(h: &SparseMatrix, puncturing: &PuncturingPattern) -> Result<Encoder, Error> {
        TannerGraph::from_h(h)?;
        let encoder = encoder::Encoder::from_h(h)?;
        let puncturer = Puncturer::new(puncturing, h.num_cols())?;
        log::debug!(
            "created encoder for ({}, {}) code transmitting {} bits",
            puncturer.codeword_len(),
            encoder.layout().message_len(),
            puncturer.punctured_len()
        );
        Ok(Encoder { encoder, puncturer })
    }

    /// Returns the message length `k`.
    pub fn message_len(&self) -> usize {
        self.encoder.layout().message_len()
    }

    /// Returns the codeword length `n` before puncturing.
    pub fn codeword_len(&self) -> usize {
        self.puncturer.codeword_len()
    }

    /// Returns the length of the encoder output (the punctured codeword).
    pub fn output_len(&self) -> usize {
        self.puncturer.punctured_len()
    }

    /// Returns the systematic layout of the code.
    pub fn layout(&self) -> &SystematicLayout {
        self.encoder.layout()
    }

    /// Encodes a message.
    ///
    /// The message is given as `k` unpacked bits, where any nonzero byte is a
    /// one. The punctured codeword is returned as unpacked bits.
    pub fn encode(&self, input: &[u8]) -> Result<Vec<u8>, Error> {
        check_size("message", self.message_len(), input.len())?;
        let codeword = self.encoder.encode_bits(input);
        Ok(self.puncturer.puncture_slice(&codeword)?)
    }

    /// Encodes a message into an output buffer.
    ///
    /// This behaves as [`Encoder::encode`], but writes the punctured codeword
    /// into `output`, whose size must be [`Encoder::output_len`].
    pub fn encode_into(&self, output: &mut [u8], input: &[u8]) -> Result<(), Error> {
        check_size("message", self.message_len(), input.len())?;
        check_size("output", self.output_len(), output.len())?;
        output.copy_from_slice(&self.encode(input)?);
        Ok(())
    }
}

/// Number of iterations and status of a decoding.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Outcome {
    /// Number of iterations used.
    pub iterations: usize,
    /// Decoding status.
    pub status: DecodeStatus,
}

impl Outcome {
    /// Returns the number of iterations if the decoder converged and -1
    /// otherwise.
    pub fn status_code(&self) -> i64 {
        match self.status {
            DecodeStatus::Converged => i64::try_from(self.iterations).unwrap_or(i64::MAX),
            DecodeStatus::Exhausted => -1,
        }
    }
}

/// Decoded message.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Decoded {
    /// Message bits, read from the information positions of the decoded
    /// codeword.
    pub bits: Vec<u8>,
    /// Number of iterations used.
    pub iterations: usize,
    /// Decoding status.
    pub status: DecodeStatus,
}

impl Decoded {
    /// Returns the number of iterations and the status.
    pub fn outcome(&self) -> Outcome {
        Outcome {
            iterations: self.iterations,
            status: self.status,
        }
    }

    /// Returns the number of iterations if the decoder converged and -1
    /// otherwise.
    pub fn status_code(&self) -> i64 {
        self.outcome().status_code()
    }
}

/// LDPC decoder instance.
#[derive(Debug)]
pub struct Decoder {
    layout: SystematicLayout,
    puncturer: Puncturer,
    implementation: DecoderImplementation,
    decoder: Box<dyn LdpcDecoder>,
}

impl Decoder {
    /// Creates a decoder from an alist, a decoder implementation identifier
    /// and a textual puncturing pattern.
    ///
    /// See [`factory`] for the syntax of the decoder implementation and
    /// [`PuncturingPattern`] for the syntax of the puncturing pattern.
    /// The alist is parsed with one-based indices. A zero-based alist can be
    /// parsed with [`SparseMatrix::from_alist_with`] and passed to
    /// [`Decoder::from_parts`].
    pub fn new(alist: &str, implementation: &str, puncturing: &str) -> Result<Decoder, Error> {
        let h = SparseMatrix::from_alist(alist)?;
        let implementation = implementation.parse::<DecoderImplementation>()?;
        let puncturer = parse_puncturer(puncturing, h.num_cols())?;
        Decoder::build(&h, implementation, puncturer)
    }

    /// Creates a decoder from a parity check matrix, a decoder implementation
    /// and a puncturing pattern.
    pub fn from_parts(
        h: &SparseMatrix,
        implementation: DecoderImplementation,
        puncturing: &PuncturingPattern,
    ) -> Result<Decoder, Error> {
        let puncturer = Puncturer::new(puncturing, h.num_cols())?;
        Decoder::build(h, implementation, puncturer)
    }

    fn build(
        h: &SparseMatrix,
        implementation: DecoderImplementation,
        puncturer: Puncturer,
    ) -> Result<Decoder, Error> {
        let graph = Arc::new(TannerGraph::from_h(h)?);
        let layout = SystematicLayout::from_h(h)?;
        let decoder = implementation.build_decoder(graph);
        log::debug!(
            "created {} decoder for ({}, {}) code receiving {} LLRs",
            implementation,
            layout.codeword_len(),
            layout.message_len(),
            puncturer.punctured_len()
        );
        Ok(Decoder {
            layout,
            puncturer,
            implementation,
            decoder,
        })
    }

    /// Returns the message length `k`.
    pub fn message_len(&self) -> usize {
        self.layout.message_len()
    }

    /// Returns the codeword length `n` before puncturing.
    pub fn codeword_len(&self) -> usize {
        self.layout.codeword_len()
    }

    /// Returns the number of LLRs taken by the decoder (the punctured codeword
    /// length).
    pub fn input_len(&self) -> usize {
        self.puncturer.punctured_len()
    }

    /// Returns the decoder implementation.
    pub fn implementation(&self) -> DecoderImplementation {
        self.implementation
    }

    /// Returns the systematic layout of the code.
    pub fn layout(&self) -> &SystematicLayout {
        &self.layout
    }

    /// Decodes a punctured codeword.
    ///
    /// The parameters are the LLRs of the transmitted (non-punctured) bits and
    /// the maximum number of iterations. Positive LLRs correspond to zeros.
    /// Reaching the maximum number of iterations is not an error: it is
    /// reported in the status of the [`Decoded`] message, which contains the
    /// best effort decision in that case.
    pub fn decode(&self, llrs: &[f64], max_iterations: usize) -> Result<Decoded, Error> {
        check_size("LLRs", self.input_len(), llrs.len())?;
        let llrs = self.puncturer.depuncture(llrs)?;
        let output = self
            .decoder
            .decode(&llrs, max_iterations)
            .map_err(|e| match e {
                crate::decoder::Error::LlrLengthMismatch { expected, got } => Error::InputSize {
                    what: "LLRs",
                    expected,
                    got,
                },
            })?;
        if !output.is_converged() {
            log::debug!("decoding failed after {} iterations", output.iterations);
        }
        Ok(Decoded {
            bits: self.layout.extract(&output.codeword),
            iterations: output.iterations,
            status: output.status,
        })
    }

    /// Decodes a punctured codeword given by `f32` LLRs.
    ///
    /// This behaves as [`Decoder::decode`].
    pub fn decode_f32(&self, llrs: &[f32], max_iterations: usize) -> Result<Decoded, Error> {
        check_size("LLRs", self.input_len(), llrs.len())?;
        let llrs = llrs.iter().copied().map(f64::from).collect::<Vec<f64>>();
        self.decode(&llrs, max_iterations)
    }

    /// Decodes a punctured codeword into an output buffer.
    ///
    /// This behaves as [`Decoder::decode`], but writes the message bits into
    /// `output`, whose length must be [`Decoder::message_len`].
    pub fn decode_into(
        &self,
        output: &mut [u8],
        llrs: &[f64],
        max_iterations: usize,
    ) -> Result<Outcome, Error> {
        check_size("output", self.message_len(), output.len())?;
        let decoded = self.decode(llrs, max_iterations)?;
        output.copy_from_slice(&decoded.bits);
        Ok(decoded.outcome())
    }

    /// Decodes a punctured codeword given by `f32` LLRs into an output buffer.
    ///
    /// This behaves as [`Decoder::decode_into`].
    pub fn decode_into_f32(
        &self,
        output: &mut [u8],
        llrs: &[f32],
        max_iterations: usize,
    ) -> Result<Outcome, Error> {
        check_size("output", self.message_len(), output.len())?;
        let decoded = self.decode_f32(llrs, max_iterations)?;
        output.copy_from_slice(&decoded.bits);
        Ok(decoded.outcome())
    }
}
