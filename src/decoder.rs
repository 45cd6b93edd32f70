//! LDPC belief propagation decoders.
//!
//! This module provides several implementations of a LDPC decoders using belief
//! propagation (the sum-product algorithm and its approximations). The
//! implementations differ in their check node update rules (see
//! [`arithmetic`]), their floating point precision and their message passing
//! schedules ([`flooding`] and [`horizontal_layered`]).
//!
//! Decoders only hold immutable data (the Tanner graph and the arithmetic), so
//! a single decoder can be used concurrently from several threads. The
//! per-call state lives in a [`Workspace`], which each call to
//! [`LdpcDecoder::decode`] allocates, and which can be reused across calls by
//! using `decode_with_workspace` on the concrete decoder types.
//!
//! LLRs follow the convention `LLR = log(P(bit = 0) / P(bit = 1))`, so positive
//! LLRs correspond to zeros, and the hard decision on an LLR `x` is a one iff
//! `x <= 0`.

use crate::graph::TannerGraph;
use arithmetic::{Arithmetic, LlrFloat};
use thiserror::Error;

pub mod arithmetic;
pub mod factory;
pub mod flooding;
pub mod horizontal_layered;

/// LDPC decoder error.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Error)]
pub enum Error {
    /// The number of LLRs is not equal to the codeword length.
    #[error("got {got} LLRs but the codeword length is {expected}")]
    LlrLengthMismatch {
        /// Codeword length.
        expected: usize,
        /// Number of LLRs.
        got: usize,
    },
}

/// Generic LDPC decoder.
///
/// This trait is used to form LDPC decoder trait objects, abstracting over the
/// internal implementation decoder.
pub trait LdpcDecoder: std::fmt::Debug + Send + Sync {
    /// Returns the codeword length.
    fn codeword_len(&self) -> usize;

    /// Decodes a codeword.
    ///
    /// The parameters are the LLRs for the received codeword and the maximum
    /// number of iterations to perform. The function returns the hard
    /// decision on the decoded codeword, the number of iterations used and
    /// whether the decoder converged to a codeword. Failing to converge is
    /// not an error. An error is returned only if the number of LLRs is not
    /// the codeword length.
    fn decode(&self, llrs: &[f64], max_iterations: usize) -> Result<DecoderOutput, Error>;

    /// Decodes a codeword given by `f32` LLRs.
    ///
    /// This behaves as [`LdpcDecoder::decode`].
    fn decode_f32(&self, llrs: &[f32], max_iterations: usize) -> Result<DecoderOutput, Error> {
        let llrs = llrs.iter().copied().map(f64::from).collect::<Vec<f64>>();
        self.decode(&llrs, max_iterations)
    }
}

/// Final state of a decoding.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DecodeStatus {
    /// All the parity checks are satisfied.
    Converged,
    /// The maximum number of iterations was reached without satisfying all
    /// the parity checks.
    Exhausted,
}

/// LDPC decoder output.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct DecoderOutput {
    /// Decoded codeword.
    ///
    /// Contains the hard decision bits of the decoded codeword. If decoding
    /// is not successful, these are the hard decisions on the final decoder
    /// LLRs, which still have some bit errors.
    pub codeword: Vec<u8>,
    /// Number of iterations.
    ///
    /// Number of iterations used in decoding. This is zero if the input LLRs
    /// already satisfied all the parity checks, and `max_iterations` if
    /// decoding was not successful.
    pub iterations: usize,
    /// Decoding status.
    pub status: DecodeStatus,
}

impl DecoderOutput {
    /// Returns `true` if the decoder converged to a codeword.
    pub fn is_converged(&self) -> bool {
        self.status == DecodeStatus::Converged
    }
}

/// Decoder working memory.
///
/// Holds the messages and LLRs that a decoder updates during a decoding. A
/// workspace can be reused by different decodings and by different decoders.
/// It is resized as needed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workspace<F> {
    // channel LLRs
    channel: Vec<F>,
    // a posteriori LLRs
    posterior: Vec<F>,
    // messages per edge, in edge order
    var_to_check: Vec<F>,
    check_to_var: Vec<F>,
    // per check node buffers
    inputs: Vec<F>,
    scratch: Vec<F>,
}

impl<F: LlrFloat> Workspace<F> {
    /// Creates a workspace for a Tanner graph.
    pub fn new(graph: &TannerGraph) -> Workspace<F> {
        let mut workspace = Workspace::default();
        workspace.resize(graph);
        workspace
    }

    fn resize(&mut self, graph: &TannerGraph) {
        let zero = F::zero();
        self.channel.resize(graph.num_variables(), zero);
        self.posterior.resize(graph.num_variables(), zero);
        self.var_to_check.resize(graph.num_edges(), zero);
        self.check_to_var.resize(graph.num_edges(), zero);
        self.inputs.resize(graph.max_check_degree(), zero);
        self.scratch.resize(graph.max_check_degree(), zero);
    }

    // Quantizes the channel LLRs. Returns the decoder output if their hard
    // decisions are already a codeword.
    fn load_channel(
        &mut self,
        graph: &TannerGraph,
        arithmetic: &Arithmetic<F>,
        llrs: &[f64],
    ) -> Result<Option<DecoderOutput>, Error> {
        if llrs.len() != graph.num_variables() {
            return Err(Error::LlrLengthMismatch {
                expected: graph.num_variables(),
                got: llrs.len(),
            });
        }
        self.resize(graph);
        for (x, &y) in self.channel.iter_mut().zip(llrs.iter()) {
            *x = arithmetic.input_llr_quantize(y);
        }
        if graph.parity_satisfied(&self.channel, Arithmetic::<F>::llr_hard_decision) {
            // No bit errors case
            return Ok(Some(DecoderOutput {
                codeword: hard_decisions(&self.channel),
                iterations: 0,
                status: DecodeStatus::Converged,
            }));
        }
        Ok(None)
    }

    fn posterior_satisfies(&self, graph: &TannerGraph) -> bool {
        graph.parity_satisfied(&self.posterior, Arithmetic::<F>::llr_hard_decision)
    }

    fn output(&self, iterations: usize, status: DecodeStatus) -> DecoderOutput {
        DecoderOutput {
            codeword: hard_decisions(&self.posterior),
            iterations,
            status,
        }
    }
}

fn hard_decisions<F: LlrFloat>(llrs: &[F]) -> Vec<u8> {
    llrs.iter()
        .map(|&llr| u8::from(Arithmetic::<F>::llr_hard_decision(llr)))
        .collect()
}

#[cfg(test)]
pub(crate) mod test_code {
    use crate::{graph::TannerGraph, sparse::SparseMatrix};
    use std::sync::Arc;

    pub fn graph() -> Arc<TannerGraph> {
        // Example 2.5 in Sarah J. Johnson - Iterative Error Correction
        let mut h = SparseMatrix::new(4, 6);
        h.insert_row(0, [0, 1, 3].iter());
        h.insert_row(1, [1, 2, 4].iter());
        h.insert_row(2, [0, 4, 5].iter());
        h.insert_row(3, [2, 3, 5].iter());
        Arc::new(TannerGraph::from_h(&h).unwrap())
    }

    // These are based on example 2.23 in Sarah J. Johnson - Iterative Error Correction

    pub const CODEWORD: [u8; 6] = [0, 0, 1, 0, 1, 1];

    pub fn to_llrs(bits: &[u8]) -> Vec<f64> {
        bits.iter()
            .map(|&b| if b == 0 { 1.3863 } else { -1.3863 })
            .collect()
    }
}
