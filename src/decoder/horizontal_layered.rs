//! LDPC decoder with horizontal layered schedule.
//!
//! This module implements a generic belief propagation LDPC decoder with a
//! serial, per check node (horizontal layered) schedule as described in [An
//! Efficient Message-Passing Schedule for LDPC
//! Decoding](https://www.eng.biu.ac.il/~goldbej/papers/engisrael.pdf), by
//! E. Sharon, S. Litsyn, and J. Goldberg.
//!
//! The check nodes are processed one at a time, and each check node updates
//! the a posteriori LLRs of its variables immediately, so that the following
//! check nodes already use them. This typically halves the number of
//! iterations needed with respect to the flooding schedule.

use super::{
    arithmetic::{Arithmetic, CheckNodeRule, LlrFloat},
    DecodeStatus, DecoderOutput, Error, LdpcDecoder, Workspace,
};
use crate::graph::TannerGraph;
use std::sync::Arc;

/// LDPC belief propagation horizontal layered decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoder<F> {
    arithmetic: Arithmetic<F>,
    graph: Arc<TannerGraph>,
}

impl<F: LlrFloat> Decoder<F> {
    /// Creates a new horizontal layered LDPC decoder.
    ///
    /// The parameter `graph` indicates the Tanner graph of the code.
    ///
    /// # Panics
    ///
    /// This function panics if the parameter of the rule is not valid (see
    /// [`CheckNodeRule::validate`]).
    pub fn new(graph: Arc<TannerGraph>, rule: CheckNodeRule) -> Self {
        Decoder {
            arithmetic: Arithmetic::new(rule),
            graph,
        }
    }

    /// Decodes a codeword.
    ///
    /// See [`LdpcDecoder::decode`].
    pub fn decode(&self, llrs: &[f64], max_iterations: usize) -> Result<DecoderOutput, Error> {
        let mut workspace = Workspace::new(&self.graph);
        self.decode_with_workspace(llrs, max_iterations, &mut workspace)
    }

    /// Decodes a codeword using a given workspace.
    ///
    /// This behaves as [`Decoder::decode`], but avoids allocating a new
    /// workspace.
    pub fn decode_with_workspace(
        &self,
        llrs: &[f64],
        max_iterations: usize,
        workspace: &mut Workspace<F>,
    ) -> Result<DecoderOutput, Error> {
        if let Some(output) = workspace.load_channel(&self.graph, &self.arithmetic, llrs)? {
            return Ok(output);
        }
        // Initialize Qv to input LLRs and Rcv to zero.
        workspace.posterior.copy_from_slice(&workspace.channel);
        workspace.check_to_var.fill(F::zero());
        for iteration in 1..=max_iterations {
            self.process_check_nodes(workspace);
            if workspace.posterior_satisfies(&self.graph) {
                // Decode succeeded
                log::trace!("layered decoder converged after {iteration} iterations");
                return Ok(workspace.output(iteration, DecodeStatus::Converged));
            }
        }
        // Decode failed
        log::trace!("layered decoder exhausted {max_iterations} iterations");
        Ok(workspace.output(max_iterations, DecodeStatus::Exhausted))
    }

    fn process_check_nodes(&self, workspace: &mut Workspace<F>) {
        let Workspace {
            posterior,
            check_to_var,
            inputs,
            scratch,
            ..
        } = workspace;
        for c in 0..self.graph.num_checks() {
            let edges = self.graph.check_edges(c);
            let vars = self.graph.check_neighbours(c);
            let inputs = &mut inputs[..vars.len()];
            // Remove the previous message of this check node from Qv
            for ((input, &v), &r) in inputs
                .iter_mut()
                .zip(vars.iter())
                .zip(check_to_var[edges.clone()].iter())
            {
                *input = Arithmetic::<F>::saturate(posterior[v] - r);
            }
            self.arithmetic
                .check_messages(inputs, &mut check_to_var[edges.clone()], scratch);
            for ((&input, &v), &r) in inputs
                .iter()
                .zip(vars.iter())
                .zip(check_to_var[edges].iter())
            {
                posterior[v] = Arithmetic::<F>::saturate(input + r);
            }
        }
    }
}

impl<F: LlrFloat> LdpcDecoder for Decoder<F> {
    fn codeword_len(&self) -> usize {
        self.graph.num_variables()
    }

    fn decode(&self, llrs: &[f64], max_iterations: usize) -> Result<DecoderOutput, Error> {
        Decoder::decode(self, llrs, max_iterations)
    }
}

#[cfg(test)]
mod test {
    use super::super::test_code::{graph, to_llrs, CODEWORD};
    use super::*;

    #[test]
    fn no_errors() {
        let decoder = Decoder::<f64>::new(graph(), CheckNodeRule::Tanh);
        let output = decoder.decode(&to_llrs(&CODEWORD), 100).unwrap();
        assert_eq!(&output.codeword, &CODEWORD);
        assert_eq!(output.iterations, 0);
    }

    fn corrects_single_errors<F: LlrFloat>(rule: CheckNodeRule) {
        let decoder = Decoder::<F>::new(graph(), rule);
        for j in 0..CODEWORD.len() {
            let mut codeword_bad = CODEWORD;
            codeword_bad[j] ^= 1;
            let output = decoder.decode(&to_llrs(&codeword_bad), 100).unwrap();
            assert_eq!(&output.codeword, &CODEWORD, "{rule:?} error at {j}");
            assert!(output.is_converged());
            assert!(output.iterations >= 1);
        }
    }

    #[test]
    fn single_error() {
        for rule in CheckNodeRule::all() {
            corrects_single_errors::<f32>(rule);
            corrects_single_errors::<f64>(rule);
        }
    }

    #[test]
    fn shared_between_threads() {
        let decoder = Decoder::<f64>::new(graph(), CheckNodeRule::Phi);
        std::thread::scope(|s| {
            for j in 0..CODEWORD.len() {
                let decoder = &decoder;
                s.spawn(move || {
                    let mut codeword_bad = CODEWORD;
                    codeword_bad[j] ^= 1;
                    let output = decoder.decode(&to_llrs(&codeword_bad), 100).unwrap();
                    assert_eq!(&output.codeword, &CODEWORD);
                });
            }
        });
    }
}
