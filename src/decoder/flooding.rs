//! LDPC decoder with flooding schedule.
//!
//! This module implements a generic belief propagation LDPC decoder with a
//! flooding message passing schedule: in each iteration all the check nodes
//! send their messages, and then all the variable nodes send theirs.

use super::{
    arithmetic::{Arithmetic, CheckNodeRule, LlrFloat},
    DecodeStatus, DecoderOutput, Error, LdpcDecoder, Workspace,
};
use crate::graph::TannerGraph;
use std::sync::Arc;

/// LDPC belief propagation flooding decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoder<F> {
    arithmetic: Arithmetic<F>,
    graph: Arc<TannerGraph>,
}

impl<F: LlrFloat> Decoder<F> {
    /// Creates a new flooding LDPC decoder.
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
        self.initialize(workspace);
        for iteration in 1..=max_iterations {
            self.process_check_nodes(workspace);
            self.process_variable_nodes(workspace);
            if workspace.posterior_satisfies(&self.graph) {
                // Decode succeeded
                log::trace!("flooding decoder converged after {iteration} iterations");
                return Ok(workspace.output(iteration, DecodeStatus::Converged));
            }
        }
        // Decode failed
        log::trace!("flooding decoder exhausted {max_iterations} iterations");
        Ok(workspace.output(max_iterations, DecodeStatus::Exhausted))
    }

    fn initialize(&self, workspace: &mut Workspace<F>) {
        // First variable messages use only input LLRs
        for (e, msg) in workspace.var_to_check.iter_mut().enumerate() {
            *msg = workspace.channel[self.graph.edge_variable(e)];
        }
        workspace.check_to_var.fill(F::zero());
        workspace.posterior.copy_from_slice(&workspace.channel);
    }

    fn process_check_nodes(&self, workspace: &mut Workspace<F>) {
        let Workspace {
            var_to_check,
            check_to_var,
            scratch,
            ..
        } = workspace;
        for c in 0..self.graph.num_checks() {
            let edges = self.graph.check_edges(c);
            self.arithmetic.check_messages(
                &var_to_check[edges.clone()],
                &mut check_to_var[edges],
                scratch,
            );
        }
    }

    fn process_variable_nodes(&self, workspace: &mut Workspace<F>) {
        let Workspace {
            channel,
            posterior,
            var_to_check,
            check_to_var,
            ..
        } = workspace;
        for (v, (output_llr, &input_llr)) in posterior.iter_mut().zip(channel.iter()).enumerate() {
            let edges = self.graph.variable_edges(v);
            // Compute new LLR
            let llr = input_llr + edges.iter().map(|&e| check_to_var[e]).sum::<F>();
            // Exclude the contribution of each check node to generate message
            // for that check node
            for &e in edges {
                var_to_check[e] = Arithmetic::<F>::saturate(llr - check_to_var[e]);
            }
            *output_llr = Arithmetic::<F>::saturate(llr);
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

    fn test_decoder() -> Decoder<f64> {
        Decoder::new(graph(), CheckNodeRule::Phi)
    }

    #[test]
    fn no_errors() {
        let decoder = test_decoder();
        let max_iter = 100;
        let output = decoder.decode(&to_llrs(&CODEWORD), max_iter).unwrap();
        assert_eq!(&output.codeword, &CODEWORD);
        assert_eq!(output.iterations, 0);
        assert_eq!(output.status, DecodeStatus::Converged);
    }

    fn corrects_single_errors<F: LlrFloat>(rule: CheckNodeRule) {
        let decoder = Decoder::<F>::new(graph(), rule);
        let mut workspace = Workspace::new(&graph());
        for j in 0..CODEWORD.len() {
            let mut codeword_bad = CODEWORD;
            codeword_bad[j] ^= 1;
            let max_iter = 100;
            let output = decoder
                .decode_with_workspace(&to_llrs(&codeword_bad), max_iter, &mut workspace)
                .unwrap();
            assert_eq!(&output.codeword, &CODEWORD, "{rule:?} error at {j}");
            assert!(output.is_converged());
            assert!((1..=2).contains(&output.iterations), "{rule:?} error at {j}");
        }
    }

    #[test]
    fn single_error() {
        for rule in CheckNodeRule::all() {
            corrects_single_errors::<f32>(rule);
            corrects_single_errors::<f64>(rule);
        }
        // sum-product corrects any single error in one iteration
        let decoder = test_decoder();
        let mut codeword_bad = CODEWORD;
        codeword_bad[4] ^= 1;
        let output = decoder.decode(&to_llrs(&codeword_bad), 100).unwrap();
        assert_eq!(output.iterations, 1);
    }

    #[test]
    fn exhausted() {
        let decoder = Decoder::<f32>::new(graph(), CheckNodeRule::MinSum);
        // all the bits erased except for a wrong one
        let mut llrs = vec![0.0; CODEWORD.len()];
        llrs[0] = -1.0;
        llrs[1] = f64::NAN;
        let output = decoder.decode(&llrs, 5).unwrap();
        assert_eq!(output.iterations, 5);
        assert_eq!(output.status, DecodeStatus::Exhausted);
        assert_eq!(output.codeword.len(), CODEWORD.len());
    }

    #[test]
    fn wrong_length() {
        let decoder = test_decoder();
        assert_eq!(
            decoder.decode(&[1.0; 5], 10),
            Err(Error::LlrLengthMismatch {
                expected: 6,
                got: 5
            })
        );
    }
}
