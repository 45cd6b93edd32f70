//! LDPC systematic encoder.
//!
//! This module implements a systematic encoder for LDPC (n, k) codes whose
//! parity check matrix H has size (n-k) x n and maximum rank. The message is
//! placed in the information positions given by the
//! [`SystematicLayout`](crate::systematic::SystematicLayout) of H, and the
//! remaining n-k parity bits are computed by the encoder.
//!
//! Denote by H_P the square submatrix formed by the parity columns of H and by
//! H_I the submatrix formed by the information columns. There are two cases
//! handled by the encoder.
//!
//! The first case is the case of a "staircase-type" LDPC code (this is the case
//! for DVB-S2 codes, for example). In this case the parity columns are the last
//! n-k columns and H_P has its main diagonal and the diagonal below filled with
//! ones and no other one elsewhere. An O(n) encoding can be obtained by
//! mutiplying the matrix H_I by the k message bits (as a column vector on the
//! right) and by computing the n-k running sums of the components of the
//! resulting vector of size n-k.
//!
//! In the second case (non staircase-type), the encoder computes G0 =
//! H_P^{-1}H_I, which in general is a dense matrix. To encode a message, the
//! matrix G0 is multiplied by the k message bits (as a column vector on the
//! right) to obtain the n-k parity check bits. In this case, the encoding
//! complexity is O(n^2).

use crate::{
    gf2::GF2,
    linalg,
    sparse::SparseMatrix,
    systematic::{self, SystematicLayout},
};
use ndarray::{s, Array1, Array2, ArrayBase, Data, Ix1};
use num_traits::{One, Zero};
use thiserror::Error;

mod staircase;

/// LDPC encoder error.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Error)]
pub enum Error {
    /// The parity check matrix does not admit a systematic encoder.
    #[error("the code is not encodable: {0}")]
    NotEncodable(#[from] systematic::Error),
    /// The square submatrix formed by the parity columns of the parity check
    /// matrix is not invertible, so the encoder cannot be constructed.
    #[error("the square matrix formed by the parity columns of the parity check is not invertible")]
    SubmatrixNotInvertible,
}

/// LDPC systematic encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoder {
    layout: SystematicLayout,
    encoder: EncoderType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum EncoderType {
    // Encoder with a general dense generator matrix for the parity.
    DenseGenerator { gen_matrix: Array2<GF2> },
    // Encoder for a staircase type (repeat-accumulate) code. The encoder sparse
    // matrix computes the parity data before accumulation.
    Staircase { gen: SparseMatrix },
}

impl Encoder {
    /// Creates the systematic encoder corresponding to a parity check matrix.
    ///
    /// An error is returned if the parity check matrix is rank deficient,
    /// since in that case the code has no systematic form with `n - m`
    /// message bits.
    pub fn from_h(h: &SparseMatrix) -> Result<Encoder, Error> {
        let layout = SystematicLayout::from_h(h)?;
        let n = h.num_rows();
        let m = h.num_cols();

        let encoder = if layout.is_leading() && staircase::is_staircase(h) {
            // Special encoder for a staircase-type LDPC code.

            // If H = [H0 H1] with H0 n x (m-n) and H1 n x n, extract H0 to a
            // SparseMatrix
            let mut gen = SparseMatrix::new(n, m - n);
            for (j, k) in h.iter_all() {
                if k < m - n {
                    gen.insert(j, k);
                }
            }
            log::debug!("using staircase encoder for ({}, {}) code", m, m - n);
            EncoderType::Staircase { gen }
        } else {
            // General case, in which the generator matrix is obtained by
            // Gaussian reduction (it will be a dense matrix in general).

            // A = [H_P H_I], with the columns of each block in increasing
            // order.
            let mut position = vec![0; m];
            for (t, &c) in layout.parity().iter().enumerate() {
                position[c] = t;
            }
            for (t, &c) in layout.information().iter().enumerate() {
                position[c] = n + t;
            }
            let mut a = Array2::zeros((n, m));
            for (j, k) in h.iter_all() {
                a[[j, position[k]]] = GF2::one();
            }

            match linalg::gauss_reduction(&mut a) {
                Ok(()) => (),
                Err(linalg::Error::NotInvertible) => return Err(Error::SubmatrixNotInvertible),
            };

            let gen_matrix = a.slice(s![.., n..]).to_owned();
            log::debug!(
                "using dense generator encoder for ({}, {}) code (message in leading positions: {})",
                m,
                m - n,
                layout.is_leading()
            );
            EncoderType::DenseGenerator { gen_matrix }
        };
        Ok(Encoder { layout, encoder })
    }

    /// Returns the systematic layout used by the encoder.
    pub fn layout(&self) -> &SystematicLayout {
        &self.layout
    }

    /// Encodes a message into a codeword.
    ///
    /// The codeword contains the message in the information positions of the
    /// layout and the parity bits in the parity positions.
    ///
    /// # Panics
    ///
    /// This function panics if the length of the message is not `k`.
    pub fn encode<S>(&self, message: &ArrayBase<S, Ix1>) -> Array1<GF2>
    where
        S: Data<Elem = GF2>,
    {
        assert_eq!(message.len(), self.layout.message_len());
        let parity = match &self.encoder {
            EncoderType::DenseGenerator { gen_matrix } => gen_matrix.dot(message),
            EncoderType::Staircase { gen } => {
                // initial parity (needs to be accumulated)
                let mut parity = Array1::from_iter(
                    (0..gen.num_rows()).map(|j| gen.iter_row(j).map(|&k| message[k]).sum()),
                );
                // Accumulate parity
                for j in 1..parity.len() {
                    let previous = parity[j - 1];
                    parity[j] += previous;
                }
                parity
            }
        };
        let mut codeword = Array1::zeros(self.layout.codeword_len());
        for (&c, &x) in self.layout.information().iter().zip(message.iter()) {
            codeword[c] = x;
        }
        for (&c, &x) in self.layout.parity().iter().zip(parity.iter()) {
            codeword[c] = x;
        }
        codeword
    }

    /// Encodes a message given as unpacked bits.
    ///
    /// Any nonzero byte in the message is a one. The codeword is returned as
    /// unpacked bits.
    ///
    /// # Panics
    ///
    /// This function panics if the length of the message is not `k`.
    pub fn encode_bits(&self, message: &[u8]) -> Vec<u8> {
        let message = Array1::from_iter(message.iter().map(|&b| GF2::from_bit(b)));
        self.encode(&message)
            .iter()
            .map(|x| if x.is_zero() { 0 } else { 1 })
            .collect()
    }
}
