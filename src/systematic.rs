//! Systematic layout of a code.
//!
//! A full-rank `m x n` parity check matrix `H` defines an `(n, n - m)` code in
//! which some set of `k = n - m` positions (an information set) can be chosen
//! freely and determines the remaining `m` parity positions. The encoder puts
//! the message bits in the information positions, and the decoder reads them
//! back from the same positions, so both derive the layout from `H` with
//! [`SystematicLayout::from_h`].
//!
//! The information set is chosen by Gaussian elimination over GF(2), visiting
//! the columns from the last one to the first one. When the square submatrix
//! formed by the last `m` columns of `H` is invertible (which is how most
//! codes are published) the parity positions are the last `m` columns and the
//! message occupies the first `k` positions of the codeword.
//!
//! Elimination needs a dense `m x n` matrix, so it is skipped when the last `m`
//! columns of `H` are lower triangular with a full diagonal, which covers
//! staircase (repeat-accumulate) codes such as those of DVB-S2. Such a block
//! is invertible and the layout is known without any dense work.

use crate::{gf2::GF2, linalg, sparse::SparseMatrix};
use ndarray::Array2;
use num_traits::One;
use thiserror::Error;

/// Systematic layout error.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Error)]
pub enum Error {
    /// The parity check matrix has more rows than columns.
    #[error("the parity check matrix has more rows than columns")]
    ParityOverdetermined,
    /// The parity check matrix does not have full rank.
    #[error("the parity check matrix does not have full rank (rank {rank} < {rows} rows)")]
    NotFullRank {
        /// Rank of the matrix.
        rank: usize,
        /// Number of rows of the matrix.
        rows: usize,
    },
}

/// Information and parity positions of a systematic code.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct SystematicLayout {
    information: Box<[usize]>,
    parity: Box<[usize]>,
}

impl SystematicLayout {
    /// Computes the systematic layout of a parity check matrix.
    pub fn from_h(h: &SparseMatrix) -> Result<SystematicLayout, Error> {
        let m = h.num_rows();
        let n = h.num_cols();
        if m > n {
            return Err(Error::ParityOverdetermined);
        }
        if tail_is_unit_lower_triangular(h) {
            return Ok(SystematicLayout::leading(n - m, n));
        }
        let mut a = Array2::<GF2>::zeros((m, n));
        for (j, k) in h.iter_all() {
            a[[j, k]] = GF2::one();
        }
        let mut parity = linalg::row_echelon_pivots(&mut a, (0..n).rev());
        if parity.len() < m {
            return Err(Error::NotFullRank {
                rank: parity.len(),
                rows: m,
            });
        }
        parity.sort_unstable();
        let information = (0..n)
            .filter(|c| parity.binary_search(c).is_err())
            .collect::<Vec<_>>();
        Ok(SystematicLayout {
            information: information.into_boxed_slice(),
            parity: parity.into_boxed_slice(),
        })
    }

    fn leading(k: usize, n: usize) -> SystematicLayout {
        SystematicLayout {
            information: (0..k).collect(),
            parity: (k..n).collect(),
        }
    }

    /// Returns the codeword length `n`.
    pub fn codeword_len(&self) -> usize {
        self.information.len() + self.parity.len()
    }

    /// Returns the message length `k`.
    pub fn message_len(&self) -> usize {
        self.information.len()
    }

    /// Returns the information positions in increasing order.
    pub fn information(&self) -> &[usize] {
        &self.information
    }

    /// Returns the parity positions in increasing order.
    pub fn parity(&self) -> &[usize] {
        &self.parity
    }

    /// Returns `true` if the message occupies the first `k` positions.
    pub fn is_leading(&self) -> bool {
        self.information.iter().enumerate().all(|(j, &c)| j == c)
    }

    /// Extracts the message bits from a codeword.
    pub fn extract<T: Copy>(&self, codeword: &[T]) -> Vec<T> {
        self.information.iter().map(|&c| codeword[c]).collect()
    }

    /// Permutes the columns of the parity check matrix so that the information
    /// positions come first.
    ///
    /// The returned matrix describes the same code up to a permutation of the
    /// codeword bits, and its last `m` columns form an invertible matrix.
    pub fn permuted_matrix(&self, h: &SparseMatrix) -> SparseMatrix {
        let mut h_new = SparseMatrix::new(h.num_rows(), h.num_cols());
        for (new_col, &col) in self.information.iter().chain(self.parity.iter()).enumerate() {
            h_new.insert_col(new_col, h.iter_col(col));
        }
        h_new
    }
}

// Checks that the last m columns of h form a lower triangular matrix with ones
// on the diagonal.
fn tail_is_unit_lower_triangular(h: &SparseMatrix) -> bool {
    let m = h.num_rows();
    let k = h.num_cols() - m;
    (0..m).all(|row| {
        let mut diagonal = false;
        for &col in h.iter_row(row).filter(|&&col| col >= k) {
            if col - k > row {
                return false;
            }
            diagonal |= col - k == row;
        }
        diagonal
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn leading_when_tail_invertible() {
        let mut h = SparseMatrix::new(2, 4);
        h.insert_row(0, [0, 1, 2].iter());
        h.insert_row(1, [1, 2, 3].iter());
        let layout = SystematicLayout::from_h(&h).unwrap();
        assert_eq!(layout.information(), &[0, 1]);
        assert_eq!(layout.parity(), &[2, 3]);
        assert!(layout.is_leading());
        assert_eq!(layout.extract(&[7, 8, 9, 10]), vec![7, 8]);
    }

    #[test]
    fn scattered_information_set() {
        let mut h = SparseMatrix::new(3, 9);
        h.insert_col(0, [0, 1, 2].into_iter());
        h.insert_col(1, [0, 2].into_iter());
        h.insert_col(2, [1].into_iter());
        h.insert_col(3, [1].into_iter());
        h.insert_col(4, [0, 1].into_iter());
        h.insert_col(5, [1, 2].into_iter());
        h.insert_col(6, [0, 2].into_iter());
        h.insert_col(7, [1].into_iter());
        h.insert_col(8, [0, 2].into_iter());
        let layout = SystematicLayout::from_h(&h).unwrap();
        // columns 6 and 8 are equal, so 8 is a pivot and 6 is not
        assert_eq!(layout.parity(), &[5, 7, 8]);
        assert_eq!(layout.information(), &[0, 1, 2, 3, 4, 6]);
        assert!(!layout.is_leading());

        let h_sys = layout.permuted_matrix(&h);
        let relayout = SystematicLayout::from_h(&h_sys).unwrap();
        assert!(relayout.is_leading());
        assert_eq!(h_sys.iter_col(6).count(), h.iter_col(5).count());
    }

    #[test]
    fn rank_deficient() {
        let mut h = SparseMatrix::new(3, 4);
        h.insert_row(0, [0, 1, 3].iter());
        h.insert_row(1, [1, 2, 3].iter());
        h.insert_row(2, [0, 2, 3].iter());
        assert!(SystematicLayout::from_h(&h).is_ok());
        // the third row is now the sum of the first two
        let mut h = SparseMatrix::new(3, 4);
        h.insert_row(0, [0, 1, 3].iter());
        h.insert_row(1, [1, 2, 3].iter());
        h.insert_row(2, [0, 2].iter());
        assert_eq!(
            SystematicLayout::from_h(&h),
            Err(Error::NotFullRank { rank: 2, rows: 3 })
        );
    }

    #[test]
    fn triangular_tail() {
        // staircase parity part
        let mut h = SparseMatrix::new(3, 5);
        h.insert_row(0, [0, 2].iter());
        h.insert_row(1, [1, 2, 3].iter());
        h.insert_row(2, [0, 1, 3, 4].iter());
        assert!(tail_is_unit_lower_triangular(&h));
        let layout = SystematicLayout::from_h(&h).unwrap();
        assert_eq!(layout.information(), &[0, 1]);
        assert_eq!(layout.parity(), &[2, 3, 4]);
        // ones above the diagonal need elimination, which gives the same
        // layout here
        h.insert(0, 3);
        h.insert(0, 4);
        assert!(!tail_is_unit_lower_triangular(&h));
        assert!(SystematicLayout::from_h(&h).unwrap().is_leading());
        // missing diagonal
        let mut h = SparseMatrix::new(2, 4);
        h.insert_row(0, [0, 2].iter());
        h.insert_row(1, [1, 2].iter());
        assert!(!tail_is_unit_lower_triangular(&h));
        assert_eq!(SystematicLayout::from_h(&h).unwrap().parity(), &[1, 2]);
    }

    #[test]
    fn overdetermined() {
        let mut h = SparseMatrix::new(3, 2);
        h.insert_col(0, [0, 1, 2].into_iter());
        h.insert_col(1, [0, 1].into_iter());
        assert_eq!(
            SystematicLayout::from_h(&h),
            Err(Error::ParityOverdetermined)
        );
    }
}
