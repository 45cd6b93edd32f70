#![allow(dead_code)]

use ldpc_codec::sparse::SparseMatrix;

// rows {0, 1, 2} and {1, 2, 3}
pub const SMALL_ALIST: &str = "4 2
2 3
1 2 2 1
3 3
1
1 2
1 2
2
1 2 3
2 3 4
";

/// Rate 1/2 code with a quasi-cyclic information part and a staircase parity
/// part.
///
/// The information column `j` has ones in rows `j`, `j + 17` and `j + 41`
/// (modulo `m`), and the parity column `m + j` has ones in rows `j` and `j + 1`.
/// The code has girth at least 6 for `m = 64`.
pub fn staircase_code(m: usize) -> SparseMatrix {
    let mut h = SparseMatrix::new(m, 2 * m);
    for j in 0..m {
        h.insert_col(j, [j, (j + 17) % m, (j + 41) % m].iter());
        h.insert(j, m + j);
        if j + 1 < m {
            h.insert(j + 1, m + j);
        }
    }
    h
}

/// Permutes the columns of a matrix, placing old column `perm(j)` in column
/// `j`.
pub fn permute_columns(h: &SparseMatrix, perm: impl Fn(usize) -> usize) -> SparseMatrix {
    let mut h_new = SparseMatrix::new(h.num_rows(), h.num_cols());
    for j in 0..h.num_cols() {
        h_new.insert_col(j, h.iter_col(perm(j)));
    }
    h_new
}

/// Noiseless LLRs of a codeword.
pub fn noiseless_llrs(bits: &[u8], magnitude: f64) -> Vec<f64> {
    bits.iter()
        .map(|&b| if b == 0 { magnitude } else { -magnitude })
        .collect()
}
