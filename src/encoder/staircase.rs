use crate::sparse::SparseMatrix;

/// Checks if the parity part of `h` is a staircase.
///
/// The parity part is formed by the last `m` columns of the `m x n` matrix
/// `h`. It is a staircase if it has ones exactly on its main diagonal and on
/// the diagonal below it.
pub fn is_staircase(h: &SparseMatrix) -> bool {
    let m = h.num_rows();
    let k = h.num_cols() - m;
    if m == 0 {
        return false;
    }
    let mut ones = 0;
    for (row, col) in h.iter_all().filter(|&(_, col)| col >= k) {
        let diagonal = col - k == row;
        let below = col - k + 1 == row;
        if !diagonal && !below {
            return false;
        }
        ones += 1;
    }
    ones == 2 * m - 1
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn staircase() {
        let mut h = SparseMatrix::new(3, 5);
        assert!(!is_staircase(&h));
        h.insert(0, 2);
        h.insert(1, 2);
        h.insert(1, 3);
        h.insert(2, 3);
        assert!(!is_staircase(&h));
        h.insert(2, 4);
        assert!(is_staircase(&h));
        // ones in the information part do not matter
        h.insert(0, 0);
        h.insert(2, 1);
        assert!(is_staircase(&h));
        h.insert(0, 3);
        assert!(!is_staircase(&h));
    }
}
