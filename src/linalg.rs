//! Gaussian elimination routines.
//!
//! These work on dense [`ndarray`] matrices over any field (in practice,
//! [`GF2`](crate::gf2::GF2)).

use ndarray::{s, Array2, LinalgScalar};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Error {
    NotInvertible,
}

/// Reduces `[A B]`, with `A` square, to `[I A^{-1}B]`.
pub fn gauss_reduction<A: LinalgScalar + PartialEq>(array: &mut Array2<A>) -> Result<(), Error> {
    let (n, m) = array.dim();
    assert!(n <= m);

    // Reduce to upper triangular with ones on diagonal
    for j in 0..n {
        // Find non-zero element in current column
        let Some(k) = array
            .slice(s![j.., j])
            .iter()
            .enumerate()
            .find_map(|(t, x)| if x.is_zero() { None } else { Some(j + t) })
        else {
            return Err(Error::NotInvertible);
        };

        if k != j {
            // Swap rows j and k
            for t in j..m {
                array.swap([j, t], [k, t]);
            }
        }

        // Make a 1 by dividing
        let x = array[[j, j]];
        if !x.is_one() {
            for t in j..m {
                array[[j, t]] = array[[j, t]] / x;
            }
        }

        // Subtract to rows below to make zeros below diagonal
        for t in (j + 1)..n {
            let x = array[[t, j]];
            if !x.is_zero() {
                for u in j..m {
                    array[[t, u]] = array[[t, u]] - x * array[[j, u]];
                }
            }
        }
    }

    // Reduce to identity
    for j in (0..n).rev() {
        // Subtract to rows above to make zeros above diagonal
        for t in 0..j {
            let x = array[[t, j]];
            if !x.is_zero() {
                for u in j..m {
                    array[[t, u]] = array[[t, u]] - x * array[[j, u]];
                }
            }
        }
    }

    Ok(())
}

/// Brings a matrix to row echelon form visiting the columns in a given order.
///
/// Returns the pivot columns, one per pivot row, in the order in which they
/// were found. The rank of the matrix is the number of pivots.
pub fn row_echelon_pivots<A, I>(array: &mut Array2<A>, columns: I) -> Vec<usize>
where
    A: LinalgScalar + PartialEq,
    I: IntoIterator<Item = usize>,
{
    let (n, m) = array.dim();
    let mut pivots = Vec::with_capacity(n);
    for j in columns {
        let k = pivots.len();
        if k == n {
            break;
        }
        // Find non-zero element in current column, at or below row k
        let Some(s) = (k..n).find(|&t| !array[[t, j]].is_zero()) else {
            continue;
        };
        if s != k {
            for t in 0..m {
                array.swap([k, t], [s, t]);
            }
        }
        let x = array[[k, j]];
        if !x.is_one() {
            for t in 0..m {
                array[[k, t]] = array[[k, t]] / x;
            }
        }
        for t in (k + 1)..n {
            let x = array[[t, j]];
            if !x.is_zero() {
                for u in 0..m {
                    array[[t, u]] = array[[t, u]] - x * array[[k, u]];
                }
            }
        }
        pivots.push(j);
    }
    pivots
}
