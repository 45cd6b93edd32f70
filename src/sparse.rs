//! # Sparse binary matrix representation and functions
//!
//! This module implements a representation for sparse binary matrices based on
//! the alist format used to handle LDPC parity check matrices, together with
//! a validating alist parser.

use std::borrow::Borrow;
use std::slice::Iter;
use thiserror::Error;

/// Alist parsing error.
///
/// These errors are reported when the textual description of a parity check
/// matrix is malformed.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Error)]
pub enum Error {
    /// A line that the alist layout requires is missing.
    #[error("alist {0} not found")]
    MissingLine(&'static str),
    /// A line does not contain enough values.
    #[error("alist {0} does not contain enough elements")]
    MissingValue(&'static str),
    /// A token could not be parsed as a non-negative integer.
    #[error("{what} is not a number: {token:?}")]
    NotANumber {
        /// Description of the value being parsed.
        what: &'static str,
        /// Offending token.
        token: String,
    },
    /// A weight list does not have one entry per row or column.
    #[error("{what} list has {found} entries, expected {expected}")]
    WeightCount {
        /// Which weight list.
        what: &'static str,
        /// Number of rows or columns.
        expected: usize,
        /// Number of entries found.
        found: usize,
    },
    /// The maximum weight in the second line does not match the weight list.
    #[error("declared maximum {what} weight {declared} does not match actual maximum {actual}")]
    MaxWeight {
        /// Which maximum weight.
        what: &'static str,
        /// Value in the alist header.
        declared: usize,
        /// Maximum of the weight list.
        actual: usize,
    },
    /// An index list does not match its declared weight.
    #[error("{what} {index} has {found} entries but its declared weight is {declared}")]
    Weight {
        /// Row or column.
        what: &'static str,
        /// Row or column number (zero-based).
        index: usize,
        /// Declared weight.
        declared: usize,
        /// Number of entries found.
        found: usize,
    },
    /// An index is outside of the matrix.
    #[error("{what} index {value} out of range (the matrix has {bound} {what}s)")]
    IndexOutOfRange {
        /// Row or column.
        what: &'static str,
        /// Index value as written in the alist.
        value: usize,
        /// Number of rows or columns.
        bound: usize,
    },
    /// The same entry appears twice in a row or column list.
    #[error("duplicate entry at row {row}, column {col}")]
    DuplicateEntry {
        /// Row (zero-based).
        row: usize,
        /// Column (zero-based).
        col: usize,
    },
    /// The row lists describe a different matrix than the column lists.
    #[error("row lists are inconsistent with column lists at row {row}, column {col}")]
    Inconsistent {
        /// Row (zero-based).
        row: usize,
        /// Column (zero-based).
        col: usize,
    },
    /// There is non-blank data after the last row list.
    #[error("unexpected trailing data after the row lists")]
    TrailingData,
}

/// A [`Result`] type containing an alist [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Index convention of an alist description.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum Indexing {
    /// Indices start at one. A zero is MacKay padding for irregular codes.
    #[default]
    OneBased,
    /// Indices start at zero. Padding is not allowed.
    ZeroBased,
}

/// A sparse binary matrix
///
/// The internal representation for this matrix is based on the alist format.
#[derive(Eq, Debug, Clone)]
pub struct SparseMatrix {
    rows: Vec<Vec<usize>>,
    cols: Vec<Vec<usize>>,
}

impl PartialEq for SparseMatrix {
    fn eq(&self, other: &SparseMatrix) -> bool {
        if self.num_rows() != other.num_rows() || self.num_cols() != other.num_cols() {
            return false;
        }
        self.rows.iter().zip(other.rows.iter()).all(|(r1, r2)| {
            let mut r1 = r1.clone();
            let mut r2 = r2.clone();
            r1.sort_unstable();
            r2.sort_unstable();
            r1 == r2
        })
    }
}

impl SparseMatrix {
    /// Create a new sparse matrix of a given size
    ///
    /// The matrix is inizialized to the zero matrix.
    ///
    /// # Examples
    /// ```
    /// # use ldpc_codec::sparse::SparseMatrix;
    /// let h = SparseMatrix::new(10, 30);
    /// assert_eq!(h.num_rows(), 10);
    /// assert_eq!(h.num_cols(), 30);
    /// ```
    pub fn new(nrows: usize, ncols: usize) -> SparseMatrix {
        use std::iter::repeat_with;
        let rows = repeat_with(Vec::new).take(nrows).collect();
        let cols = repeat_with(Vec::new).take(ncols).collect();
        SparseMatrix { rows, cols }
    }

    /// Returns the number of rows of the matrix
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Returns the number of columns of the matrix
    pub fn num_cols(&self) -> usize {
        self.cols.len()
    }

    /// Returns the row weight of `row`
    ///
    /// The row weight is defined as the number of entries equal to
    /// one in a particular row. Rows are indexed starting by zero.
    pub fn row_weight(&self, row: usize) -> usize {
        self.rows[row].len()
    }

    /// Returns the column weight of `column`
    ///
    /// The column weight is defined as the number of entries equal to
    /// one in a particular column. Columns are indexed starting by zero.
    pub fn col_weight(&self, col: usize) -> usize {
        self.cols[col].len()
    }

    /// Returns `true` if the entry corresponding to a particular
    /// row and column is a one
    pub fn contains(&self, row: usize, col: usize) -> bool {
        // typically columns are shorter, so we search in the column
        self.cols[col].contains(&row)
    }

    /// Inserts a one in a particular row and column.
    ///
    /// If there is already a one in this row and column, this function does
    /// nothing.
    ///
    /// # Examples
    /// ```
    /// # use ldpc_codec::sparse::SparseMatrix;
    /// let mut h = SparseMatrix::new(10, 30);
    /// assert!(!h.contains(3, 7));
    /// h.insert(3, 7);
    /// assert!(h.contains(3, 7));
    /// ```
    pub fn insert(&mut self, row: usize, col: usize) {
        if !self.contains(row, col) {
            self.rows[row].push(col);
            self.cols[col].push(row);
        }
    }

    /// Inserts ones in particular columns of a row
    ///
    /// This effect is as calling `insert()` on each of the elements
    /// of the iterator `cols`.
    ///
    /// # Examples
    /// ```
    /// # use ldpc_codec::sparse::SparseMatrix;
    /// let mut h1 = SparseMatrix::new(10, 30);
    /// let mut h2 = SparseMatrix::new(10, 30);
    /// let c = vec![3, 7, 9];
    /// h1.insert_row(0, c.iter());
    /// for a in &c {
    ///     h2.insert(0, *a);
    /// }
    /// assert_eq!(h1, h2);
    /// ```
    pub fn insert_row<T, S>(&mut self, row: usize, cols: T)
    where
        T: Iterator<Item = S>,
        S: Borrow<usize>,
    {
        for col in cols {
            self.insert(row, *col.borrow());
        }
    }

    /// Inserts ones in a particular rows of a column
    ///
    /// This works like `insert_row()`.
    pub fn insert_col<T, S>(&mut self, col: usize, rows: T)
    where
        T: Iterator<Item = S>,
        S: Borrow<usize>,
    {
        for row in rows {
            self.insert(*row.borrow(), col);
        }
    }

    /// Returns an [Iterator] over the entries equal to one
    /// in a particular row
    pub fn iter_row(&self, row: usize) -> Iter<'_, usize> {
        self.rows[row].iter()
    }

    /// Returns an [Iterator] over the entries equal to one
    /// in a particular column
    pub fn iter_col(&self, col: usize) -> Iter<'_, usize> {
        self.cols[col].iter()
    }

    /// Returns an [Iterator] over the `(row, column)` indices of all the
    /// entries equal to one.
    pub fn iter_all(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(j, r)| r.iter().map(move |&k| (j, k)))
    }

    /// Computes the syndrome of a word.
    ///
    /// The word is given as one byte per bit (any nonzero byte counts as a
    /// one). The syndrome has one entry per row, equal to the parity of the
    /// bits selected by that row.
    ///
    /// # Panics
    ///
    /// Panics if `bits` is shorter than the number of columns.
    pub fn syndrome(&self, bits: &[u8]) -> Vec<u8> {
        self.rows
            .iter()
            .map(|row| u8::from(row.iter().filter(|&&c| bits[c] != 0).count() % 2 == 1))
            .collect()
    }

    /// Returns `true` if the word satisfies all the parity checks.
    pub fn is_codeword(&self, bits: &[u8]) -> bool {
        self.syndrome(bits).iter().all(|&s| s == 0)
    }

    fn write_alist_maybe_padding<W: std::fmt::Write>(
        &self,
        w: &mut W,
        use_padding: bool,
    ) -> std::fmt::Result {
        writeln!(w, "{} {}", self.num_cols(), self.num_rows())?;
        let directions = [&self.cols, &self.rows];
        let mut max_weights = [0, 0];
        for (dir, max) in directions.iter().zip(max_weights.iter_mut()) {
            *max = dir.iter().map(|el| el.len()).max().unwrap_or(0);
        }
        writeln!(w, "{} {}", max_weights[0], max_weights[1])?;
        for dir in directions.iter() {
            let weights = dir
                .iter()
                .map(|el| el.len().to_string())
                .collect::<Vec<_>>();
            writeln!(w, "{}", weights.join(" "))?;
        }
        for (dir, &max) in directions.iter().zip(max_weights.iter()) {
            for el in dir.iter() {
                let mut v = el.clone();
                v.sort_unstable();
                let mut entries = v.iter().map(|x| (x + 1).to_string()).collect::<Vec<_>>();
                if use_padding {
                    entries.resize(max.max(1), String::from("0"));
                }
                writeln!(w, "{}", entries.join(" "))?;
            }
        }
        Ok(())
    }

    /// Writes the matrix in alist format to a writer.
    ///
    /// This function includes zeros as padding for irregular codes, as
    /// originally defined by MacKay.
    ///
    /// # Errors
    /// If a call to `write!()` returns an error, this function returns
    /// such an error.
    pub fn write_alist<W: std::fmt::Write>(&self, w: &mut W) -> std::fmt::Result {
        self.write_alist_maybe_padding(w, true)
    }

    /// Writes the matrix in alist format to a writer, without zero padding.
    pub fn write_alist_no_padding<W: std::fmt::Write>(&self, w: &mut W) -> std::fmt::Result {
        self.write_alist_maybe_padding(w, false)
    }

    /// Returns a [`String`] with the alist representation of the matrix.
    pub fn alist(&self) -> String {
        let mut s = String::new();
        self.write_alist(&mut s)
            .expect("writing to a String cannot fail");
        s
    }

    /// Returns a [`String`] with the alist representation of the matrix
    /// without zero padding.
    pub fn alist_no_padding(&self) -> String {
        let mut s = String::new();
        self.write_alist_no_padding(&mut s)
            .expect("writing to a String cannot fail");
        s
    }

    /// Constructs and returns a sparse matrix from its alist representation.
    ///
    /// The indices in the alist are one-based, which is the usual
    /// convention. Zeros used as padding for irregular codes are accepted.
    ///
    /// # Errors
    /// An [`Error`] describing the first problem found is returned if `alist`
    /// is not a valid alist description.
    pub fn from_alist(alist: &str) -> Result<SparseMatrix> {
        SparseMatrix::from_alist_with(alist, Indexing::OneBased)
    }

    /// Constructs a sparse matrix from an alist with the given index
    /// convention.
    ///
    /// Both the column lists and the row lists are parsed. The matrix is built
    /// from the column lists and the row lists are checked against it.
    pub fn from_alist_with(alist: &str, indexing: Indexing) -> Result<SparseMatrix> {
        let mut lines = alist
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .peekable();

        let mut sizes = lines
            .next()
            .ok_or(Error::MissingLine("first line"))?
            .split_whitespace();
        let ncols = parse_number(
            sizes.next().ok_or(Error::MissingValue("first line"))?,
            "ncols",
        )?;
        let nrows = parse_number(
            sizes.next().ok_or(Error::MissingValue("first line"))?,
            "nrows",
        )?;

        let mut max_weights = lines
            .next()
            .ok_or(Error::MissingLine("maximum weights line"))?
            .split_whitespace();
        let max_col_weight = parse_number(
            max_weights
                .next()
                .ok_or(Error::MissingValue("maximum weights line"))?,
            "maximum column weight",
        )?;
        let max_row_weight = parse_number(
            max_weights
                .next()
                .ok_or(Error::MissingValue("maximum weights line"))?,
            "maximum row weight",
        )?;

        let col_weights = parse_weights(
            lines.next().ok_or(Error::MissingLine("column weights line"))?,
            "column weight",
            ncols,
        )?;
        let row_weights = parse_weights(
            lines.next().ok_or(Error::MissingLine("row weights line"))?,
            "row weight",
            nrows,
        )?;
        check_max_weight(&col_weights, max_col_weight, "column")?;
        check_max_weight(&row_weights, max_row_weight, "row")?;

        let mut h = SparseMatrix::new(nrows, ncols);
        for (col, &weight) in col_weights.iter().enumerate() {
            let line = next_index_line(&mut lines, weight, indexing, "column index line")?;
            let rows = parse_indices(line, indexing, "row", nrows)?;
            check_weight(rows.len(), weight, "column", col)?;
            for row in rows {
                if h.contains(row, col) {
                    return Err(Error::DuplicateEntry { row, col });
                }
                h.insert(row, col);
            }
        }

        for (row, &weight) in row_weights.iter().enumerate() {
            let line = next_index_line(&mut lines, weight, indexing, "row index line")?;
            let cols = parse_indices(line, indexing, "column", ncols)?;
            check_weight(cols.len(), weight, "row", row)?;
            let mut seen = Vec::with_capacity(cols.len());
            for col in cols {
                if seen.contains(&col) {
                    return Err(Error::DuplicateEntry { row, col });
                }
                if !h.contains(row, col) {
                    return Err(Error::Inconsistent { row, col });
                }
                seen.push(col);
            }
            if seen.len() != h.row_weight(row) {
                // some entry of the columns is missing from this row
                let col = h
                    .iter_row(row)
                    .copied()
                    .find(|c| !seen.contains(c))
                    .unwrap_or_default();
                return Err(Error::Inconsistent { row, col });
            }
        }

        if lines.next().is_some() {
            return Err(Error::TrailingData);
        }
        Ok(h)
    }
}

// Returns the index line of a row or column. Lists of degree-0 nodes are
// blank lines (filtered out before reaching here) unless they are written as
// MacKay padding, which is only possible with one-based indices.
fn next_index_line<'a, I>(
    lines: &mut std::iter::Peekable<I>,
    weight: usize,
    indexing: Indexing,
    what: &'static str,
) -> Result<&'a str>
where
    I: Iterator<Item = &'a str>,
{
    if weight == 0 {
        let padding = indexing == Indexing::OneBased
            && lines
                .peek()
                .is_some_and(|l| l.split_whitespace().all(|t| t == "0"));
        return Ok(if padding {
            lines.next().unwrap_or_default()
        } else {
            ""
        });
    }
    lines.next().ok_or(Error::MissingLine(what))
}

fn parse_number(token: &str, what: &'static str) -> Result<usize> {
    token.parse().map_err(|_| Error::NotANumber {
        what,
        token: token.to_string(),
    })
}

fn parse_weights(line: &str, what: &'static str, expected: usize) -> Result<Vec<usize>> {
    let weights = line
        .split_whitespace()
        .map(|t| parse_number(t, what))
        .collect::<Result<Vec<usize>>>()?;
    if weights.len() != expected {
        return Err(Error::WeightCount {
            what,
            expected,
            found: weights.len(),
        });
    }
    Ok(weights)
}

fn check_max_weight(weights: &[usize], declared: usize, what: &'static str) -> Result<()> {
    let actual = weights.iter().copied().max().unwrap_or(0);
    if actual != declared {
        return Err(Error::MaxWeight {
            what,
            declared,
            actual,
        });
    }
    Ok(())
}

fn check_weight(found: usize, declared: usize, what: &'static str, index: usize) -> Result<()> {
    if found != declared {
        return Err(Error::Weight {
            what,
            index,
            declared,
            found,
        });
    }
    Ok(())
}

// Parses an index line into zero-based indices, dropping MacKay padding.
fn parse_indices(
    line: &str,
    indexing: Indexing,
    what: &'static str,
    bound: usize,
) -> Result<Vec<usize>> {
    let mut indices = Vec::new();
    let mut padding = false;
    for token in line.split_whitespace() {
        let value = parse_number(token, "index")?;
        let index = match indexing {
            Indexing::OneBased if value == 0 => {
                padding = true;
                continue;
            }
            Indexing::OneBased => value - 1,
            Indexing::ZeroBased => value,
        };
        if padding || index >= bound {
            // a non-zero index after padding is as bad as an out of range one
            return Err(Error::IndexOutOfRange { what, value, bound });
        }
        indices.push(index);
    }
    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert() {
        let mut h = SparseMatrix::new(100, 300);
        assert!(!h.contains(27, 154));
        h.insert(27, 154);
        assert!(h.contains(27, 154));
        assert!(!h.contains(28, 154));
    }

    #[test]
    fn test_insert_twice() {
        let mut h = SparseMatrix::new(10, 30);
        h.insert(2, 7);
        let h2 = h.clone();
        h.insert(2, 7);
        assert_eq!(h, h2);
        assert_eq!(h.row_weight(2), 1);
        assert_eq!(h.col_weight(7), 1);
    }

    #[test]
    fn syndrome() {
        let mut h = SparseMatrix::new(2, 4);
        h.insert_row(0, [0, 1, 2].iter());
        h.insert_row(1, [1, 2, 3].iter());
        assert_eq!(h.syndrome(&[1, 0, 1, 1]), vec![0, 0]);
        assert!(h.is_codeword(&[1, 0, 1, 1]));
        assert_eq!(h.syndrome(&[1, 0, 0, 1]), vec![1, 1]);
        assert_eq!(h.syndrome(&[0, 0, 0, 1]), vec![0, 1]);
        assert!(!h.is_codeword(&[0, 0, 0, 1]));
    }

    const REGULAR: &str = "12 4
1 3
1 1 1 1 1 1 1 1 1 1 1 1
3 3 3 3
1
2
3
4
1
2
3
4
1
2
3
4
1 5 9
2 6 10
3 7 11
4 8 12
";

    #[test]
    fn test_alist() {
        let mut h = SparseMatrix::new(4, 12);
        for j in 0..4 {
            h.insert(j, j);
            h.insert(j, j + 4);
            h.insert(j, j + 8);
        }
        assert_eq!(h.alist(), REGULAR);
        let h2 = SparseMatrix::from_alist(REGULAR).unwrap();
        assert_eq!(h2, h);
        assert_eq!(h2.alist(), REGULAR);
    }

    #[test]
    fn test_alist_irregular() {
        let mut h = SparseMatrix::new(4, 12);
        for j in 0..4 {
            h.insert(j, j);
            h.insert(j, j + 4);
            if j < 2 {
                h.insert(j, j + 8);
            }
        }
        let padded = h.alist();
        assert!(padded.ends_with("1 5 9\n2 6 10\n3 7 0\n4 8 0\n"));
        let unpadded = h.alist_no_padding();
        assert!(unpadded.ends_with("1 5 9\n2 6 10\n3 7\n4 8\n"));
        assert_eq!(SparseMatrix::from_alist(&padded).unwrap(), h);
        assert_eq!(SparseMatrix::from_alist(&unpadded).unwrap(), h);
        assert_eq!(SparseMatrix::from_alist(&unpadded).unwrap().alist(), padded);
    }

    #[test]
    fn test_alist_zero_based() {
        let alist = "4 2
2 3
1 2 2 1
3 3
0
0 1
0 1
1
0 1 2
1 2 3
";
        let h = SparseMatrix::from_alist_with(alist, Indexing::ZeroBased).unwrap();
        let mut expected = SparseMatrix::new(2, 4);
        expected.insert_row(0, [0, 1, 2].iter());
        expected.insert_row(1, [1, 2, 3].iter());
        assert_eq!(h, expected);
        // the same text read as one-based has a 0 followed by real indices
        assert!(SparseMatrix::from_alist(alist).is_err());
    }

    #[test]
    fn alist_format_errors() {
        assert_eq!(
            SparseMatrix::from_alist(""),
            Err(Error::MissingLine("first line"))
        );
        assert_eq!(
            SparseMatrix::from_alist("4\n"),
            Err(Error::MissingValue("first line"))
        );
        assert!(matches!(
            SparseMatrix::from_alist("4 x\n"),
            Err(Error::NotANumber { what: "nrows", .. })
        ));
        assert!(matches!(
            SparseMatrix::from_alist("2 1\n1 2\n1 1 1\n2\n1\n1\n1 2\n"),
            Err(Error::WeightCount { expected: 2, found: 3, .. })
        ));
        assert!(matches!(
            SparseMatrix::from_alist("2 1\n2 2\n1 1\n2\n1\n1\n1 2\n"),
            Err(Error::MaxWeight { declared: 2, actual: 1, .. })
        ));
        assert!(matches!(
            SparseMatrix::from_alist("2 1\n1 2\n1 1\n2\n1\n2\n1 2\n"),
            Err(Error::IndexOutOfRange { what: "row", value: 2, bound: 1 })
        ));
        assert!(matches!(
            SparseMatrix::from_alist("2 1\n1 2\n1 1\n2\n1 1\n1\n1 2\n"),
            Err(Error::Weight { what: "column", index: 0, declared: 1, found: 2 })
        ));
        assert_eq!(
            SparseMatrix::from_alist("2 1\n1 2\n1 1\n2\n1\n1\n2 2\n"),
            Err(Error::DuplicateEntry { row: 0, col: 1 })
        );
        assert_eq!(
            SparseMatrix::from_alist("2 2\n1 1\n1 1\n1 1\n1\n2\n2\n1\n"),
            Err(Error::Inconsistent { row: 0, col: 1 })
        );
        assert_eq!(
            SparseMatrix::from_alist("2 1\n1 2\n1 1\n2\n1\n1\n1 2\n7\n"),
            Err(Error::TrailingData)
        );
        assert_eq!(
            SparseMatrix::from_alist("2 1\n1 2\n1 1\n2\n1\n1\n"),
            Err(Error::MissingLine("row index line"))
        );
    }
}
