//! Tanner graph.
//!
//! The Tanner graph of a parity check matrix is the bipartite graph whose
//! variable nodes are the columns of the matrix, whose check nodes are the
//! rows, and whose edges are the entries equal to one.
//!
//! [`TannerGraph`] stores both adjacency sides as flat index arrays addressed
//! by node number, in the style of a compressed sparse row matrix. Edges are
//! numbered in check order: the edges of check `c` are the contiguous range
//! [`TannerGraph::check_edges`]. Each variable node keeps, for every incident
//! edge, both the neighbouring check and the edge number, so that per-edge
//! decoder messages can be addressed from either side without searching.

use crate::sparse::SparseMatrix;
use std::ops::Range;
use thiserror::Error;

/// Tanner graph construction error.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Error)]
pub enum Error {
    /// The parity check matrix has no rows or no columns.
    #[error("the parity check matrix is empty")]
    Empty,
    /// A column of the parity check matrix has no ones.
    #[error("variable node {0} is not connected to any check node")]
    IsolatedVariable(usize),
    /// A row of the parity check matrix has no ones.
    #[error("check node {0} is not connected to any variable node")]
    IsolatedCheck(usize),
}

/// Tanner graph of an LDPC code.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TannerGraph {
    check_offsets: Box<[usize]>,
    check_vars: Box<[usize]>,
    var_offsets: Box<[usize]>,
    var_checks: Box<[usize]>,
    var_edges: Box<[usize]>,
    max_check_degree: usize,
    max_var_degree: usize,
}

impl TannerGraph {
    /// Builds the Tanner graph of a parity check matrix.
    ///
    /// The neighbours of each check node are stored in the order in which the
    /// matrix lists them, and the neighbours of each variable node in
    /// increasing order. An error is returned if the matrix has a row or a
    /// column without ones, since such a node cannot take part in message
    /// passing.
    pub fn from_h(h: &SparseMatrix) -> Result<TannerGraph, Error> {
        let num_checks = h.num_rows();
        let num_vars = h.num_cols();
        if num_checks == 0 || num_vars == 0 {
            return Err(Error::Empty);
        }
        if let Some(c) = (0..num_checks).find(|&c| h.row_weight(c) == 0) {
            return Err(Error::IsolatedCheck(c));
        }
        if let Some(v) = (0..num_vars).find(|&v| h.col_weight(v) == 0) {
            return Err(Error::IsolatedVariable(v));
        }

        let mut check_offsets = Vec::with_capacity(num_checks + 1);
        let mut check_vars = Vec::new();
        check_offsets.push(0);
        for c in 0..num_checks {
            check_vars.extend(h.iter_row(c).copied());
            check_offsets.push(check_vars.len());
        }

        let mut var_offsets = Vec::with_capacity(num_vars + 1);
        var_offsets.push(0);
        for v in 0..num_vars {
            var_offsets.push(var_offsets[v] + h.col_weight(v));
        }

        // The variable side is filled by visiting the edges in check order, so
        // the checks of each variable end up sorted.
        let num_edges = check_vars.len();
        let mut var_checks = vec![0; num_edges];
        let mut var_edges = vec![0; num_edges];
        let mut next = var_offsets[..num_vars].to_vec();
        for c in 0..num_checks {
            for e in check_offsets[c]..check_offsets[c + 1] {
                let v = check_vars[e];
                var_checks[next[v]] = c;
                var_edges[next[v]] = e;
                next[v] += 1;
            }
        }

        let max_check_degree = (0..num_checks).map(|c| h.row_weight(c)).max().unwrap_or(0);
        let max_var_degree = (0..num_vars).map(|v| h.col_weight(v)).max().unwrap_or(0);
        log::debug!(
            "built Tanner graph with {} variable nodes, {} check nodes and {} edges \
             (max variable degree {}, max check degree {})",
            num_vars,
            num_checks,
            check_vars.len(),
            max_var_degree,
            max_check_degree
        );

        Ok(TannerGraph {
            check_offsets: check_offsets.into_boxed_slice(),
            check_vars: check_vars.into_boxed_slice(),
            var_offsets: var_offsets.into_boxed_slice(),
            var_checks: var_checks.into_boxed_slice(),
            var_edges: var_edges.into_boxed_slice(),
            max_check_degree,
            max_var_degree,
        })
    }

    /// Returns the number of variable nodes (the codeword length).
    pub fn num_variables(&self) -> usize {
        self.var_offsets.len() - 1
    }

    /// Returns the number of check nodes.
    pub fn num_checks(&self) -> usize {
        self.check_offsets.len() - 1
    }

    /// Returns the number of edges.
    pub fn num_edges(&self) -> usize {
        self.check_vars.len()
    }

    /// Returns the degree of a check node.
    pub fn check_degree(&self, check: usize) -> usize {
        self.check_offsets[check + 1] - self.check_offsets[check]
    }

    /// Returns the degree of a variable node.
    pub fn variable_degree(&self, var: usize) -> usize {
        self.var_offsets[var + 1] - self.var_offsets[var]
    }

    /// Returns the maximum check node degree.
    pub fn max_check_degree(&self) -> usize {
        self.max_check_degree
    }

    /// Returns the maximum variable node degree.
    pub fn max_variable_degree(&self) -> usize {
        self.max_var_degree
    }

    /// Returns the range of edge numbers of a check node.
    pub fn check_edges(&self, check: usize) -> Range<usize> {
        self.check_offsets[check]..self.check_offsets[check + 1]
    }

    /// Returns the variable nodes connected to a check node.
    ///
    /// The variable connected through edge `e` of the check is element
    /// `e - check_edges(check).start` of this slice.
    pub fn check_neighbours(&self, check: usize) -> &[usize] {
        &self.check_vars[self.check_edges(check)]
    }

    /// Returns the variable node at the end of an edge.
    pub fn edge_variable(&self, edge: usize) -> usize {
        self.check_vars[edge]
    }

    /// Returns the check nodes connected to a variable node.
    pub fn variable_neighbours(&self, var: usize) -> &[usize] {
        &self.var_checks[self.var_offsets[var]..self.var_offsets[var + 1]]
    }

    /// Returns the edge numbers of a variable node.
    ///
    /// The order matches [`TannerGraph::variable_neighbours`].
    pub fn variable_edges(&self, var: usize) -> &[usize] {
        &self.var_edges[self.var_offsets[var]..self.var_offsets[var + 1]]
    }

    /// Checks if a hard decision satisfies all the parity checks.
    ///
    /// `values` contains one value per variable node, and `hard_decision`
    /// returns `true` for the values that decide a one.
    pub fn parity_satisfied<T, F>(&self, values: &[T], hard_decision: F) -> bool
    where
        T: Copy,
        F: Fn(T) -> bool,
    {
        (0..self.num_checks()).all(|c| {
            self.check_neighbours(c)
                .iter()
                .filter(|&&v| hard_decision(values[v]))
                .count()
                % 2
                == 0
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn johnson_h() -> SparseMatrix {
        // Example 2.5 in Sarah J. Johnson - Iterative Error Correction
        let mut h = SparseMatrix::new(4, 6);
        h.insert_row(0, [0, 1, 3].iter());
        h.insert_row(1, [1, 2, 4].iter());
        h.insert_row(2, [0, 4, 5].iter());
        h.insert_row(3, [2, 3, 5].iter());
        h
    }

    #[test]
    fn adjacency() {
        let h = johnson_h();
        let g = TannerGraph::from_h(&h).unwrap();
        assert_eq!(g.num_variables(), 6);
        assert_eq!(g.num_checks(), 4);
        assert_eq!(g.num_edges(), 12);
        assert_eq!(g.max_check_degree(), 3);
        assert_eq!(g.max_variable_degree(), 2);
        assert_eq!(g.check_neighbours(2), &[0, 4, 5]);
        assert_eq!(g.check_edges(2), 6..9);
        assert_eq!(g.variable_neighbours(4), &[1, 2]);
        assert_eq!(g.variable_degree(4), 2);
    }

    #[test]
    fn edges_consistent() {
        let g = TannerGraph::from_h(&johnson_h()).unwrap();
        let mut seen = vec![0; g.num_edges()];
        for v in 0..g.num_variables() {
            for (&c, &e) in g.variable_neighbours(v).iter().zip(g.variable_edges(v)) {
                assert!(g.check_edges(c).contains(&e));
                assert_eq!(g.edge_variable(e), v);
                seen[e] += 1;
            }
        }
        // every edge appears exactly once on the variable side
        assert!(seen.iter().all(|&n| n == 1));
    }

    #[test]
    fn isolated_nodes() {
        let mut h = SparseMatrix::new(2, 3);
        h.insert_row(0, [0, 1].iter());
        assert_eq!(TannerGraph::from_h(&h), Err(Error::IsolatedCheck(1)));
        h.insert(1, 1);
        assert_eq!(TannerGraph::from_h(&h), Err(Error::IsolatedVariable(2)));
        h.insert(1, 2);
        assert!(TannerGraph::from_h(&h).is_ok());
        assert_eq!(
            TannerGraph::from_h(&SparseMatrix::new(0, 0)),
            Err(Error::Empty)
        );
    }

    #[test]
    fn parity() {
        let g = TannerGraph::from_h(&johnson_h()).unwrap();
        assert!(g.parity_satisfied(&[0u8, 0, 1, 0, 1, 1], |b| b == 1));
        assert!(!g.parity_satisfied(&[0u8, 0, 1, 0, 1, 0], |b| b == 1));
        assert!(g.parity_satisfied(&[1.0, 1.0, -1.0, 1.0, -2.0, -0.5], |x: f64| x <= 0.0));
    }
}
