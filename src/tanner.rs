//! Tanner graph index built from a parity-check matrix.
//!
//! Adjacency is stored in compressed-sparse-row form in both directions:
//! variable `j` owns edge slots `var_offsets[j]..var_offsets[j + 1]`, check
//! `i` owns `check_offsets[i]..check_offsets[i + 1]`. Alongside each adjacency
//! array sits a reciprocal table giving, for every edge, its position inside
//! the neighbour's own list, so a message written by one side can be read by
//! the other without searching.

use crate::{LdpcError, ParityCheckMatrix};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TannerGraph {
    n_vars: usize,
    n_checks: usize,
    var_offsets: Vec<usize>,
    var_adj: Vec<usize>,
    var_to_check_pos: Vec<usize>,
    check_offsets: Vec<usize>,
    check_adj: Vec<usize>,
    check_to_var_pos: Vec<usize>,
}

impl TannerGraph {
    pub fn new(h: &ParityCheckMatrix) -> Self {
        let n_vars = h.cols();
        let n_checks = h.rows();

        let check_offsets = offsets((0..n_checks).map(|i| h.row_weight(i)));
        let var_offsets = offsets((0..n_vars).map(|j| h.col_weight(j)));
        let n_edges = check_offsets[n_checks];

        let mut check_adj = Vec::with_capacity(n_edges);
        for i in 0..n_checks {
            check_adj.extend(h.entries_in_row(i));
        }
        let mut var_adj = Vec::with_capacity(n_edges);
        for j in 0..n_vars {
            var_adj.extend(h.entries_in_col(j));
        }

        // Walking checks in ascending order visits each variable's checks in
        // ascending order too, so a per-variable cursor gives the reciprocal
        // positions in one pass.
        let mut var_to_check_pos = vec![0; n_edges];
        let mut check_to_var_pos = vec![0; n_edges];
        let mut cursor = vec![0usize; n_vars];
        for i in 0..n_checks {
            for (k, e) in (check_offsets[i]..check_offsets[i + 1]).enumerate() {
                let j = check_adj[e];
                let pos = cursor[j];
                cursor[j] += 1;
                check_to_var_pos[e] = pos;
                var_to_check_pos[var_offsets[j] + pos] = k;
            }
        }

        Self {
            n_vars,
            n_checks,
            var_offsets,
            var_adj,
            var_to_check_pos,
            check_offsets,
            check_adj,
            check_to_var_pos,
        }
    }

    /// Validate dense 0/1 rows and build the graph in one step.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, LdpcError> {
        Ok(Self::new(&ParityCheckMatrix::from_rows(rows)?))
    }

    pub fn num_vars(&self) -> usize {
        self.n_vars
    }

    pub fn num_checks(&self) -> usize {
        self.n_checks
    }

    pub fn num_edges(&self) -> usize {
        self.check_adj.len()
    }

    /// Ascending check indices incident to variable `j`.
    pub fn var_neighbors(&self, j: usize) -> &[usize] {
        &self.var_adj[self.var_range(j)]
    }

    /// Ascending variable indices incident to check `i`.
    pub fn check_neighbors(&self, i: usize) -> &[usize] {
        &self.check_adj[self.check_range(i)]
    }

    /// `var_to_check_index(j)[k]` is the position of `j` inside
    /// `check_neighbors(var_neighbors(j)[k])`.
    pub fn var_to_check_index(&self, j: usize) -> &[usize] {
        &self.var_to_check_pos[self.var_range(j)]
    }

    /// `check_to_var_index(i)[k]` is the position of `i` inside
    /// `var_neighbors(check_neighbors(i)[k])`.
    pub fn check_to_var_index(&self, i: usize) -> &[usize] {
        &self.check_to_var_pos[self.check_range(i)]
    }

    pub fn var_degree(&self, j: usize) -> usize {
        self.var_offsets[j + 1] - self.var_offsets[j]
    }

    pub fn check_degree(&self, i: usize) -> usize {
        self.check_offsets[i + 1] - self.check_offsets[i]
    }

    /// Flat edge slots owned by variable `j` (V2C layout).
    pub fn var_range(&self, j: usize) -> std::ops::Range<usize> {
        self.var_offsets[j]..self.var_offsets[j + 1]
    }

    /// Flat edge slots owned by check `i` (C2V layout).
    pub fn check_range(&self, i: usize) -> std::ops::Range<usize> {
        self.check_offsets[i]..self.check_offsets[i + 1]
    }

    /// For the V2C slot `e` of variable `j` pointing at check `c`, the C2V
    /// slot of the same edge as seen from `c`.
    #[inline]
    pub(crate) fn var_edge_to_check_edge(&self, var_edge: usize) -> usize {
        self.check_offsets[self.var_adj[var_edge]] + self.var_to_check_pos[var_edge]
    }

    /// For the C2V slot `e` of check `i` pointing at variable `v`, the V2C
    /// slot of the same edge as seen from `v`.
    #[inline]
    pub(crate) fn check_edge_to_var_edge(&self, check_edge: usize) -> usize {
        self.var_offsets[self.check_adj[check_edge]] + self.check_to_var_pos[check_edge]
    }

    /// All edges as `(variable, check)` pairs, in check-major order.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        (0..self.n_checks)
            .flat_map(|i| self.check_neighbors(i).iter().map(move |&j| (j, i)))
            .collect()
    }

    /// `H · bits mod 2` computed over the check adjacency.
    pub fn syndrome(&self, bits: &[u8]) -> Result<Vec<u8>, LdpcError> {
        if bits.len() != self.n_vars {
            return Err(LdpcError::DimensionMismatch {
                expected: self.n_vars,
                actual: bits.len(),
            });
        }
        Ok((0..self.n_checks)
            .map(|i| self.check_parity(i, bits))
            .collect())
    }

    pub(crate) fn check_parity(&self, i: usize, bits: &[u8]) -> u8 {
        self.check_neighbors(i)
            .iter()
            .fold(0u8, |acc, &j| acc ^ (bits[j] & 1))
    }

    pub(crate) fn syndrome_is_zero(&self, bits: &[u8]) -> bool {
        (0..self.n_checks).all(|i| self.check_parity(i, bits) == 0)
    }
}

fn offsets(degrees: impl Iterator<Item = usize>) -> Vec<usize> {
    let mut offsets = vec![0];
    let mut total = 0;
    for d in degrees {
        total += d;
        offsets.push(total);
    }
    offsets
}
