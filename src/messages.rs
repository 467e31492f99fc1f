use crate::TannerGraph;

/// Edge-indexed soft messages for one decode call.
///
/// `v2c` follows the variable-major edge layout of the graph and `c2v` the
/// check-major one, so each node reads and writes a contiguous slice. Both
/// start at 0.0, meaning "no information".
#[derive(Debug, Clone, PartialEq)]
pub struct MessageStore {
    v2c: Vec<f64>,
    c2v: Vec<f64>,
}

impl MessageStore {
    pub fn new(graph: &TannerGraph) -> Self {
        Self {
            v2c: vec![0.0; graph.num_edges()],
            c2v: vec![0.0; graph.num_edges()],
        }
    }

    pub fn num_edges(&self) -> usize {
        self.v2c.len()
    }

    /// Messages sent by variable `j`, indexed like `graph.var_neighbors(j)`.
    pub fn var_to_check<'a>(&'a self, graph: &TannerGraph, j: usize) -> &'a [f64] {
        &self.v2c[graph.var_range(j)]
    }

    /// Messages sent by check `i`, indexed like `graph.check_neighbors(i)`.
    pub fn check_to_var<'a>(&'a self, graph: &TannerGraph, i: usize) -> &'a [f64] {
        &self.c2v[graph.check_range(i)]
    }

    /// The whole V2C array, variable-major.
    pub fn v2c(&self) -> &[f64] {
        &self.v2c
    }

    /// The whole C2V array, check-major.
    pub fn c2v(&self) -> &[f64] {
        &self.c2v
    }

    /// Split borrow for the variable-node phase: read C2V, write V2C.
    pub(crate) fn variable_phase(&mut self) -> (&[f64], &mut [f64]) {
        (&self.c2v, &mut self.v2c)
    }

    /// Split borrow for the check-node phase: read V2C, write C2V.
    pub(crate) fn check_phase(&mut self) -> (&[f64], &mut [f64]) {
        (&self.v2c, &mut self.c2v)
    }
}
