//! Random (dv, dc)-regular parity-check matrices.
//!
//! Construction follows the socket model: every variable gets `dv` sockets,
//! the sockets are shuffled and dealt to the checks `dc` at a time. Repeated
//! edges and, on request, cycles of length four are then removed with
//! degree-preserving swaps, so the result is always exactly regular.

use crate::{LdpcError, ParityCheckMatrix, TannerGraph};
use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const REPAIR_ATTEMPTS_PER_SOCKET: usize = 100;
const CYCLE_ATTEMPTS_PER_SOCKET: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegularCodeParams {
    /// Number of variables (code length).
    pub n: usize,
    /// Checks per variable (column weight).
    pub dv: usize,
    /// Variables per check (row weight).
    pub dc: usize,
    pub seed: u64,
    pub no_4cycle: bool,
}

impl Default for RegularCodeParams {
    fn default() -> Self {
        Self::new(100, 3, 6)
    }
}

impl RegularCodeParams {
    pub fn new(n: usize, dv: usize, dc: usize) -> Self {
        Self {
            n,
            dv,
            dc,
            seed: 0,
            no_4cycle: false,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_no_4cycle(mut self, no_4cycle: bool) -> Self {
        self.no_4cycle = no_4cycle;
        self
    }

    /// Number of checks, `m = n·dv / dc`.
    pub fn num_checks(&self) -> Result<usize, LdpcError> {
        if self.n == 0 || self.dv == 0 || self.dc == 0 {
            return Err(LdpcError::InvalidParameter(
                "n, dv and dc must all be > 0".to_string(),
            ));
        }
        let edges = self.n.checked_mul(self.dv).ok_or_else(|| {
            LdpcError::InvalidParameter(format!(
                "n * dv overflows: n={}, dv={}",
                self.n, self.dv
            ))
        })?;
        if edges % self.dc != 0 {
            return Err(LdpcError::InvalidDegreeSequence {
                n: self.n,
                dv: self.dv,
                dc: self.dc,
            });
        }
        Ok(edges / self.dc)
    }

    pub fn validate(&self) -> Result<usize, LdpcError> {
        let m = self.num_checks()?;

        if self.dv > m {
            return Err(LdpcError::InvalidParameter(format!(
                "Checks per bit ({}) is greater than total checks ({})",
                self.dv, m
            )));
        }

        if self.no_4cycle && self.dv == m && self.dv > 1 && self.n > 1 {
            return Err(LdpcError::InvalidParameter(
                "Can't eliminate cycles of length four with this many checks per bit".to_string(),
            ));
        }

        Ok(m)
    }
}

/// Generate a (dv, dc)-regular parity-check matrix.
///
/// The same parameters (seed included) always give the same matrix.
pub fn generate_regular(params: &RegularCodeParams) -> Result<ParityCheckMatrix, LdpcError> {
    let m = params.validate()?;
    let (n, dv, dc) = (params.n, params.dv, params.dc);

    let rng_seed = params.seed.wrapping_mul(10).wrapping_add(1);
    let mut rng = ChaCha8Rng::seed_from_u64(rng_seed);

    // Socket s belongs to check s / dc and holds the variable sockets[s]
    let mut sockets: Vec<usize> = (0..n)
        .flat_map(|j| std::iter::repeat(j).take(dv))
        .collect();
    sockets.shuffle(&mut rng);

    let repaired = repair_repeated_edges(&mut sockets, dc, &mut rng)?;
    if repaired > 0 {
        debug!("Moved {} socket(s) to remove repeated edges", repaired);
    }

    if params.no_4cycle {
        eliminate_4cycles(&mut sockets, n, m, dc, &mut rng)?;
    }

    matrix_from_sockets(&sockets, n, m, dc)
}

/// True when every column has weight `dv` and every row weight `dc`.
pub fn is_regular(h: &ParityCheckMatrix, dv: usize, dc: usize) -> bool {
    let cols_ok = (0..h.cols()).all(|j| h.col_weight(j) == dv);
    cols_ok && (0..h.rows()).all(|i| h.row_weight(i) == dc)
}

/// Number of cycles of length four: every pair of checks sharing `s`
/// variables closes `s·(s−1)/2` of them.
pub fn count_4cycles(graph: &TannerGraph) -> usize {
    let mut shared = vec![0usize; graph.num_checks()];
    let mut touched = Vec::new();
    let mut total = 0;

    for i in 0..graph.num_checks() {
        for &j in graph.check_neighbors(i) {
            for &other in graph.var_neighbors(j) {
                if other > i {
                    if shared[other] == 0 {
                        touched.push(other);
                    }
                    shared[other] += 1;
                }
            }
        }
        for other in touched.drain(..) {
            let s = shared[other];
            total += s * (s - 1) / 2;
            shared[other] = 0;
        }
    }

    total
}

/// Some `(check, variable)` lying on a cycle of length four, scanning checks
/// from `start` onwards (wrapping around).
fn find_4cycle(graph: &TannerGraph, start: usize) -> Option<(usize, usize)> {
    let m = graph.num_checks();
    let mut seen_via = vec![None; m];

    for i in (start..m).chain(0..start) {
        let mut found = None;
        for &j in graph.check_neighbors(i) {
            for &other in graph.var_neighbors(j) {
                if other == i {
                    continue;
                }
                match seen_via[other] {
                    Some(_) => {
                        found = Some((i, j));
                        break;
                    }
                    None => seen_via[other] = Some(j),
                }
            }
            if found.is_some() {
                break;
            }
        }
        for &j in graph.check_neighbors(i) {
            for &other in graph.var_neighbors(j) {
                seen_via[other] = None;
            }
        }
        if found.is_some() {
            return found;
        }
    }

    None
}

fn matrix_from_sockets(
    sockets: &[usize],
    n: usize,
    m: usize,
    dc: usize,
) -> Result<ParityCheckMatrix, LdpcError> {
    let mut h = ParityCheckMatrix::allocate(m, n)?;
    for (s, &j) in sockets.iter().enumerate() {
        h.insert(s / dc, j)?;
    }
    Ok(h)
}

fn check_sockets(sockets: &[usize], check: usize, dc: usize) -> &[usize] {
    &sockets[check * dc..(check + 1) * dc]
}

fn first_repeated_edge(sockets: &[usize], dc: usize) -> Option<usize> {
    for (i, row) in sockets.chunks(dc).enumerate() {
        for k in 1..row.len() {
            if row[..k].contains(&row[k]) {
                return Some(i * dc + k);
            }
        }
    }
    None
}

/// Swapping sockets `s` and `t` moves variable `a` into `t`'s check and `b`
/// into `s`'s check; neither may already be there.
fn swap_keeps_simple(sockets: &[usize], s: usize, t: usize, dc: usize) -> bool {
    let (a, b) = (sockets[s], sockets[t]);
    s / dc != t / dc
        && a != b
        && !check_sockets(sockets, s / dc, dc).contains(&b)
        && !check_sockets(sockets, t / dc, dc).contains(&a)
}

fn repair_repeated_edges(
    sockets: &mut [usize],
    dc: usize,
    rng: &mut ChaCha8Rng,
) -> Result<usize, LdpcError> {
    let max_attempts = REPAIR_ATTEMPTS_PER_SOCKET * sockets.len();
    let mut attempts = 0;
    let mut moved = 0;

    while let Some(s) = first_repeated_edge(sockets, dc) {
        if attempts == max_attempts {
            return Err(LdpcError::InvalidParameter(
                "Could not place sockets without repeated edges".to_string(),
            ));
        }
        attempts += 1;

        let t = rng.gen_range(0..sockets.len());
        if swap_keeps_simple(sockets, s, t, dc) {
            sockets.swap(s, t);
            moved += 1;
        }
    }

    Ok(moved)
}

/// Greedy degree-preserving swaps, kept only when they lower the number of
/// 4-cycles.
fn eliminate_4cycles(
    sockets: &mut [usize],
    n: usize,
    m: usize,
    dc: usize,
    rng: &mut ChaCha8Rng,
) -> Result<(), LdpcError> {
    let mut graph = TannerGraph::new(&matrix_from_sockets(sockets, n, m, dc)?);
    let mut cycles = count_4cycles(&graph);
    let initial = cycles;
    let max_attempts = CYCLE_ATTEMPTS_PER_SOCKET * sockets.len();
    let mut attempts = 0;

    while cycles > 0 && attempts < max_attempts {
        attempts += 1;

        let (check, var) = match find_4cycle(&graph, rng.gen_range(0..m)) {
            Some(found) => found,
            None => break,
        };
        let row = check_sockets(sockets, check, dc);
        let s = match row.iter().position(|&v| v == var) {
            Some(pos) => check * dc + pos,
            None => continue,
        };
        let t = rng.gen_range(0..sockets.len());
        if !swap_keeps_simple(sockets, s, t, dc) {
            continue;
        }

        sockets.swap(s, t);
        let candidate = TannerGraph::new(&matrix_from_sockets(sockets, n, m, dc)?);
        let candidate_cycles = count_4cycles(&candidate);
        if candidate_cycles < cycles {
            graph = candidate;
            cycles = candidate_cycles;
        } else {
            sockets.swap(s, t);
        }
    }

    if initial > cycles {
        debug!("Eliminated {} cycles of length four", initial - cycles);
    }
    if cycles > 0 {
        warn!(
            "{} cycles of length four remain after {} attempts",
            cycles, attempts
        );
    }

    Ok(())
}
