//! Flooding min-sum belief propagation decoder.
//!
//! Every iteration runs the variable-node phase, the check-node phase, the
//! posterior aggregation, the hard decision and the syndrome test, in that
//! order. Decoding stops on the first zero syndrome or after
//! `max_iterations`, returning the hard decision of the last iteration run.

use crate::{LdpcError, MessageStore, TannerGraph};
use log::{debug, log_enabled, trace, Level};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Magnitude sent by a check with no other neighbours. It stands in for an
/// unbounded value while keeping sums finite.
pub const NO_CONSTRAINT_MAGNITUDE: f64 = 1.0e30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DecoderState {
    Init,
    Iterating,
    /// Zero syndrome reached.
    Converged,
    /// Iteration budget spent without a zero syndrome.
    Exhausted,
}

impl DecoderState {
    /// True once no further iteration will run.
    pub fn is_terminal(self) -> bool {
        matches!(self, DecoderState::Converged | DecoderState::Exhausted)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecoderConfig {
    pub max_iterations: usize,
    /// Optional bound on every message magnitude. `None` leaves messages
    /// unbounded.
    pub clamp: Option<f64>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            clamp: None,
        }
    }
}

impl DecoderConfig {
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_clamp(mut self, clamp: f64) -> Self {
        self.clamp = Some(clamp);
        self
    }

    pub fn validate(&self) -> Result<(), LdpcError> {
        if self.max_iterations == 0 {
            return Err(LdpcError::InvalidParameter(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if let Some(c) = self.clamp {
            if c.is_nan() || c <= 0.0 {
                return Err(LdpcError::InvalidParameter(format!(
                    "clamp must be positive, got {}",
                    c
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecodeResult {
    pub decoded_bits: Vec<u8>,
    /// True iff the syndrome of `decoded_bits` is all zero.
    pub success: bool,
    pub iterations_used: usize,
    pub state: DecoderState,
}

/// Decode `channel_llr` over `graph` with default settings and the given
/// iteration budget.
pub fn decode(
    graph: &TannerGraph,
    channel_llr: &[f64],
    max_iterations: usize,
) -> Result<DecodeResult, LdpcError> {
    let config = DecoderConfig::default().with_max_iterations(max_iterations);
    MinSumDecoder::new(graph, config)?.decode(channel_llr)
}

/// Min-sum decoder bound to a shared, read-only Tanner graph.
///
/// The decoder holds no message state of its own; each call to
/// [`MinSumDecoder::decode`] allocates a private [`MessageStore`], so one
/// decoder (or one graph) can serve any number of concurrent calls.
#[derive(Debug, Clone)]
pub struct MinSumDecoder<'g> {
    graph: &'g TannerGraph,
    config: DecoderConfig,
}

impl<'g> MinSumDecoder<'g> {
    pub fn new(graph: &'g TannerGraph, config: DecoderConfig) -> Result<Self, LdpcError> {
        config.validate()?;
        Ok(Self { graph, config })
    }

    pub fn graph(&self) -> &TannerGraph {
        self.graph
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode one frame of channel LLRs (positive favors 0, negative favors 1).
    pub fn decode(&self, channel_llr: &[f64]) -> Result<DecodeResult, LdpcError> {
        let graph = self.graph;
        let n = graph.num_vars();
        if channel_llr.len() != n {
            return Err(LdpcError::DimensionMismatch {
                expected: n,
                actual: channel_llr.len(),
            });
        }

        let mut state = DecoderState::Init;
        let mut iterations_used = 0;
        let mut store = MessageStore::new(graph);
        let mut scratch = Vec::new();
        let mut total_llr = vec![0.0; n];
        let mut decoded_bits = vec![0u8; n];
        let clamp = self.config.clamp;

        while !state.is_terminal() {
            if iterations_used == self.config.max_iterations {
                state = DecoderState::Exhausted;
                continue;
            }
            iterations_used += 1;

            update_variable_nodes(graph, channel_llr, &mut store, clamp);
            update_check_nodes(graph, &mut store, &mut scratch, clamp);
            aggregate_beliefs(graph, channel_llr, &store, &mut total_llr);
            for (bit, &llr) in decoded_bits.iter_mut().zip(total_llr.iter()) {
                *bit = u8::from(llr < 0.0);
            }

            state = if graph.syndrome_is_zero(&decoded_bits) {
                DecoderState::Converged
            } else {
                DecoderState::Iterating
            };

            if state == DecoderState::Iterating && log_enabled!(Level::Trace) {
                let unsatisfied = (0..graph.num_checks())
                    .filter(|&i| graph.check_parity(i, &decoded_bits) != 0)
                    .count();
                trace!(
                    "iteration {}: {} unsatisfied check(s)",
                    iterations_used,
                    unsatisfied
                );
            }
        }

        debug!(
            "decode finished as {:?} after {} iteration(s)",
            state, iterations_used
        );
        Ok(DecodeResult {
            decoded_bits,
            success: state == DecoderState::Converged,
            iterations_used,
            state,
        })
    }
}

#[inline]
fn limit(value: f64, clamp: Option<f64>) -> f64 {
    match clamp {
        Some(c) => value.clamp(-c, c),
        None => value,
    }
}

/// Variable-node phase. Reads only C2V, writes only V2C.
///
/// Each outgoing message is extrinsic: the channel LLR plus the C2V messages
/// of every other neighbouring check.
pub(crate) fn update_variable_nodes(
    graph: &TannerGraph,
    channel_llr: &[f64],
    store: &mut MessageStore,
    clamp: Option<f64>,
) {
    let (c2v, v2c) = store.variable_phase();
    for (j, &llr) in channel_llr.iter().enumerate() {
        let edges = graph.var_range(j);
        for e in edges.clone() {
            let mut sum = llr;
            for other in edges.clone() {
                if other != e {
                    sum += c2v[graph.var_edge_to_check_edge(other)];
                }
            }
            v2c[e] = limit(sum, clamp);
        }
    }
}

/// Check-node phase. Reads only V2C, writes only C2V.
///
/// Min-sum: sign is the product of the other incoming signs, magnitude the
/// smallest other incoming magnitude. Tracking the two smallest magnitudes
/// makes ties come out right: if the minimum occurs twice, the edge holding
/// one copy still sees the other.
pub(crate) fn update_check_nodes(
    graph: &TannerGraph,
    store: &mut MessageStore,
    scratch: &mut Vec<f64>,
    clamp: Option<f64>,
) {
    let (v2c, c2v) = store.check_phase();
    for i in 0..graph.num_checks() {
        let edges = graph.check_range(i);
        match edges.len() {
            0 => continue,
            1 => {
                c2v[edges.start] = limit(NO_CONSTRAINT_MAGNITUDE, clamp);
                continue;
            }
            _ => {}
        }

        scratch.clear();
        scratch.extend(edges.clone().map(|e| v2c[graph.check_edge_to_var_edge(e)]));

        let mut negative = false;
        let mut min1 = f64::INFINITY;
        let mut min2 = f64::INFINITY;
        let mut min1_pos = 0;
        for (k, &m) in scratch.iter().enumerate() {
            negative ^= m < 0.0;
            let mag = m.abs();
            if mag < min1 {
                min2 = min1;
                min1 = mag;
                min1_pos = k;
            } else if mag < min2 {
                min2 = mag;
            }
        }

        for (k, (e, &m)) in edges.zip(scratch.iter()).enumerate() {
            let mag = if k == min1_pos { min2 } else { min1 };
            let value = if negative ^ (m < 0.0) { -mag } else { mag };
            c2v[e] = limit(value, clamp);
        }
    }
}

/// Posterior LLR per variable: channel LLR plus every incoming C2V message.
pub(crate) fn aggregate_beliefs(
    graph: &TannerGraph,
    channel_llr: &[f64],
    store: &MessageStore,
    total_llr: &mut [f64],
) {
    let c2v = store.c2v();
    for (j, (total, &llr)) in total_llr.iter_mut().zip(channel_llr.iter()).enumerate() {
        let incoming: f64 = graph
            .var_range(j)
            .map(|e| c2v[graph.var_edge_to_check_edge(e)])
            .sum();
        *total = llr + incoming;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_graph() -> TannerGraph {
        TannerGraph::from_rows(&[
            [1u8, 1, 0, 1, 0, 0],
            [1, 0, 1, 0, 1, 0],
            [0, 1, 1, 0, 0, 1],
        ])
        .unwrap()
    }

    #[test]
    fn test_all_ones_llr_converges_to_zero() {
        let graph = small_graph();
        let result = decode(&graph, &[1.0; 6], 50).unwrap();

        assert!(result.success);
        assert_eq!(result.state, DecoderState::Converged);
        assert_eq!(result.decoded_bits, vec![0; 6]);
        assert!(result.iterations_used >= 1 && result.iterations_used <= 50);
    }

    #[test]
    fn test_strong_llrs_converge_in_one_iteration() {
        let graph = small_graph();
        let result = decode(&graph, &[20.0, 25.0, 21.0, 30.0, 20.0, 40.0], 10).unwrap();

        assert!(result.success);
        assert_eq!(result.iterations_used, 1);
        assert_eq!(result.decoded_bits, vec![0; 6]);
    }

    #[test]
    fn test_single_bit_error_is_corrected() {
        let graph = small_graph();
        // 111000 is a codeword; bit 4 is received weakly flipped
        let llr = [-3.0, -3.0, -3.0, 3.0, -0.5, 3.0];
        let result = decode(&graph, &llr, 20).unwrap();

        assert!(result.success);
        assert_eq!(result.decoded_bits, vec![1, 1, 1, 0, 0, 0]);
    }

    #[test]
    fn test_degree_one_check_is_well_defined() {
        // check 0 touches only variable 0
        let graph = TannerGraph::from_rows(&[[1u8, 0, 0], [1, 1, 1]]).unwrap();

        for max_iter in [1, 2, 7] {
            let result = decode(&graph, &[-1.0, 2.0, 2.0], max_iter).unwrap();
            assert!(result.success);
            assert_eq!(result.iterations_used, 1);
            assert_eq!(result.decoded_bits, vec![0, 0, 0]);
        }

        let mut store = MessageStore::new(&graph);
        update_variable_nodes(&graph, &[-1.0, 2.0, 2.0], &mut store, None);
        update_check_nodes(&graph, &mut store, &mut Vec::new(), None);
        assert_eq!(store.check_to_var(&graph, 0), &[NO_CONSTRAINT_MAGNITUDE]);
        assert!(store.c2v().iter().all(|m| m.is_finite()));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!DecoderState::Init.is_terminal());
        assert!(!DecoderState::Iterating.is_terminal());
        assert!(DecoderState::Converged.is_terminal());
        assert!(DecoderState::Exhausted.is_terminal());

        // convergence on the last allowed iteration is not exhaustion
        let result = decode(&small_graph(), &[1.0; 6], 1).unwrap();
        assert_eq!(result.state, DecoderState::Converged);
        assert_eq!(result.iterations_used, 1);
        assert!(result.success);

        let graph = TannerGraph::from_rows(&[[1u8, 1], [1, 1]]).unwrap();
        let result = decode(&graph, &[1.0, -1.0], 1).unwrap();
        assert_eq!(result.state, DecoderState::Exhausted);
        assert_eq!(result.iterations_used, 1);
        assert!(!result.success);
    }

    #[test]
    fn test_exhausted_returns_last_iteration() {
        // Two identical checks on two variables: the decision flips every
        // iteration and never satisfies both checks.
        let graph = TannerGraph::from_rows(&[[1u8, 1], [1, 1]]).unwrap();
        let llr = [1.0, -1.0];

        let odd = decode(&graph, &llr, 5).unwrap();
        assert!(!odd.success);
        assert_eq!(odd.state, DecoderState::Exhausted);
        assert_eq!(odd.iterations_used, 5);
        assert_eq!(odd.decoded_bits, vec![1, 0]);

        let even = decode(&graph, &llr, 4).unwrap();
        assert!(!even.success);
        assert_eq!(even.iterations_used, 4);
        assert_eq!(even.decoded_bits, vec![0, 1]);
    }

    #[test]
    fn test_variable_update_is_extrinsic() {
        let graph = TannerGraph::from_rows(&[[1u8, 1], [1, 0], [1, 0]]).unwrap();
        let mut store = MessageStore::new(&graph);
        {
            let (_, c2v) = store.check_phase();
            // check 0 -> var 0, check 1 -> var 0, check 2 -> var 0
            c2v[graph.check_range(0).start] = 1.0;
            c2v[graph.check_range(1).start] = 10.0;
            c2v[graph.check_range(2).start] = 100.0;
        }

        update_variable_nodes(&graph, &[0.5, -2.0], &mut store, None);
        assert_eq!(store.var_to_check(&graph, 0), &[110.5, 101.5, 11.5]);
        assert_eq!(store.var_to_check(&graph, 1), &[-2.0]);
    }

    #[test]
    fn test_check_update_min_sum_with_tie() {
        let graph = TannerGraph::from_rows(&[[1u8, 1, 1, 1]]).unwrap();
        let mut store = MessageStore::new(&graph);
        {
            let (_, v2c) = store.variable_phase();
            v2c.copy_from_slice(&[-2.0, 3.0, 2.0, 5.0]);
        }

        update_check_nodes(&graph, &mut store, &mut Vec::new(), None);
        assert_eq!(store.check_to_var(&graph, 0), &[2.0, -2.0, -2.0, -2.0]);
    }

    #[test]
    fn test_check_update_zero_message() {
        let graph = TannerGraph::from_rows(&[[1u8, 1, 1]]).unwrap();
        let mut store = MessageStore::new(&graph);
        {
            let (_, v2c) = store.variable_phase();
            v2c.copy_from_slice(&[0.0, -4.0, 6.0]);
        }

        update_check_nodes(&graph, &mut store, &mut Vec::new(), None);
        let c2v = store.check_to_var(&graph, 0);
        assert_eq!(c2v[0], -4.0);
        assert_eq!(c2v[1].abs(), 0.0);
        assert_eq!(c2v[2].abs(), 0.0);
    }

    #[test]
    fn test_aggregate_uses_all_messages() {
        let graph = TannerGraph::from_rows(&[[1u8, 0], [1, 1]]).unwrap();
        let mut store = MessageStore::new(&graph);
        {
            let (_, c2v) = store.check_phase();
            c2v.copy_from_slice(&[-3.0, 1.0, 4.0]);
        }

        let mut total = vec![0.0; 2];
        aggregate_beliefs(&graph, &[0.5, 0.25], &store, &mut total);
        assert_eq!(total, vec![-1.5, 4.25]);
    }

    #[test]
    fn test_clamp_bounds_messages() {
        let graph = TannerGraph::from_rows(&[[1u8, 0], [1, 1]]).unwrap();
        let mut store = MessageStore::new(&graph);

        update_variable_nodes(&graph, &[50.0, -40.0], &mut store, Some(8.0));
        assert!(store.v2c().iter().all(|m| m.abs() <= 8.0));
        update_check_nodes(&graph, &mut store, &mut Vec::new(), Some(8.0));
        assert_eq!(store.check_to_var(&graph, 0), &[8.0]);
        assert_eq!(store.check_to_var(&graph, 1), &[-8.0, 8.0]);

        let config = DecoderConfig::default().with_clamp(8.0);
        let decoder = MinSumDecoder::new(&graph, config).unwrap();
        assert_eq!(decoder.config().clamp, Some(8.0));
        assert!(decoder.decode(&[50.0, -40.0]).is_ok());
    }

    #[test]
    fn test_isolated_variable_keeps_channel_decision() {
        let graph = TannerGraph::from_rows(&[[1u8, 1, 0]]).unwrap();
        let result = decode(&graph, &[2.0, 2.0, -0.1], 3).unwrap();

        assert!(result.success);
        assert_eq!(result.decoded_bits, vec![0, 0, 1]);
    }

    #[test]
    fn test_invalid_inputs() {
        let graph = small_graph();

        let err = decode(&graph, &[1.0; 5], 10).unwrap_err();
        assert!(matches!(
            err,
            LdpcError::DimensionMismatch {
                expected: 6,
                actual: 5
            }
        ));

        let err = decode(&graph, &[1.0; 6], 0).unwrap_err();
        assert!(matches!(err, LdpcError::InvalidParameter(_)));

        let config = DecoderConfig::default().with_clamp(-1.0);
        assert!(MinSumDecoder::new(&graph, config).is_err());
    }

    #[test]
    fn test_decoder_is_reusable_and_deterministic() {
        let graph = small_graph();
        let decoder = MinSumDecoder::new(&graph, DecoderConfig::default()).unwrap();
        let llr = [0.3, -0.2, 1.1, -0.7, 0.9, 0.4];

        assert_eq!(decoder.decode(&llr).unwrap(), decoder.decode(&llr).unwrap());
    }
}
