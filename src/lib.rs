//! Min-sum belief propagation decoding for LDPC codes.
//!
//! A [`ParityCheckMatrix`] is turned once into a [`TannerGraph`] whose
//! reciprocal edge tables make every message lookup O(1). The decoder then
//! runs flooding min-sum iterations over channel LLRs until the syndrome is
//! zero or the iteration budget is spent.
//!
//! LLR sign convention: positive favors bit 0, negative favors bit 1
//! (BPSK mapping 0 → +1, 1 → −1, `llr = 2·y / σ²`). The hard decision in the
//! decoder depends on it.

pub mod channel;
pub mod construction;
pub mod decoder;
pub mod messages;
pub mod simulation;
pub mod sparse_matrix;
pub mod tanner;

// Re-export main types
pub use channel::BpskAwgnChannel;
pub use construction::{count_4cycles, generate_regular, is_regular, RegularCodeParams};
pub use decoder::{
    decode, DecodeResult, DecoderConfig, DecoderState, MinSumDecoder, NO_CONSTRAINT_MAGNITUDE,
};
pub use messages::MessageStore;
pub use simulation::{simulate, simulate_regular, SimulationConfig, SnrPoint};
pub use sparse_matrix::{ParityCheckMatrix, SparseError};
pub use tanner::TannerGraph;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LdpcError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Invalid matrix entry {value} at ({row}, {col}), expected 0 or 1")]
    InvalidMatrix { row: usize, col: usize, value: u8 },
    #[error("Invalid degree sequence: n={n}, dv={dv}, dc={dc} gives a non-integer check count")]
    InvalidDegreeSequence { n: usize, dv: usize, dc: usize },
    #[error("Dimension mismatch: expected length {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("Sparse matrix error: {0}")]
    SparseMatrix(#[from] sparse_matrix::SparseError),
}
