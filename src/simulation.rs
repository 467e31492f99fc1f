//! Monte-Carlo bit and frame error rates over an SNR sweep.
//!
//! The all-zero codeword is sent for every frame. For a linear code on a
//! symmetric channel with a symmetric decoder this gives the same error
//! rates as random codewords without needing an encoder.

use crate::{
    generate_regular, BpskAwgnChannel, DecoderConfig, LdpcError, MinSumDecoder, RegularCodeParams,
    TannerGraph,
};
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationConfig {
    pub snr_db_list: Vec<f64>,
    pub max_iterations: usize,
    pub num_frames: usize,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            snr_db_list: vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
            max_iterations: 50,
            num_frames: 100,
            seed: 0,
        }
    }
}

impl SimulationConfig {
    pub fn with_snr_db_list(mut self, snr_db_list: Vec<f64>) -> Self {
        self.snr_db_list = snr_db_list;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_num_frames(mut self, num_frames: usize) -> Self {
        self.num_frames = num_frames;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Error counts for one SNR value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SnrPoint {
    pub snr_db: f64,
    pub ber: f64,
    pub fer: f64,
    pub bit_errors: usize,
    pub frame_errors: usize,
    pub frames: usize,
    pub average_iterations: f64,
}

/// Run the sweep over an existing Tanner graph.
pub fn simulate(
    graph: &TannerGraph,
    config: &SimulationConfig,
) -> Result<Vec<SnrPoint>, LdpcError> {
    if config.num_frames == 0 {
        let msg = "num_frames must be > 0".to_string();
        return Err(LdpcError::InvalidParameter(msg));
    }

    let decoder = MinSumDecoder::new(
        graph,
        DecoderConfig::default().with_max_iterations(config.max_iterations),
    )?;
    let n = graph.num_vars();
    let codeword = vec![0u8; n];
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut points = Vec::with_capacity(config.snr_db_list.len());

    for &snr_db in &config.snr_db_list {
        let channel = BpskAwgnChannel::from_snr_db(snr_db)?;
        let mut bit_errors = 0;
        let mut frame_errors = 0;
        let mut iterations = 0;

        for _frame in 0..config.num_frames {
            let received = channel.transmit(&codeword, &mut rng);
            let result = decoder.decode(&channel.llrs(&received))?;

            if !result.success {
                frame_errors += 1;
            }
            bit_errors += result
                .decoded_bits
                .iter()
                .zip(codeword.iter())
                .filter(|(a, b)| a != b)
                .count();
            iterations += result.iterations_used;
        }

        let point = SnrPoint {
            snr_db,
            ber: bit_errors as f64 / (config.num_frames * n) as f64,
            fer: frame_errors as f64 / config.num_frames as f64,
            bit_errors,
            frame_errors,
            frames: config.num_frames,
            average_iterations: iterations as f64 / config.num_frames as f64,
        };
        info!(
            "SNR: {} dB, BER: {:.3e}, FER: {:.3e}, avg iterations: {:.2}",
            point.snr_db, point.ber, point.fer, point.average_iterations
        );
        points.push(point);
    }

    Ok(points)
}

/// Build a regular code from `params`, then run the sweep on it.
pub fn simulate_regular(
    params: &RegularCodeParams,
    config: &SimulationConfig,
) -> Result<Vec<SnrPoint>, LdpcError> {
    let h = generate_regular(params)?;
    let graph = TannerGraph::new(&h);
    simulate(&graph, config)
}
