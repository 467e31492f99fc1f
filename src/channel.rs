//! BPSK over an additive white Gaussian noise channel.
//!
//! Bit 0 is sent as +1 and bit 1 as −1. The channel LLR of a received sample
//! `y` is `2·y / σ²`, so a positive LLR favors bit 0. The decoder's hard
//! decision assumes exactly this convention.

use crate::LdpcError;
use rand::Rng;
use rand_distr::{Distribution, Normal};

#[derive(Debug, Clone, Copy)]
pub struct BpskAwgnChannel {
    noise_variance: f64,
    noise: Normal<f64>,
}

impl BpskAwgnChannel {
    pub fn new(noise_variance: f64) -> Result<Self, LdpcError> {
        if !noise_variance.is_finite() || noise_variance <= 0.0 {
            return Err(LdpcError::InvalidParameter(format!(
                "noise variance must be finite and > 0, got {}",
                noise_variance
            )));
        }
        let noise = Normal::new(0.0, noise_variance.sqrt())
            .map_err(|e| LdpcError::InvalidParameter(e.to_string()))?;

        Ok(Self {
            noise_variance,
            noise,
        })
    }

    /// Channel for a given Eb/N0-style SNR in dB with unit signal power:
    /// `σ² = 1 / (2·10^(snr/10))`.
    pub fn from_snr_db(snr_db: f64) -> Result<Self, LdpcError> {
        let snr_linear = 10f64.powf(snr_db / 10.0);
        Self::new(1.0 / (2.0 * snr_linear))
    }

    pub fn noise_variance(&self) -> f64 {
        self.noise_variance
    }

    pub fn modulate(bits: &[u8]) -> Vec<f64> {
        bits.iter()
            .map(|&b| if b & 1 == 0 { 1.0 } else { -1.0 })
            .collect()
    }

    /// Modulate `bits` and add Gaussian noise.
    pub fn transmit<R: Rng + ?Sized>(&self, bits: &[u8], rng: &mut R) -> Vec<f64> {
        Self::modulate(bits)
            .into_iter()
            .map(|x| x + self.noise.sample(rng))
            .collect()
    }

    pub fn llrs(&self, received: &[f64]) -> Vec<f64> {
        received
            .iter()
            .map(|&y| 2.0 * y / self.noise_variance)
            .collect()
    }
}
