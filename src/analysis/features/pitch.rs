// Pitch module - coarse fundamental frequency estimate
//
// Each STFT frame contributes one candidate: the frequency of its strongest
// spectral peak inside [fmin, fmax), refined by parabolic interpolation, or
// 0 Hz when the frame has no peak. The estimate is the minimum candidate and
// the dispersion is the population standard deviation of all candidates.
//
// Trained models depend on the minimum. Do not switch it to a mean or median
// without versioning the feature layout.

use serde::{Deserialize, Serialize};

use super::fft::{SpectralFrame, StftProcessor};
use crate::config::PitchConfig;
use crate::error::AnalysisError;

/// FFT size for pitch tracking
pub const PITCH_FFT_SIZE: usize = 2048;

/// Hop between pitch frames
pub const PITCH_HOP_LENGTH: usize = 512;

/// Peaks must exceed this fraction of the frame maximum
const PEAK_THRESHOLD: f32 = 0.1;

/// Fundamental frequency estimate and its spread over time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FundamentalEstimate {
    pub hertz: f32,
    pub deviation: f32,
}

/// Peak-picking pitch tracker
pub struct PitchTracker {
    stft: StftProcessor,
    fmin: f32,
    fmax: f32,
}

impl PitchTracker {
    pub fn new(fmin: f32, fmax: f32) -> Result<Self, AnalysisError> {
        Ok(Self {
            stft: StftProcessor::with_hop(PITCH_FFT_SIZE, PITCH_HOP_LENGTH)?,
            fmin: fmin.max(0.0),
            fmax,
        })
    }

    pub fn from_config(config: &PitchConfig) -> Result<Self, AnalysisError> {
        Self::new(config.fmin, config.fmax)
    }

    /// Per-frame fundamental candidates in Hz
    pub fn candidates(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<f32>, AnalysisError> {
        let frames = self.stft.magnitudes(samples)?;
        let fmax = self.fmax.min(sample_rate as f32 / 2.0);
        Ok(frames
            .iter()
            .map(|frame| self.frame_candidate(frame, sample_rate, fmax))
            .collect())
    }

    pub fn estimate(
        &self,
        samples: &[f32],
        sample_rate: u32,
    ) -> Result<FundamentalEstimate, AnalysisError> {
        let candidates = self.candidates(samples, sample_rate)?;
        if candidates.is_empty() {
            return Err(AnalysisError::EmptyInput {
                context: "estimate_fundamental",
            });
        }

        let hertz = candidates.iter().cloned().fold(f32::INFINITY, f32::min);
        let count = candidates.len() as f64;
        let mean = candidates.iter().map(|&c| c as f64).sum::<f64>() / count;
        let variance = candidates
            .iter()
            .map(|&c| (c as f64 - mean).powi(2))
            .sum::<f64>()
            / count;

        Ok(FundamentalEstimate {
            hertz,
            deviation: variance.sqrt() as f32,
        })
    }

    fn frame_candidate(&self, frame: &SpectralFrame, sample_rate: u32, fmax: f32) -> f32 {
        let reference = PEAK_THRESHOLD * frame.iter().cloned().fold(0.0f32, f32::max);
        let gated = |i: usize| if frame[i] > reference { frame[i] } else { 0.0 };

        let mut best_magnitude = 0.0f32;
        let mut best_pitch = 0.0f32;

        // The outer bins are never local maxima inside the band
        for i in 1..frame.len().saturating_sub(1) {
            let frequency = self.stft.bin_frequency(i, sample_rate);
            if frequency < self.fmin || frequency >= fmax {
                continue;
            }

            let current = gated(i);
            if !(current > gated(i - 1) && current >= gated(i + 1)) {
                continue;
            }

            let (prev, peak, next) = (frame[i - 1], frame[i], frame[i + 1]);
            let slope = 0.5 * (next - prev);
            let curvature = 2.0 * peak - next - prev;
            let shift = if curvature.abs() < f32::MIN_POSITIVE {
                slope / (curvature + 1.0)
            } else {
                slope / curvature
            };

            let magnitude = peak + 0.5 * slope * shift;
            if magnitude > best_magnitude {
                best_magnitude = magnitude;
                best_pitch = (i as f32 + shift) * sample_rate as f32 / self.stft.n_fft() as f32;
            }
        }

        best_pitch
    }
}

/// One-shot fundamental estimate with an ad-hoc tracker
pub fn estimate_fundamental(
    samples: &[f32],
    sample_rate: u32,
    fmin: f32,
    fmax: f32,
) -> Result<FundamentalEstimate, AnalysisError> {
    PitchTracker::new(fmin, fmax)?.estimate(samples, sample_rate)
}
