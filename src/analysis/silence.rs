// Silence module - leading/trailing silence detection and trimming
//
// Thresholds accept two notations. A value that is mathematically an integer
// is read as a sample value at a fixed bit depth and divided by
// 2^(bit_depth - 1); anything else is already a linear amplitude. A float
// such as 1.0 therefore means 1/32768 at 16-bit depth, not full scale.

use serde::{Deserialize, Serialize};

use super::signal::Signal;
use crate::config::SilenceConfig;

/// -80.8 dBFS as a linear amplitude
pub const NEG_80_8_DB: f64 = 0.000_091_201_083_935_590_96;

/// Bit depth used to interpret integer thresholds
pub const DEFAULT_BIT_DEPTH: u32 = 16;

/// Silence threshold in either integer-sample or linear notation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Threshold(pub f64);

impl Threshold {
    /// -80.8 dBFS scaled by 4, about 11.95 sample values at 16-bit depth
    pub const DEFAULT: Threshold = Threshold(NEG_80_8_DB * 4.0);

    /// Resolve to a linear amplitude for the given bit depth
    pub fn amplitude(self, bit_depth: u32) -> f32 {
        if self.0.is_finite() && self.0.fract() == 0.0 {
            let full_scale = 2f64.powi(bit_depth.saturating_sub(1) as i32);
            (self.0 / full_scale) as f32
        } else {
            self.0 as f32
        }
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Threshold::DEFAULT
    }
}

/// Index where the signal starts, backed off by `samples_before`
///
/// Returns 0 when no sample exceeds the threshold. A first loud sample at an
/// index below `samples_before` also yields 0, so "loud from the very start"
/// and "never loud" are indistinguishable here.
pub fn start_of(samples: &[f32], threshold: Threshold, samples_before: usize) -> usize {
    start_index(samples, threshold.amplitude(DEFAULT_BIT_DEPTH), samples_before)
}

/// Index one past where the signal ends, extended by `samples_after`
///
/// Returns `samples.len()` when no sample exceeds the threshold.
pub fn end_of(samples: &[f32], threshold: Threshold, samples_after: usize) -> usize {
    end_index(samples, threshold.amplitude(DEFAULT_BIT_DEPTH), samples_after)
}

/// Slice between `start_of` and `end_of` with one sample of margin on each side
///
/// Empty when the boundaries cross.
pub fn trim(samples: &[f32], start_threshold: Threshold, end_threshold: Threshold) -> &[f32] {
    let start = start_of(samples, start_threshold, 1);
    let end = end_of(samples, end_threshold, 1);
    bounded(samples, start, end)
}

fn start_index(samples: &[f32], amplitude: f32, samples_before: usize) -> usize {
    match samples.iter().position(|s| s.abs() > amplitude) {
        Some(index) if index >= samples_before => index - samples_before,
        _ => 0,
    }
}

fn end_index(samples: &[f32], amplitude: f32, samples_after: usize) -> usize {
    let len = samples.len();
    match samples.iter().rev().position(|s| s.abs() > amplitude) {
        Some(rev_index) if rev_index >= samples_after => len - (rev_index - samples_after),
        _ => len,
    }
}

fn bounded(samples: &[f32], start: usize, end: usize) -> &[f32] {
    if start >= end {
        &[]
    } else {
        &samples[start..end]
    }
}

/// Config-driven trimmer used by the feature extractor
#[derive(Debug, Clone, Copy)]
pub struct SilenceTrimmer {
    start_amplitude: f32,
    end_amplitude: f32,
    samples_before: usize,
    samples_after: usize,
}

impl SilenceTrimmer {
    pub fn new(config: &SilenceConfig) -> Self {
        Self {
            start_amplitude: config.start_threshold.amplitude(config.bit_depth),
            end_amplitude: config.end_threshold.amplitude(config.bit_depth),
            samples_before: config.samples_before,
            samples_after: config.samples_after,
        }
    }

    /// Half-open `[start, end)` range of the non-silent part
    pub fn bounds(&self, samples: &[f32]) -> (usize, usize) {
        (
            start_index(samples, self.start_amplitude, self.samples_before),
            end_index(samples, self.end_amplitude, self.samples_after),
        )
    }

    pub fn trim(&self, signal: &Signal) -> Signal {
        let (start, end) = self.bounds(&signal.samples);
        Signal::new(
            bounded(&signal.samples, start, end).to_vec(),
            signal.sample_rate,
        )
    }
}
