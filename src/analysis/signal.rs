// Signal module - sample buffer type, RMS energy and peak normalization

use crate::error::AnalysisError;

/// Mono sample buffer plus its sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub samples: Vec<f32>,
    /// Samples per second (> 0)
    pub sample_rate: u32,
}

impl Signal {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Copy a sub-range into a new signal with the same sample rate
    pub fn slice(&self, start: usize, end: usize) -> Signal {
        let end = end.min(self.samples.len());
        let start = start.min(end);
        Signal::new(self.samples[start..end].to_vec(), self.sample_rate)
    }
}

/// Root-mean-square energy: sqrt(mean(x²))
///
/// # Errors
/// `EmptyInput` when `samples` is empty.
pub fn root_mean_square(samples: &[f32]) -> Result<f32, AnalysisError> {
    if samples.is_empty() {
        return Err(AnalysisError::EmptyInput {
            context: "root_mean_square",
        });
    }

    let sum_squares: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    Ok((sum_squares / samples.len() as f64).sqrt() as f32)
}

/// Rescale a signal so its peak absolute amplitude is 1.0
///
/// # Errors
/// - `NonFiniteSample` if any sample is NaN or infinite
/// - `SilentSignal` if the peak is zero (this includes empty input)
pub fn normalize(signal: &Signal) -> Result<Signal, AnalysisError> {
    let mut peak = 0.0f32;
    for (index, &sample) in signal.samples.iter().enumerate() {
        if !sample.is_finite() {
            return Err(AnalysisError::NonFiniteSample { index });
        }
        peak = peak.max(sample.abs());
    }

    if peak == 0.0 {
        return Err(AnalysisError::SilentSignal);
    }

    let samples = signal.samples.iter().map(|&s| s / peak).collect();
    Ok(Signal::new(samples, signal.sample_rate))
}
