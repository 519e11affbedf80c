// FFT module - short-time Fourier transform
//
// Frames are centered: the signal is zero-padded by n_fft / 2 on both sides
// and windowed with a periodic Hann window. Only the non-negative frequency
// half of each transform is kept.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use crate::error::AnalysisError;

/// Magnitude per frequency bin for one STFT frame
pub type SpectralFrame = Vec<f32>;

/// STFT processor with a pre-planned FFT of fixed size
///
/// Immutable after construction, so one instance can be shared across
/// threads.
pub struct StftProcessor {
    fft: Arc<dyn Fft<f32>>,
    n_fft: usize,
    hop_length: usize,
    /// Periodic Hann window (pre-computed)
    window: Vec<f32>,
}

impl StftProcessor {
    /// Create a processor with the default hop of `n_fft / 4`
    pub fn new(n_fft: usize) -> Result<Self, AnalysisError> {
        Self::with_hop(n_fft, (n_fft / 4).max(1))
    }

    pub fn with_hop(n_fft: usize, hop_length: usize) -> Result<Self, AnalysisError> {
        if n_fft == 0 {
            return Err(AnalysisError::InvalidArgument {
                name: "n_fft",
                value: n_fft,
            });
        }
        if hop_length == 0 {
            return Err(AnalysisError::InvalidArgument {
                name: "hop_length",
                value: hop_length,
            });
        }

        let window = (0..n_fft)
            .map(|i| 0.5 - 0.5 * ((2.0 * std::f32::consts::PI * i as f32) / n_fft as f32).cos())
            .collect();
        let fft = FftPlanner::new().plan_fft_forward(n_fft);

        Ok(Self {
            fft,
            n_fft,
            hop_length,
            window,
        })
    }

    pub fn n_fft(&self) -> usize {
        self.n_fft
    }

    pub fn hop_length(&self) -> usize {
        self.hop_length
    }

    /// Number of non-negative frequency bins per frame
    pub fn bin_count(&self) -> usize {
        self.n_fft / 2 + 1
    }

    /// Center frequency of `bin` in Hz
    pub fn bin_frequency(&self, bin: usize, sample_rate: u32) -> f32 {
        bin as f32 * sample_rate as f32 / self.n_fft as f32
    }

    /// Number of frames produced for a signal of `len` samples
    pub fn frame_count(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let padded = len + 2 * (self.n_fft / 2);
        1 + (padded - self.n_fft) / self.hop_length
    }

    /// Magnitude spectrogram, one frame per hop
    ///
    /// # Errors
    /// `EmptyInput` when `samples` is empty.
    pub fn magnitudes(&self, samples: &[f32]) -> Result<Vec<SpectralFrame>, AnalysisError> {
        if samples.is_empty() {
            return Err(AnalysisError::EmptyInput { context: "stft" });
        }

        let pad = self.n_fft / 2;
        let frame_count = self.frame_count(samples.len());
        let mut buffer = vec![Complex::new(0.0f32, 0.0); self.n_fft];
        let mut scratch = vec![Complex::new(0.0f32, 0.0); self.fft.get_inplace_scratch_len()];
        let mut frames = Vec::with_capacity(frame_count);

        for frame in 0..frame_count {
            let origin = frame * self.hop_length;
            for (k, slot) in buffer.iter_mut().enumerate() {
                // Position in the unpadded signal
                let sample = (origin + k)
                    .checked_sub(pad)
                    .and_then(|idx| samples.get(idx))
                    .copied()
                    .unwrap_or(0.0);
                *slot = Complex::new(sample * self.window[k], 0.0);
            }

            self.fft.process_with_scratch(&mut buffer, &mut scratch);
            frames.push(buffer[..self.bin_count()].iter().map(|c| c.norm()).collect());
        }

        Ok(frames)
    }
}
