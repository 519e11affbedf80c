// Spectral module - per-band spectral summaries
//
// A band transform uses n_fft = 2 * band_count, which yields band_count + 1
// frequency bins. The DC bin is dropped so band 0 is the lowest non-zero
// frequency and exactly band_count values come back.

use serde::{Deserialize, Serialize};

use super::fft::{SpectralFrame, StftProcessor};
use crate::error::AnalysisError;

/// Smallest magnitude considered when converting to decibels
const AMIN: f32 = 1e-5;

/// Dynamic range kept below the spectrogram peak, in dB
const TOP_DB: f32 = 80.0;

/// Scale applied to magnitudes before averaging over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpectralScale {
    /// Raw STFT magnitude
    Linear,
    /// dB relative to the spectrogram peak, floored at -80 dB
    Decibels,
}

/// STFT sized so that it yields `band_count + 1` bins
pub fn band_transform(band_count: usize) -> Result<StftProcessor, AnalysisError> {
    if band_count == 0 {
        return Err(AnalysisError::InvalidArgument {
            name: "band_count",
            value: band_count,
        });
    }
    StftProcessor::new(band_count * 2)
}

/// Average value of each of `band_count` bands over the whole signal
pub fn band_averages(
    samples: &[f32],
    band_count: usize,
    scale: SpectralScale,
) -> Result<Vec<f32>, AnalysisError> {
    band_averages_with(&band_transform(band_count)?, samples, scale)
}

/// [`band_averages`] with a pre-planned band transform
pub fn band_averages_with(
    stft: &StftProcessor,
    samples: &[f32],
    scale: SpectralScale,
) -> Result<Vec<f32>, AnalysisError> {
    let mut frames = stft.magnitudes(samples)?;
    if scale == SpectralScale::Decibels {
        amplitude_to_db(&mut frames);
    }
    mean_bands(&frames)
}

/// Per-window band averages over `window_count` windows of STFT frames
///
/// Windows hold `floor(frames / window_count)` frames; trailing frames are
/// dropped. Values are linear magnitudes. The sequence is single pass.
pub fn band_vector(
    samples: &[f32],
    band_count: usize,
    window_count: usize,
) -> Result<BandVector, AnalysisError> {
    band_vector_with(&band_transform(band_count)?, samples, window_count)
}

/// [`band_vector`] with a pre-planned band transform
pub fn band_vector_with(
    stft: &StftProcessor,
    samples: &[f32],
    window_count: usize,
) -> Result<BandVector, AnalysisError> {
    if window_count == 0 {
        return Err(AnalysisError::InvalidArgument {
            name: "window_count",
            value: window_count,
        });
    }

    let frames = stft.magnitudes(samples)?;
    Ok(BandVector {
        window_size: frames.len() / window_count,
        frames,
        window_count,
        next: 0,
    })
}

/// Iterator returned by [`band_vector`]
///
/// Yields `EmptyInput` for a window with no frames, which happens when the
/// signal has fewer frames than windows.
pub struct BandVector {
    frames: Vec<SpectralFrame>,
    window_size: usize,
    window_count: usize,
    next: usize,
}

impl Iterator for BandVector {
    type Item = Result<Vec<f32>, AnalysisError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.window_count {
            return None;
        }

        let start = self.next * self.window_size;
        let end = (start + self.window_size).min(self.frames.len());
        self.next += 1;
        Some(mean_bands(&self.frames[start..end]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.window_count - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BandVector {}

/// Mean over frames of every bin except DC
fn mean_bands(frames: &[SpectralFrame]) -> Result<Vec<f32>, AnalysisError> {
    let first = frames.first().ok_or(AnalysisError::EmptyInput {
        context: "band_vector",
    })?;

    let mut sums = vec![0.0f64; first.len()];
    for frame in frames {
        for (sum, &value) in sums.iter_mut().zip(frame) {
            *sum += value as f64;
        }
    }

    let count = frames.len() as f64;
    Ok(sums.iter().skip(1).map(|&sum| (sum / count) as f32).collect())
}

/// Convert magnitudes in place to dB relative to the spectrogram peak
fn amplitude_to_db(frames: &mut [SpectralFrame]) {
    let peak = frames
        .iter()
        .flatten()
        .fold(0.0f32, |acc, &m| acc.max(m));
    let reference_db = 20.0 * peak.max(AMIN).log10();

    let mut max_db = f32::NEG_INFINITY;
    for value in frames.iter_mut().flatten() {
        *value = 20.0 * value.max(AMIN).log10() - reference_db;
        max_db = max_db.max(*value);
    }

    let floor = max_db - TOP_DB;
    for value in frames.iter_mut().flatten() {
        *value = value.max(floor);
    }
}
