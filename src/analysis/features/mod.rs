// FeatureExtractor - per-file feature vectors for sample classification
//
// Each file goes through three stages in order:
// 1. Load: decode to a mono Signal (audio::decode)
// 2. Condition: normalize to peak 1.0, then trim leading/trailing silence
// 3. Derive: build the named fields of the configured FeatureLayout
//
// Module organization:
// - types: FeatureVector and FeatureLayout
// - fft: STFT with centered, Hann-windowed frames
// - spectral: per-band averages and per-window band vectors
// - pitch: peak-picking fundamental estimate
// - mod.rs: Coordinator (FeatureExtractor)

pub mod fft;
pub mod pitch;
pub mod spectral;
mod types;

pub use pitch::{estimate_fundamental, FundamentalEstimate, PitchTracker};
pub use spectral::{
    band_averages, band_averages_with, band_transform, band_vector, band_vector_with, SpectralScale,
};
pub use types::{FeatureLayout, FeatureVector};

use std::path::Path;

use tracing::debug;

use super::signal::{normalize, root_mean_square, Signal};
use super::silence::SilenceTrimmer;
use super::window::{loudness_at, split_into, windows_of};
use self::fft::StftProcessor;
use crate::audio::read_wav;
use crate::config::{AppConfig, ExtractionConfig};
use crate::error::{AnalysisError, ExtractError};

/// FeatureExtractor coordinates conditioning and feature derivation
///
/// Holds only immutable configuration and FFT plans, so one instance can
/// serve any number of files, from any thread.
pub struct FeatureExtractor {
    config: ExtractionConfig,
    trimmer: SilenceTrimmer,
    pitch: PitchTracker,
    /// Band transform sized for `band_count`, planned once
    bands: StftProcessor,
}

impl FeatureExtractor {
    /// Create an extractor from a validated configuration
    ///
    /// # Errors
    /// `InvalidArgument` when a count in `config` is zero.
    pub fn new(config: &AppConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self {
            config: config.extraction.clone(),
            trimmer: SilenceTrimmer::new(&config.silence),
            pitch: PitchTracker::from_config(&config.pitch)?,
            bands: band_transform(config.extraction.band_count)?,
        })
    }

    pub fn layout(&self) -> FeatureLayout {
        self.config.layout
    }

    /// Decode `path` and extract its features
    pub fn extract_file(&self, path: &Path) -> Result<FeatureVector, ExtractError> {
        let signal = read_wav(path)?;
        debug!(
            path = %path.display(),
            samples = signal.len(),
            sample_rate = signal.sample_rate,
            "Decoded audio"
        );
        Ok(self.extract(&signal)?)
    }

    /// Condition then derive
    pub fn extract(&self, signal: &Signal) -> Result<FeatureVector, AnalysisError> {
        let conditioned = self.condition(signal)?;
        self.derive(&conditioned)
    }

    /// Normalize to peak 1.0 and trim leading/trailing silence
    ///
    /// # Errors
    /// `SilentSignal`/`NonFiniteSample` from normalization, `EmptyInput` when
    /// nothing is left after trimming.
    pub fn condition(&self, signal: &Signal) -> Result<Signal, AnalysisError> {
        let normalized = normalize(signal)?;
        let trimmed = self.trimmer.trim(&normalized);
        if trimmed.is_empty() {
            return Err(AnalysisError::EmptyInput { context: "trim" });
        }

        debug!(
            before = signal.len(),
            after = trimmed.len(),
            "Trimmed silence"
        );
        Ok(trimmed)
    }

    /// Build the feature vector of an already conditioned signal
    pub fn derive(&self, signal: &Signal) -> Result<FeatureVector, AnalysisError> {
        if signal.is_empty() {
            return Err(AnalysisError::EmptyInput { context: "derive" });
        }

        let mut features = FeatureVector::new();
        features.insert("duration", signal.duration_secs());

        match self.config.layout {
            FeatureLayout::Summary => self.derive_summary(signal, &mut features)?,
            FeatureLayout::Windowed => self.derive_windowed(signal, &mut features)?,
            FeatureLayout::Sectioned => self.derive_sectioned(signal, &mut features)?,
        }

        Ok(features)
    }

    fn derive_summary(
        &self,
        signal: &Signal,
        features: &mut FeatureVector,
    ) -> Result<(), AnalysisError> {
        let samples = &signal.samples;
        let window = self.config.loudness_window;
        features.insert("start_loudness", loudness_at(samples, 0, window)?);
        features.insert("mid_loudness", loudness_at(samples, samples.len() / 2, window)?);
        features.insert("end_loudness", loudness_at(samples, samples.len(), window)?);

        let fundamental = self.pitch.estimate(samples, signal.sample_rate)?;
        features.insert("fundamental_freq", fundamental.hertz);
        features.insert("fundamental_deviation", fundamental.deviation);

        let bands = band_averages_with(&self.bands, samples, SpectralScale::Decibels)?;
        for (band, value) in bands.into_iter().enumerate() {
            features.insert(format!("average_eq_{}", band), value);
        }
        Ok(())
    }

    fn derive_windowed(
        &self,
        signal: &Signal,
        features: &mut FeatureVector,
    ) -> Result<(), AnalysisError> {
        let samples = &signal.samples;
        let window_count = self.config.window_count;

        for (i, loudness) in windows_of(samples, window_count, root_mean_square)?.enumerate() {
            features.insert(format!("loudness_{}", i), loudness?);
        }

        let fundamental = self.pitch.estimate(samples, signal.sample_rate)?;
        features.insert("fundamental_in_hertz", fundamental.hertz);
        features.insert("fundamental_stddev", fundamental.deviation);

        let rows = band_vector_with(&self.bands, samples, window_count)?;
        for (i, row) in rows.enumerate() {
            for (band, value) in row?.into_iter().enumerate() {
                features.insert(format!("average_eq_{}_{}", i, band), value);
            }
        }
        Ok(())
    }

    fn derive_sectioned(
        &self,
        signal: &Signal,
        features: &mut FeatureVector,
    ) -> Result<(), AnalysisError> {
        for (i, section) in split_into(&signal.samples, self.config.section_count)?
            .into_iter()
            .enumerate()
        {
            features.insert(format!("loudness_{}", i), root_mean_square(section)?);

            let fundamental = self.pitch.estimate(section, signal.sample_rate)?;
            features.insert(format!("fundamental_{}", i), fundamental.hertz);
            features.insert(format!("fundamental_stddev_{}", i), fundamental.deviation);

            let bands = band_averages_with(&self.bands, section, SpectralScale::Decibels)?;
            for (band, value) in bands.into_iter().enumerate() {
                features.insert(format!("average_eq_{}_{}", i, band), value);
            }
        }
        Ok(())
    }
}
