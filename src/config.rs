//! Configuration management for feature extraction
//!
//! Extraction parameters are loaded from a JSON file so feature layouts can be
//! tuned without recompiling. Every field has a default, so a config file only
//! needs the keys it changes.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::analysis::features::FeatureLayout;
use crate::analysis::silence::{Threshold, DEFAULT_BIT_DEPTH};
use crate::error::AnalysisError;

/// Default config file looked up by [`AppConfig::load`]
pub const DEFAULT_CONFIG_PATH: &str = "extract_config.json";

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub extraction: ExtractionConfig,
    pub silence: SilenceConfig,
    pub pitch: PitchConfig,
}

/// Feature layout and partition sizes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Which versioned field set to emit
    pub layout: FeatureLayout,
    /// Sections for the sectioned layout (balanced split)
    pub section_count: usize,
    /// Spectral bands per spectral summary
    pub band_count: usize,
    /// Equal windows for the windowed layout (remainder dropped)
    pub window_count: usize,
    /// Window length in samples for point loudness in the summary layout
    pub loudness_window: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            layout: FeatureLayout::Sectioned,
            section_count: 10,
            band_count: 99,
            window_count: 100,
            loudness_window: 100,
        }
    }
}

/// Silence trimming parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SilenceConfig {
    pub start_threshold: Threshold,
    pub end_threshold: Threshold,
    /// Bit depth used to interpret integer-valued thresholds
    pub bit_depth: u32,
    pub samples_before: usize,
    pub samples_after: usize,
}

impl Default for SilenceConfig {
    fn default() -> Self {
        Self {
            start_threshold: Threshold::DEFAULT,
            end_threshold: Threshold::DEFAULT,
            bit_depth: DEFAULT_BIT_DEPTH,
            samples_before: 1,
            samples_after: 1,
        }
    }
}

/// Fundamental frequency search band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchConfig {
    pub fmin: f32,
    pub fmax: f32,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            fmin: 10.0,
            fmax: 1600.0,
        }
    }
}

impl AppConfig {
    /// Parse configuration from JSON, failing on malformed input
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load configuration from JSON file
    ///
    /// Falls back to the defaults (with a warning) when the file is missing
    /// or invalid.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::debug!(
                    "[Config] No config file at {:?} ({}). Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from the working directory
    pub fn load() -> Self {
        Self::load_from_file(DEFAULT_CONFIG_PATH)
    }

    /// Reject zero counts before any file is processed
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let counts = [
            ("section_count", self.extraction.section_count),
            ("band_count", self.extraction.band_count),
            ("window_count", self.extraction.window_count),
            ("loudness_window", self.extraction.loudness_window),
            ("bit_depth", self.silence.bit_depth as usize),
        ];
        for (name, value) in counts {
            if value == 0 {
                return Err(AnalysisError::InvalidArgument { name, value });
            }
        }
        Ok(())
    }
}
