// Timbre Features - audio feature extraction for sample classification
// Decodes WAV files, trims silence and emits named loudness, pitch and
// spectral features per file, plus the dataset assembly that feeds a
// classifier.

pub mod analysis;
pub mod audio;
pub mod batch;
pub mod config;
pub mod dataset;
pub mod error;

pub use analysis::{FeatureExtractor, FeatureLayout, FeatureVector, Signal};
pub use batch::{BatchExtractor, BatchReport, FeatureMap};
pub use config::AppConfig;
pub use dataset::{DatasetCache, FeatureTable};
pub use error::{AnalysisError, DatasetError, DecodeError, ErrorCode, ExtractError};
