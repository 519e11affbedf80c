// Analysis module - DSP building blocks for per-file feature extraction
//
// Pipeline for one decoded file:
// - signal: RMS and peak normalization
// - silence: leading/trailing silence trimming
// - window: sections, fixed windows and centered windows for loudness
// - features: STFT, spectral bands, pitch and the FeatureExtractor coordinator

pub mod features;
pub mod signal;
pub mod silence;
pub mod window;

pub use features::{FeatureExtractor, FeatureLayout, FeatureVector};
pub use signal::{normalize, root_mean_square, Signal};
pub use silence::{SilenceTrimmer, Threshold};
pub use window::{loudness_at, loudness_vector, split_into, window_around, windows_of, Window};
