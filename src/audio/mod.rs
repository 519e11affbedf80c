// Audio module - decoding audio files into mono signals

pub mod decode;

pub use decode::{read_wav, read_wav_from};
