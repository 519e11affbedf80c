//! WAV decoding into mono [`Signal`]s.
//!
//! Integer PCM is scaled by 2^(bits - 1) so full scale maps to ±1.0.
//! Multi-channel files are downmixed by averaging channels. The native
//! sample rate is kept.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::analysis::signal::Signal;
use crate::error::DecodeError;

/// Decode a WAV file from disk
pub fn read_wav(path: &Path) -> Result<Signal, DecodeError> {
    let name = path.display().to_string();
    let file = File::open(path).map_err(|err| DecodeError::Open {
        path: name.clone(),
        reason: err.to_string(),
    })?;
    read_wav_from(BufReader::new(file), &name)
}

/// Decode a WAV stream; `name` is only used in error messages
pub fn read_wav_from<R: Read>(reader: R, name: &str) -> Result<Signal, DecodeError> {
    let mut reader = hound::WavReader::new(reader).map_err(|err| DecodeError::Open {
        path: name.to_string(),
        reason: err.to_string(),
    })?;
    let spec = reader.spec();
    check_format(&spec, name)?;

    let read_error = |err: hound::Error| DecodeError::Read {
        path: name.to_string(),
        reason: err.to_string(),
    };

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|sample| sample.map_err(read_error))
            .collect::<Result<Vec<f32>, _>>()?,
        hound::SampleFormat::Int => {
            let full_scale = (1i64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
            match spec.bits_per_sample {
                8 => reader
                    .samples::<i8>()
                    .map(|sample| sample.map(|v| v as f32 / full_scale).map_err(read_error))
                    .collect::<Result<Vec<f32>, _>>()?,
                16 => reader
                    .samples::<i16>()
                    .map(|sample| sample.map(|v| v as f32 / full_scale).map_err(read_error))
                    .collect::<Result<Vec<f32>, _>>()?,
                24 | 32 => reader
                    .samples::<i32>()
                    .map(|sample| sample.map(|v| v as f32 / full_scale).map_err(read_error))
                    .collect::<Result<Vec<f32>, _>>()?,
                bits => return Err(unsupported(name, bits)),
            }
        }
    };

    Ok(Signal::new(
        downmix(samples, spec.channels as usize),
        spec.sample_rate,
    ))
}

/// Reject layouts the sample loop cannot decode
fn check_format(spec: &hound::WavSpec, name: &str) -> Result<(), DecodeError> {
    if spec.channels == 0 {
        return Err(DecodeError::NoChannels {
            path: name.to_string(),
        });
    }

    match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Float, 32) | (hound::SampleFormat::Int, 8 | 16 | 24 | 32) => Ok(()),
        (_, bits) => Err(unsupported(name, bits)),
    }
}

fn unsupported(name: &str, bits_per_sample: u16) -> DecodeError {
    DecodeError::UnsupportedFormat {
        path: name.to_string(),
        bits_per_sample,
    }
}

fn downmix(samples: Vec<f32>, channels: usize) -> Vec<f32> {
    if channels == 1 {
        return samples;
    }

    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}
