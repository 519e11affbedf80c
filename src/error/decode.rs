// Decoder error types and constants

use crate::error::ErrorCode;
use std::fmt;

/// Decoder error code constants
///
/// Error code range: 2001-2004
pub struct DecodeErrorCodes {}

impl DecodeErrorCodes {
    /// File could not be opened or is not a WAV container
    pub const OPEN: i32 = 2001;

    /// Sample data could not be read
    pub const READ: i32 = 2002;

    /// Sample format is not supported
    pub const UNSUPPORTED_FORMAT: i32 = 2003;

    /// Header declares zero channels
    pub const NO_CHANNELS: i32 = 2004;
}

/// Errors raised while decoding an audio file into a `Signal`
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    Open { path: String, reason: String },
    Read { path: String, reason: String },
    UnsupportedFormat { path: String, bits_per_sample: u16 },
    NoChannels { path: String },
}

impl ErrorCode for DecodeError {
    fn code(&self) -> i32 {
        match self {
            DecodeError::Open { .. } => DecodeErrorCodes::OPEN,
            DecodeError::Read { .. } => DecodeErrorCodes::READ,
            DecodeError::UnsupportedFormat { .. } => DecodeErrorCodes::UNSUPPORTED_FORMAT,
            DecodeError::NoChannels { .. } => DecodeErrorCodes::NO_CHANNELS,
        }
    }

    fn message(&self) -> String {
        match self {
            DecodeError::Open { path, reason } => {
                format!("Failed to open {}: {}", path, reason)
            }
            DecodeError::Read { path, reason } => {
                format!("Error reading {}: {}", path, reason)
            }
            DecodeError::UnsupportedFormat {
                path,
                bits_per_sample,
            } => {
                format!(
                    "Unsupported bits_per_sample={} for {}",
                    bits_per_sample, path
                )
            }
            DecodeError::NoChannels { path } => format!("{} has zero channels", path),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DecodeError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for DecodeError {}
