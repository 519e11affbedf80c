// Error types for the feature extraction pipeline
//
// Each layer owns an error enum with stable numeric codes so the batch
// report and the CLI can surface failures without string matching.

mod analysis;
mod dataset;
mod decode;

pub use analysis::{AnalysisError, AnalysisErrorCodes};
pub use dataset::{DatasetError, DatasetErrorCodes};
pub use decode::{DecodeError, DecodeErrorCodes};

use std::fmt;
use std::path::Path;

use tracing::error;

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}

/// Failure of a single file's feature extraction
///
/// Wraps the decoder failure or the analysis failure that aborted the file.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractError {
    Decode(DecodeError),
    Analysis(AnalysisError),
}

impl ErrorCode for ExtractError {
    fn code(&self) -> i32 {
        match self {
            ExtractError::Decode(err) => err.code(),
            ExtractError::Analysis(err) => err.code(),
        }
    }

    fn message(&self) -> String {
        match self {
            ExtractError::Decode(err) => err.message(),
            ExtractError::Analysis(err) => err.message(),
        }
    }
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::Decode(err) => fmt::Display::fmt(err, f),
            ExtractError::Analysis(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for ExtractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExtractError::Decode(err) => Some(err),
            ExtractError::Analysis(err) => Some(err),
        }
    }
}

impl From<DecodeError> for ExtractError {
    fn from(err: DecodeError) -> Self {
        ExtractError::Decode(err)
    }
}

impl From<AnalysisError> for ExtractError {
    fn from(err: AnalysisError) -> Self {
        ExtractError::Analysis(err)
    }
}

/// Log a per-file extraction failure with structured context
///
/// Used by the batch layer, which records the failure and moves on to the
/// next file.
pub fn log_extract_error(path: &Path, err: &ExtractError) {
    error!(
        path = %path.display(),
        code = err.code(),
        "Failed to run on {}: {}",
        path.display(),
        err.message()
    );
}
