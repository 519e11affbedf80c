// Analysis error types and constants

use crate::error::ErrorCode;
use std::fmt;

/// Analysis error code constants
///
/// Error code range: 1001-1004
pub struct AnalysisErrorCodes {}

impl AnalysisErrorCodes {
    /// A statistic or transform received a zero-length signal
    pub const EMPTY_INPUT: i32 = 1001;

    /// Peak amplitude was zero during normalization
    pub const SILENT_SIGNAL: i32 = 1002;

    /// A window, band or section count was zero
    pub const INVALID_ARGUMENT: i32 = 1003;

    /// A sample was NaN or infinite during normalization
    pub const NON_FINITE_SAMPLE: i32 = 1004;
}

/// Signal-processing errors
///
/// Every variant aborts the feature computation of the current file.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Zero-length input reached an operation that needs samples
    EmptyInput { context: &'static str },

    /// Signal has a peak amplitude of zero
    SilentSignal,

    /// Count argument must be positive
    InvalidArgument { name: &'static str, value: usize },

    /// Signal contains NaN or infinite samples
    NonFiniteSample { index: usize },
}

impl ErrorCode for AnalysisError {
    fn code(&self) -> i32 {
        match self {
            AnalysisError::EmptyInput { .. } => AnalysisErrorCodes::EMPTY_INPUT,
            AnalysisError::SilentSignal => AnalysisErrorCodes::SILENT_SIGNAL,
            AnalysisError::InvalidArgument { .. } => AnalysisErrorCodes::INVALID_ARGUMENT,
            AnalysisError::NonFiniteSample { .. } => AnalysisErrorCodes::NON_FINITE_SAMPLE,
        }
    }

    fn message(&self) -> String {
        match self {
            AnalysisError::EmptyInput { context } => {
                format!("Empty input passed to {}", context)
            }
            AnalysisError::SilentSignal => {
                "Signal is silent (peak amplitude is zero)".to_string()
            }
            AnalysisError::InvalidArgument { name, value } => {
                format!("{} must be greater than 0 (got {})", name, value)
            }
            AnalysisError::NonFiniteSample { index } => {
                format!("Non-finite sample at index {}", index)
            }
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AnalysisError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for AnalysisError {}
