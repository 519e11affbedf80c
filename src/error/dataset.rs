// Dataset assembly error types and constants

use crate::error::ErrorCode;
use std::fmt;

/// Dataset error code constants
///
/// Error code range: 3001-3005
pub struct DatasetErrorCodes {}

impl DatasetErrorCodes {
    /// Feature file could not be read
    pub const IO: i32 = 3001;

    /// Feature file is not a valid path -> features JSON map
    pub const PARSE: i32 = 3002;

    /// Feature map contains no samples
    pub const EMPTY: i32 = 3003;

    /// A sample lacks a feature present in the reference key set
    pub const MISSING_FEATURE: i32 = 3004;

    /// A sample path has no parent folder to take the class from
    pub const MISSING_CLASS: i32 = 3005;
}

/// Errors raised while assembling a feature table
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetError {
    Io { reason: String },
    Parse { reason: String },
    Empty,
    MissingFeature { sample: String, feature: String },
    MissingClass { sample: String },
}

impl ErrorCode for DatasetError {
    fn code(&self) -> i32 {
        match self {
            DatasetError::Io { .. } => DatasetErrorCodes::IO,
            DatasetError::Parse { .. } => DatasetErrorCodes::PARSE,
            DatasetError::Empty => DatasetErrorCodes::EMPTY,
            DatasetError::MissingFeature { .. } => DatasetErrorCodes::MISSING_FEATURE,
            DatasetError::MissingClass { .. } => DatasetErrorCodes::MISSING_CLASS,
        }
    }

    fn message(&self) -> String {
        match self {
            DatasetError::Io { reason } => format!("Failed to read features: {}", reason),
            DatasetError::Parse { reason } => format!("Invalid feature JSON: {}", reason),
            DatasetError::Empty => "Feature map contains no samples".to_string(),
            DatasetError::MissingFeature { sample, feature } => {
                format!("Sample {} is missing feature {}", sample, feature)
            }
            DatasetError::MissingClass { sample } => {
                format!("Sample {} has no parent folder to use as its class", sample)
            }
        }
    }
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DatasetError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for DatasetError {}

impl From<std::io::Error> for DatasetError {
    fn from(err: std::io::Error) -> Self {
        DatasetError::Io {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for DatasetError {
    fn from(err: serde_json::Error) -> Self {
        DatasetError::Parse {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_error_codes() {
        assert_eq!(DatasetError::Empty.code(), DatasetErrorCodes::EMPTY);
        assert_eq!(
            DatasetError::MissingFeature {
                sample: "a".to_string(),
                feature: "duration".to_string()
            }
            .code(),
            DatasetErrorCodes::MISSING_FEATURE
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::other("test io error");
        let err: DatasetError = io_err.into();
        match err {
            DatasetError::Io { reason } => assert!(reason.contains("test io error")),
            _ => panic!("Expected Io"),
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: DatasetError = json_err.into();
        assert_eq!(err.code(), DatasetErrorCodes::PARSE);
    }
}
