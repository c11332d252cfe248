//! Error types for pvirr

use thiserror::Error;

/// Main error type for pvirr operations.
///
/// Only malformed input and unreachable states are errors. Physical-range
/// anomalies are reported through `tracing` and the out-of-range bookkeeping
/// on each component, never through this type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Empty series: {name}")]
    EmptySeries { name: &'static str },

    #[error("Series length mismatch for {name}: expected {expected}, got {actual}")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Conflicting inputs: {0}")]
    ConflictingInputs(String),

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Unreachable state: {0}")]
    Unreachable(String),

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for [`Error::InvalidParameter`].
    pub fn invalid(name: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for pvirr operations
pub type Result<T> = std::result::Result<T, Error>;
