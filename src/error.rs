//! Error types for host-side validation.
//!
//! Kernels never fail: misses and degenerate rays travel through the pipeline
//! as sentinel data. These errors are raised before a launch, when the caller
//! hands over buffers or parameters that cannot describe a valid run.

use thiserror::Error;

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors detected while preparing a pipeline step
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// A per-ray buffer does not match the population size.
    #[error("buffer `{name}` holds {actual} entries, expected {expected}")]
    LengthMismatch {
        /// Buffer name
        name: &'static str,
        /// Required length
        expected: usize,
        /// Length found
        actual: usize,
    },

    /// A scalar parameter is out of range.
    #[error("invalid parameter `{name}`: {value} ({reason})")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f32,
        /// Accepted range
        reason: &'static str,
    },
}

/// Errors raised while loading or validating a simulation configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON for [`crate::SimulationConfig`].
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A parameter failed validation.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] PipelineError),

    /// Any other rejected setting.
    #[error("invalid configuration: {0}")]
    Other(String),
}

/// Check that `len` matches `expected`, naming the buffer on failure.
pub fn check_len(name: &'static str, expected: usize, len: usize) -> PipelineResult<()> {
    if len == expected {
        Ok(())
    } else {
        Err(PipelineError::LengthMismatch {
            name,
            expected,
            actual: len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_len_message() {
        assert!(check_len("times", 4, 4).is_ok());
        let err = check_len("times", 4, 3).unwrap_err();
        assert_eq!(err.to_string(), "buffer `times` holds 3 entries, expected 4");
    }
}
