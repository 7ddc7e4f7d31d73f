//! Error types for control system operations.

use thiserror::Error;

/// Result type for control system operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur in control system operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// State index outside the plant dimension.
    #[error("State index {index} out of range for dimension {dim}")]
    IndexOob { index: usize, dim: usize },

    /// Gain design has no solution for the requested specification.
    #[error("Gain design failed: {what}")]
    Design { what: String },

    #[error(transparent)]
    Core(#[from] ms_core::CoreError),
}
