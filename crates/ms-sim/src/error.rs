//! Error types for simulation operations.

use thiserror::Error;

/// Errors encountered while configuring or running a simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invalid timing: {what}")]
    InvalidTiming { what: String },

    #[error("Non-finite {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Core error: {0}")]
    Core(#[from] ms_core::CoreError),
}

pub type SimResult<T> = Result<T, SimError>;
