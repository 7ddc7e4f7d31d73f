//! Error types for plant construction.

use thiserror::Error;

pub type PlantResult<T> = Result<T, PlantError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlantError {
    #[error("Invalid physical parameter {what}: {value}")]
    InvalidParameter { what: &'static str, value: f64 },

    #[error("Simulation error: {0}")]
    Sim(#[from] ms_sim::SimError),

    #[error("Control error: {0}")]
    Control(#[from] ms_controls::ControlError),
}

impl From<ms_core::CoreError> for PlantError {
    fn from(e: ms_core::CoreError) -> Self {
        match e {
            ms_core::CoreError::NonFinite { what, value }
            | ms_core::CoreError::OutOfRange { what, value } => {
                PlantError::InvalidParameter { what, value }
            }
            other => PlantError::Sim(other.into()),
        }
    }
}
