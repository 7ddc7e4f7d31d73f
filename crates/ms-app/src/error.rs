//! Error types for the ms-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates and
/// gives the CLI one error interface.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Failed to read config file: {path}")]
    ConfigFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config validation failed: {0}")]
    Validation(String),

    #[error("Unknown system: {0}")]
    UnknownSystem(String),

    #[error("Plant error: {0}")]
    Plant(String),

    #[error("Controller error: {0}")]
    Control(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ms-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<ms_project::ProjectError> for AppError {
    fn from(err: ms_project::ProjectError) -> Self {
        match err {
            ms_project::ProjectError::Validation(e) => AppError::Validation(e.to_string()),
            other => AppError::Config(other.to_string()),
        }
    }
}

impl From<ms_project::ValidationError> for AppError {
    fn from(err: ms_project::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<ms_plants::PlantError> for AppError {
    fn from(err: ms_plants::PlantError) -> Self {
        AppError::Plant(err.to_string())
    }
}

impl From<ms_controls::ControlError> for AppError {
    fn from(err: ms_controls::ControlError) -> Self {
        AppError::Control(err.to_string())
    }
}

impl From<ms_sim::SimError> for AppError {
    fn from(err: ms_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}
