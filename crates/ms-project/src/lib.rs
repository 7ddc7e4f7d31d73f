//! ms-project: run configuration file format and validation.

pub mod migrate;
pub mod schema;
pub mod validate;

use std::path::Path;

pub use migrate::{LATEST_VERSION, migrate_to_latest};
pub use schema::*;
pub use validate::{ValidationError, validate_config};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Migration error: {what}")]
    Migration { what: String },

    #[error("Unsupported file extension: {path}")]
    Extension { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// File formats a run configuration can be stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Format from the file extension (`.yaml`, `.yml`, `.json`).
    pub fn from_path(path: &Path) -> ProjectResult<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => Ok(ConfigFormat::Yaml),
            Some("json") => Ok(ConfigFormat::Json),
            _ => Err(ProjectError::Extension {
                path: path.display().to_string(),
            }),
        }
    }
}

/// Parse, migrate and validate a configuration from text.
pub fn parse(content: &str, format: ConfigFormat) -> ProjectResult<RunConfig> {
    let config: RunConfig = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        ConfigFormat::Json => serde_json::from_str(content)?,
    };
    let config = migrate_to_latest(config)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validate and render a configuration as text.
pub fn render(config: &RunConfig, format: ConfigFormat) -> ProjectResult<String> {
    validate_config(config)?;
    Ok(match format {
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
    })
}

/// Load a configuration, choosing the format by extension.
pub fn load(path: &Path) -> ProjectResult<RunConfig> {
    let format = ConfigFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    parse(&content, format)
}

/// Save a configuration, choosing the format by extension.
pub fn save(path: &Path, config: &RunConfig) -> ProjectResult<()> {
    let format = ConfigFormat::from_path(path)?;
    std::fs::write(path, render(config, format)?)?;
    Ok(())
}

pub fn load_yaml(path: &Path) -> ProjectResult<RunConfig> {
    parse(&std::fs::read_to_string(path)?, ConfigFormat::Yaml)
}

pub fn save_yaml(path: &Path, config: &RunConfig) -> ProjectResult<()> {
    std::fs::write(path, render(config, ConfigFormat::Yaml)?)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<RunConfig> {
    parse(&std::fs::read_to_string(path)?, ConfigFormat::Json)
}

pub fn save_json(path: &Path, config: &RunConfig) -> ProjectResult<()> {
    std::fs::write(path, render(config, ConfigFormat::Json)?)?;
    Ok(())
}
