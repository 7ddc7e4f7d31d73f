//! Config loading, saving, validation and introspection.

use std::path::Path;

use ms_project::{ArmControllerDef, PendulumControllerDef, RunConfig, SystemDef};

use crate::error::{AppError, AppResult};

/// Summary of a configuration for listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSummary {
    pub name: String,
    pub system: &'static str,
    pub controller: &'static str,
    pub seed: Option<u64>,
    pub alpha: f64,
    pub ts: f64,
    pub t_end: f64,
    pub samples: usize,
}

/// Load a config file (YAML or JSON by extension).
pub fn load_config(path: &Path) -> AppResult<RunConfig> {
    if !path.exists() {
        return Err(AppError::ConfigFileRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        });
    }
    Ok(ms_project::load(path)?)
}

/// Save a config file (YAML or JSON by extension).
pub fn save_config(path: &Path, config: &RunConfig) -> AppResult<()> {
    Ok(ms_project::save(path, config)?)
}

pub fn validate_config(config: &RunConfig) -> AppResult<()> {
    Ok(ms_project::validate_config(config)?)
}

/// Default configuration for a system by name (`arm` or `pendulum`).
pub fn default_config(system: &str) -> AppResult<RunConfig> {
    match system.to_ascii_lowercase().as_str() {
        "arm" => Ok(RunConfig::arm_default()),
        "pendulum" => Ok(RunConfig::pendulum_default()),
        other => Err(AppError::UnknownSystem(other.to_string())),
    }
}

/// Describe a validated configuration.
pub fn summarize(config: &RunConfig) -> AppResult<ConfigSummary> {
    let schedule = config.sim.schedule(config.ts())?;
    let controller = match &config.system {
        SystemDef::Arm { controller, .. } => match controller {
            ArmControllerDef::Designed { .. } => "designed",
            ArmControllerDef::Gains { .. } => "gains",
            ArmControllerDef::OpenLoop => "open_loop",
            ArmControllerDef::StateFeedback { .. } => "state_feedback",
            ArmControllerDef::Pid { .. } => "pid",
        },
        SystemDef::Pendulum { controller, .. } => match controller {
            PendulumControllerDef::Designed { .. } => "designed",
            PendulumControllerDef::Gains { .. } => "gains",
            PendulumControllerDef::OpenLoop => "open_loop",
            PendulumControllerDef::StateFeedback { .. } => "state_feedback",
        },
    };
    Ok(ConfigSummary {
        name: config.name.clone(),
        system: config.system.kind(),
        controller,
        seed: config.seed,
        alpha: config.alpha,
        ts: config.ts(),
        t_end: config.sim.t_end,
        samples: schedule.samples,
    })
}
