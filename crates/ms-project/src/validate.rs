//! Run configuration validation.

use crate::schema::{ArmControllerDef, PendulumControllerDef, ReferenceDef, RunConfig, SystemDef};
use ms_plants::PlantError;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid parameters for {system}: {source}")]
    Parameters {
        system: &'static str,
        #[source]
        source: PlantError,
    },

    #[error("Invalid timing: {reason}")]
    Timing { reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_config(config: &RunConfig) -> Result<(), ValidationError> {
    if config.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: config.version,
        });
    }

    if config.name.trim().is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "name".to_string(),
            value: format!("{:?}", config.name),
            reason: "must not be empty".to_string(),
        });
    }

    if !(0.0..1.0).contains(&config.alpha) {
        return Err(invalid("alpha", config.alpha, "must be in [0, 1)"));
    }

    validate_system(&config.system)?;

    config
        .sim
        .schedule(config.ts())
        .map_err(|e| ValidationError::Timing {
            reason: e.to_string(),
        })?;

    validate_reference(&config.reference)
}

fn validate_system(system: &SystemDef) -> Result<(), ValidationError> {
    let kind = system.kind();
    let parameters = |source: PlantError| ValidationError::Parameters {
        system: kind,
        source,
    };

    match system {
        SystemDef::Arm { params, controller } => {
            params.validate().map_err(parameters)?;
            match controller {
                ArmControllerDef::Designed { rise_time_s, zeta } => {
                    positive("controller.rise_time_s", *rise_time_s)?;
                    positive("controller.zeta", *zeta)?;
                }
                ArmControllerDef::Gains { kp, kd } => {
                    finite("controller.kp", *kp)?;
                    finite("controller.kd", *kd)?;
                }
                ArmControllerDef::OpenLoop => {}
                ArmControllerDef::StateFeedback { k, kr } => {
                    for v in k {
                        finite("controller.k", *v)?;
                    }
                    finite("controller.kr", *kr)?;
                }
                ArmControllerDef::Pid {
                    kp,
                    ti_s,
                    td_s,
                    td_filter_s,
                    integral_limit,
                } => {
                    finite("controller.kp", *kp)?;
                    if let Some(ti) = ti_s {
                        positive("controller.ti_s", *ti)?;
                    }
                    if td_s.is_nan() || *td_s < 0.0 {
                        return Err(invalid("controller.td_s", *td_s, "must be non-negative"));
                    }
                    positive("controller.td_filter_s", *td_filter_s)?;
                    if let Some(limit) = integral_limit {
                        positive("controller.integral_limit", *limit)?;
                    }
                }
            }
        }
        SystemDef::Pendulum { params, controller } => {
            params.validate().map_err(parameters)?;
            match controller {
                PendulumControllerDef::Designed {
                    rise_time_s,
                    zeta_theta,
                    separation,
                    zeta_z,
                } => {
                    positive("controller.rise_time_s", *rise_time_s)?;
                    positive("controller.zeta_theta", *zeta_theta)?;
                    positive("controller.separation", *separation)?;
                    positive("controller.zeta_z", *zeta_z)?;
                }
                PendulumControllerDef::Gains {
                    kp_z,
                    kd_z,
                    kp_th,
                    kd_th,
                } => {
                    finite("controller.kp_z", *kp_z)?;
                    finite("controller.kd_z", *kd_z)?;
                    finite("controller.kp_th", *kp_th)?;
                    finite("controller.kd_th", *kd_th)?;
                }
                PendulumControllerDef::OpenLoop => {}
                PendulumControllerDef::StateFeedback { k, kr } => {
                    for v in k {
                        finite("controller.k", *v)?;
                    }
                    finite("controller.kr", *kr)?;
                }
            }
        }
    }
    Ok(())
}

fn validate_reference(reference: &ReferenceDef) -> Result<(), ValidationError> {
    match reference {
        ReferenceDef::Constant { value } => finite("reference.value", *value),
        ReferenceDef::Square {
            amplitude,
            frequency_hz,
            offset,
        }
        | ReferenceDef::Sine {
            amplitude,
            frequency_hz,
            offset,
        } => {
            finite("reference.amplitude", *amplitude)?;
            positive("reference.frequency_hz", *frequency_hz)?;
            finite("reference.offset", *offset)
        }
        ReferenceDef::Step {
            initial,
            value,
            time_s,
        } => {
            finite("reference.initial", *initial)?;
            finite("reference.value", *value)?;
            finite("reference.time_s", *time_s)
        }
    }
}

fn invalid(field: &str, value: f64, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, value, "must be finite"))
    }
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be positive"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        validate_config(&RunConfig::arm_default()).unwrap();
        validate_config(&RunConfig::pendulum_default()).unwrap();
    }

    #[test]
    fn alpha_out_of_range_rejected() {
        let mut config = RunConfig::arm_default();
        config.alpha = 1.0;
        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::InvalidValue { field, .. }) if field == "alpha"
        ));
    }

    #[test]
    fn future_version_rejected() {
        let mut config = RunConfig::pendulum_default();
        config.version = crate::migrate::LATEST_VERSION + 1;
        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn plot_period_not_multiple_of_ts_rejected() {
        let mut config = RunConfig::arm_default();
        config.sim.t_plot = 0.015;
        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::Timing { .. })
        ));
    }

    #[test]
    fn bad_physical_parameter_rejected() {
        let mut config = RunConfig::pendulum_default();
        if let SystemDef::Pendulum { params, .. } = &mut config.system {
            params.m2 = -1.0;
        }
        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::Parameters {
                system: "pendulum",
                ..
            })
        ));
    }

    #[test]
    fn zero_frequency_reference_rejected() {
        let mut config = RunConfig::arm_default();
        config.reference = ReferenceDef::Sine {
            amplitude: 1.0,
            frequency_hz: 0.0,
            offset: 0.0,
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn pid_requires_positive_filter() {
        let mut config = RunConfig::arm_default();
        if let SystemDef::Arm { controller, .. } = &mut config.system {
            *controller = ArmControllerDef::Pid {
                kp: 1.0,
                ti_s: Some(2.0),
                td_s: 0.1,
                td_filter_s: 0.0,
                integral_limit: None,
            };
        }
        assert!(validate_config(&config).is_err());
    }
}
