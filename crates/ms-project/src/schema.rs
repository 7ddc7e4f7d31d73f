//! Run configuration schema.

use ms_plants::{ArmParams, PendulumParams};
use ms_sim::{IntegratorType, SimOptions};
use serde::{Deserialize, Serialize};

/// One simulation run: which system, how it is controlled and driven.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    pub version: u32,
    pub name: String,
    /// RNG seed for parameter randomization; drawn from entropy when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Relative parameter uncertainty.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default)]
    pub integrator: IntegratorType,
    #[serde(default)]
    pub sim: SimOptions,
    pub system: SystemDef,
    #[serde(default)]
    pub reference: ReferenceDef,
}

fn default_alpha() -> f64 {
    0.2
}

impl RunConfig {
    /// Arm driven by the designed PD controller with its coursework values.
    pub fn arm_default() -> Self {
        Self {
            version: crate::migrate::LATEST_VERSION,
            name: "Single-link arm".to_string(),
            seed: None,
            alpha: default_alpha(),
            integrator: IntegratorType::default(),
            sim: SimOptions::default(),
            system: SystemDef::Arm {
                params: ArmParams::default(),
                controller: ArmControllerDef::default(),
            },
            reference: ReferenceDef::default(),
        }
    }

    /// Cart-pendulum under successive loop closure with its coursework values.
    pub fn pendulum_default() -> Self {
        Self {
            version: crate::migrate::LATEST_VERSION,
            name: "Cart-pendulum".to_string(),
            seed: None,
            alpha: default_alpha(),
            integrator: IntegratorType::default(),
            sim: SimOptions::default(),
            system: SystemDef::Pendulum {
                params: PendulumParams::default(),
                controller: PendulumControllerDef::default(),
            },
            reference: ReferenceDef::default(),
        }
    }

    /// Sample period of the configured plant.
    pub fn ts(&self) -> f64 {
        match &self.system {
            SystemDef::Arm { params, .. } => params.ts,
            SystemDef::Pendulum { params, .. } => params.ts,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SystemDef {
    Arm {
        #[serde(default)]
        params: ArmParams,
        #[serde(default)]
        controller: ArmControllerDef,
    },
    Pendulum {
        #[serde(default)]
        params: PendulumParams,
        #[serde(default)]
        controller: PendulumControllerDef,
    },
}

impl SystemDef {
    pub fn kind(&self) -> &'static str {
        match self {
            SystemDef::Arm { .. } => "arm",
            SystemDef::Pendulum { .. } => "pendulum",
        }
    }
}

/// Arm control law. Every law saturates at `tau_max`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArmControllerDef {
    /// PD with gravity feed-forward, gains placed from a rise time.
    Designed { rise_time_s: f64, zeta: f64 },
    /// PD with gravity feed-forward and explicit gains.
    Gains { kp: f64, kd: f64 },
    /// Torque follows the reference directly.
    OpenLoop,
    /// `tau = kr r - k . x`
    StateFeedback { k: [f64; 2], kr: f64 },
    /// PID on the arm angle.
    Pid {
        kp: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ti_s: Option<f64>,
        #[serde(default)]
        td_s: f64,
        #[serde(default = "default_td_filter")]
        td_filter_s: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        integral_limit: Option<f64>,
    },
}

impl Default for ArmControllerDef {
    fn default() -> Self {
        ArmControllerDef::Designed {
            rise_time_s: 0.4,
            zeta: 0.707,
        }
    }
}

fn default_td_filter() -> f64 {
    0.05
}

/// Cart-pendulum control law. Every law saturates at `f_max`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PendulumControllerDef {
    /// Successive loop closure placed from the inner loop rise time.
    Designed {
        rise_time_s: f64,
        zeta_theta: f64,
        separation: f64,
        zeta_z: f64,
    },
    /// Successive loop closure with explicit gains.
    Gains {
        kp_z: f64,
        kd_z: f64,
        kp_th: f64,
        kd_th: f64,
    },
    /// Force follows the reference directly.
    OpenLoop,
    /// `F = kr r - k . x`
    StateFeedback { k: [f64; 4], kr: f64 },
}

impl Default for PendulumControllerDef {
    fn default() -> Self {
        PendulumControllerDef::Designed {
            rise_time_s: 0.5,
            zeta_theta: 0.707,
            separation: 10.0,
            zeta_z: 0.707,
        }
    }
}

/// Reference signal `r(t)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReferenceDef {
    Constant {
        value: f64,
    },
    /// `+amplitude` for the first half of each period, `-amplitude` after.
    Square {
        amplitude: f64,
        frequency_hz: f64,
        #[serde(default)]
        offset: f64,
    },
    Sine {
        amplitude: f64,
        frequency_hz: f64,
        #[serde(default)]
        offset: f64,
    },
    /// `initial` before `time_s`, `value` from then on.
    Step {
        #[serde(default)]
        initial: f64,
        value: f64,
        #[serde(default)]
        time_s: f64,
    },
}

impl Default for ReferenceDef {
    fn default() -> Self {
        ReferenceDef::Square {
            amplitude: 0.5,
            frequency_hz: 0.02,
            offset: 0.0,
        }
    }
}
