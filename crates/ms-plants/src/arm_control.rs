//! PD control of the arm angle with gravity feed-forward.
//!
//! `tau = m g ell/2 cos(theta) + kp (theta_r - theta) - kd thetadot`
//!
//! The feed-forward term uses nominal parameters; with a perturbed plant the
//! residual gravity torque shows up as a steady-state angle error.

use crate::arm::ArmParams;
use crate::error::PlantResult;
use ms_controls::{Controller, LoopGains, SecondOrderPlant, SecondOrderSpec};
use ms_core::{Real, StateVector, saturate};
use serde::{Deserialize, Serialize};

/// Arm angle controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmController {
    pub kp: Real,
    pub kd: Real,
    /// Nominal `m g ell / 2` used for gravity feed-forward.
    pub gravity_ff: Real,
    /// Torque saturation limit.
    pub tau_max: Real,
}

impl ArmController {
    /// Controller with explicit gains.
    pub fn new(params: &ArmParams, gains: LoopGains) -> PlantResult<Self> {
        params.validate()?;
        Ok(Self {
            kp: gains.kp,
            kd: gains.kd,
            gravity_ff: params.m * params.g * params.ell / 2.0,
            tau_max: params.tau_max,
        })
    }

    /// Controller with gains placed for the given rise time and damping.
    ///
    /// After feed-forward cancellation the linearized loop is
    /// `thetaddot + 3b/(m ell^2) thetadot = 3/(m ell^2) tau`.
    pub fn design(params: &ArmParams, spec: &SecondOrderSpec) -> PlantResult<Self> {
        params.validate()?;
        let inertia_gain = 3.0 / (params.m * params.ell * params.ell);
        let plant = SecondOrderPlant {
            b0: inertia_gain,
            a1: params.b * inertia_gain,
            a0: 0.0,
        };
        let gains = plant.place(spec)?;
        Self::new(params, gains)
    }

    /// Unsaturated torque.
    pub fn raw(&self, theta_r: Real, x: &StateVector<2>) -> Real {
        let theta = x[0];
        let thetadot = x[1];
        self.gravity_ff * theta.cos() + self.kp * (theta_r - theta) - self.kd * thetadot
    }
}

impl Controller<2> for ArmController {
    fn compute(&mut self, theta_r: Real, x: &StateVector<2>) -> Real {
        saturate(self.raw(theta_r, x), self.tau_max)
    }
}
