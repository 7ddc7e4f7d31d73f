//! Single-link arm rotating in a vertical plane.
//!
//! State `[theta, thetadot]`, with `theta` measured from the horizontal
//! (the pendant position is `theta = -pi/2`). The arm is a uniform rod of
//! mass `m` and length `ell` driven by a torque `tau` at the joint:
//!
//! `thetaddot = 3/(m ell^2) * (tau - b thetadot - m g ell/2 cos theta)`

use crate::error::{PlantError, PlantResult};
use crate::uncertainty::Uncertainty;
use ms_core::{Real, StateVector, ensure_finite, ensure_non_negative, ensure_positive};
use ms_sim::{Dynamics, Plant};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Arm plant: `Plant` over the arm dynamics.
pub type ArmPlant = Plant<ArmDynamics, 2>;

/// Nominal arm parameters and initial conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmParams {
    /// Mass of the arm (kg)
    pub m: Real,
    /// Length of the arm (m)
    pub ell: Real,
    /// Damping coefficient (N m s)
    pub b: Real,
    /// Gravitational acceleration (m/s^2)
    pub g: Real,
    /// Sample period at which the dynamics are propagated (s)
    pub ts: Real,
    /// Torque saturation limit (N m)
    pub tau_max: Real,
    /// Initial angle (rad)
    pub theta0: Real,
    /// Initial angular rate (rad/s)
    pub thetadot0: Real,
}

impl Default for ArmParams {
    fn default() -> Self {
        Self {
            m: 0.5,
            ell: 0.3,
            b: 0.01,
            g: 9.8,
            ts: 0.01,
            tau_max: 1.0,
            theta0: 0.0,
            thetadot0: 0.0,
        }
    }
}

impl ArmParams {
    pub fn validate(&self) -> PlantResult<()> {
        ensure_positive(self.m, "arm mass m")?;
        ensure_positive(self.ell, "arm length ell")?;
        ensure_non_negative(self.b, "arm damping b")?;
        ensure_finite(self.g, "gravity g")?;
        ensure_positive(self.ts, "sample period Ts")?;
        ensure_positive(self.tau_max, "torque limit tau_max")?;
        ensure_finite(self.theta0, "theta0")?;
        ensure_finite(self.thetadot0, "thetadot0")?;
        Ok(())
    }

    pub fn initial_state(&self) -> StateVector<2> {
        StateVector::<2>::new(self.theta0, self.thetadot0)
    }
}

/// Physical constants of one arm instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArmDynamics {
    pub m: Real,
    pub ell: Real,
    pub b: Real,
    pub g: Real,
}

impl ArmDynamics {
    /// Constants exactly at their nominal values.
    pub fn nominal(params: &ArmParams) -> Self {
        Self {
            m: params.m,
            ell: params.ell,
            b: params.b,
            g: params.g,
        }
    }

    /// Constants drawn around nominal; gravity is never perturbed.
    pub fn randomized<R: Rng + ?Sized>(
        params: &ArmParams,
        uncertainty: &Uncertainty,
        rng: &mut R,
    ) -> Self {
        let m = uncertainty.perturb(params.m, rng);
        let ell = uncertainty.perturb(params.ell, rng);
        let b = uncertainty.perturb(params.b, rng);
        tracing::debug!(m, ell, b, alpha = uncertainty.alpha(), "drew arm parameters");
        Self {
            m,
            ell,
            b,
            g: params.g,
        }
    }

    /// Drawn constants must stay physical: positive mass and length,
    /// non-negative damping.
    pub fn validate(&self) -> PlantResult<()> {
        ensure_positive(self.m, "drawn arm mass m")?;
        ensure_positive(self.ell, "drawn arm length ell")?;
        ensure_non_negative(self.b, "drawn arm damping b")?;
        ensure_finite(self.g, "gravity g")?;
        Ok(())
    }

    /// Gravity torque about the joint at angle `theta`.
    pub fn gravity_torque(&self, theta: Real) -> Real {
        self.m * self.g * self.ell / 2.0 * theta.cos()
    }

    /// Kinetic plus potential energy, zero at the horizontal at rest.
    pub fn energy(&self, x: &StateVector<2>) -> Real {
        let inertia = self.m * self.ell * self.ell / 3.0;
        0.5 * inertia * x[1] * x[1] + self.m * self.g * self.ell / 2.0 * x[0].sin()
    }
}

impl Dynamics<2> for ArmDynamics {
    type Output = Real;

    fn derivatives(&self, x: &StateVector<2>, tau: Real) -> StateVector<2> {
        let theta = x[0];
        let thetadot = x[1];
        let thetaddot = (3.0 / (self.m * self.ell * self.ell))
            * (tau - self.b * thetadot - self.gravity_torque(theta));
        StateVector::<2>::new(thetadot, thetaddot)
    }

    /// Measured output: the angle only.
    fn output(&self, x: &StateVector<2>) -> Real {
        x[0]
    }
}

/// Build an arm plant with freshly drawn parameters.
pub fn build_plant<R: Rng + ?Sized>(
    params: &ArmParams,
    uncertainty: &Uncertainty,
    rng: &mut R,
) -> PlantResult<ArmPlant> {
    params.validate()?;
    let dynamics = ArmDynamics::randomized(params, uncertainty, rng);
    dynamics.validate()?;
    Plant::new(dynamics, params.initial_state(), params.ts, params.tau_max)
        .map_err(PlantError::from)
}
