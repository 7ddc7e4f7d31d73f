//! Inverted pendulum on a cart.
//!
//! State `[z, theta, zdot, thetadot]`: cart position, rod angle from the
//! upright, and their rates. The rod is uniform with mass `m1` and length
//! `ell`; the cart has mass `m2`, viscous friction `b`, and is pushed by a
//! horizontal force `F`. The coupled equations are written in mass-matrix
//! form and solved for the accelerations at each derivative evaluation.

use crate::error::{PlantError, PlantResult};
use crate::uncertainty::Uncertainty;
use ms_core::{Real, StateVector, ensure_finite, ensure_non_negative, ensure_positive};
use ms_sim::{Dynamics, Plant};
use nalgebra::{Matrix2, Vector2};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Cart-pendulum plant: `Plant` over the pendulum dynamics.
pub type PendulumPlant = Plant<PendulumDynamics, 4>;

/// Nominal cart-pendulum parameters and initial conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PendulumParams {
    /// Mass of the rod (kg)
    pub m1: Real,
    /// Mass of the cart (kg)
    pub m2: Real,
    /// Length of the rod (m)
    pub ell: Real,
    /// Cart friction coefficient (N s)
    pub b: Real,
    /// Gravitational acceleration (m/s^2)
    pub g: Real,
    /// Sample period at which the dynamics are propagated (s)
    pub ts: Real,
    /// Force saturation limit (N)
    pub f_max: Real,
    pub z0: Real,
    pub theta0: Real,
    pub zdot0: Real,
    pub thetadot0: Real,
}

impl Default for PendulumParams {
    fn default() -> Self {
        Self {
            m1: 0.25,
            m2: 1.0,
            ell: 1.0,
            b: 0.05,
            g: 9.8,
            ts: 0.01,
            f_max: 5.0,
            z0: 0.0,
            theta0: 0.0,
            zdot0: 0.0,
            thetadot0: 0.0,
        }
    }
}

impl PendulumParams {
    pub fn validate(&self) -> PlantResult<()> {
        ensure_positive(self.m1, "rod mass m1")?;
        ensure_positive(self.m2, "cart mass m2")?;
        ensure_positive(self.ell, "rod length ell")?;
        ensure_non_negative(self.b, "cart friction b")?;
        ensure_finite(self.g, "gravity g")?;
        ensure_positive(self.ts, "sample period Ts")?;
        ensure_positive(self.f_max, "force limit F_max")?;
        for (v, what) in [
            (self.z0, "z0"),
            (self.theta0, "theta0"),
            (self.zdot0, "zdot0"),
            (self.thetadot0, "thetadot0"),
        ] {
            ensure_finite(v, what)?;
        }
        Ok(())
    }

    pub fn initial_state(&self) -> StateVector<4> {
        StateVector::<4>::new(self.z0, self.theta0, self.zdot0, self.thetadot0)
    }
}

/// Physical constants of one cart-pendulum instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendulumDynamics {
    pub m1: Real,
    pub m2: Real,
    pub ell: Real,
    pub b: Real,
    pub g: Real,
}

impl PendulumDynamics {
    /// Constants exactly at their nominal values.
    pub fn nominal(params: &PendulumParams) -> Self {
        Self {
            m1: params.m1,
            m2: params.m2,
            ell: params.ell,
            b: params.b,
            g: params.g,
        }
    }

    /// Constants drawn around nominal; gravity is never perturbed.
    pub fn randomized<R: Rng + ?Sized>(
        params: &PendulumParams,
        uncertainty: &Uncertainty,
        rng: &mut R,
    ) -> Self {
        let m1 = uncertainty.perturb(params.m1, rng);
        let m2 = uncertainty.perturb(params.m2, rng);
        let ell = uncertainty.perturb(params.ell, rng);
        let b = uncertainty.perturb(params.b, rng);
        tracing::debug!(m1, m2, ell, b, alpha = uncertainty.alpha(), "drew pendulum parameters");
        Self {
            m1,
            m2,
            ell,
            b,
            g: params.g,
        }
    }

    /// Drawn constants must stay physical.
    pub fn validate(&self) -> PlantResult<()> {
        ensure_positive(self.m1, "drawn rod mass m1")?;
        ensure_positive(self.m2, "drawn cart mass m2")?;
        ensure_positive(self.ell, "drawn rod length ell")?;
        ensure_non_negative(self.b, "drawn cart friction b")?;
        ensure_finite(self.g, "gravity g")?;
        Ok(())
    }

    /// Generalized mass matrix at rod angle `theta`.
    pub fn mass_matrix(&self, theta: Real) -> Matrix2<Real> {
        let coupling = self.m1 * self.ell / 2.0 * theta.cos();
        Matrix2::new(
            self.m1 + self.m2,
            coupling,
            coupling,
            self.m1 * self.ell * self.ell / 3.0,
        )
    }

    /// Generalized forces: centripetal, applied, friction and gravity terms.
    pub fn forcing(&self, x: &StateVector<4>, force: Real) -> Vector2<Real> {
        let theta = x[1];
        let zdot = x[2];
        let thetadot = x[3];
        Vector2::new(
            self.m1 * self.ell / 2.0 * thetadot * thetadot * theta.sin() + force - self.b * zdot,
            self.m1 * self.g * self.ell / 2.0 * theta.sin(),
        )
    }

    /// Accelerations `[zddot, thetaddot]`.
    ///
    /// The mass matrix is positive definite for positive masses and length; a
    /// singular matrix can only come from non-finite state and yields NaN.
    pub fn accelerations(&self, x: &StateVector<4>, force: Real) -> Vector2<Real> {
        match self.mass_matrix(x[1]).try_inverse() {
            Some(inv) => inv * self.forcing(x, force),
            None => Vector2::repeat(Real::NAN),
        }
    }
}

impl Dynamics<4> for PendulumDynamics {
    type Output = Vector2<Real>;

    fn derivatives(&self, x: &StateVector<4>, force: Real) -> StateVector<4> {
        let acc = self.accelerations(x, force);
        StateVector::<4>::new(x[2], x[3], acc[0], acc[1])
    }

    /// Measured output: cart position and rod angle.
    fn output(&self, x: &StateVector<4>) -> Vector2<Real> {
        Vector2::new(x[0], x[1])
    }
}

/// Build a cart-pendulum plant with freshly drawn parameters.
pub fn build_plant<R: Rng + ?Sized>(
    params: &PendulumParams,
    uncertainty: &Uncertainty,
    rng: &mut R,
) -> PlantResult<PendulumPlant> {
    params.validate()?;
    let dynamics = PendulumDynamics::randomized(params, uncertainty, rng);
    dynamics.validate()?;
    Plant::new(dynamics, params.initial_state(), params.ts, params.f_max)
        .map_err(PlantError::from)
}
