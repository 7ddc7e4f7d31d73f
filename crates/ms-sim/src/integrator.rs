//! Fixed-step time integrators.

use crate::model::Dynamics;
use ms_core::{Real, StateVector};
use serde::{Deserialize, Serialize};

/// Trait for time integrators.
pub trait Integrator {
    /// Advance `x` by one step of length `dt` with the input held at `u`.
    fn step<const N: usize, D: Dynamics<N> + ?Sized>(
        &self,
        dynamics: &D,
        x: &StateVector<N>,
        u: Real,
        dt: Real,
    ) -> StateVector<N>;
}

/// Classical RK4 (Runge-Kutta 4th order) integrator.
#[derive(Clone, Copy, Debug, Default)]
pub struct Rk4;

impl Integrator for Rk4 {
    fn step<const N: usize, D: Dynamics<N> + ?Sized>(
        &self,
        dynamics: &D,
        x: &StateVector<N>,
        u: Real,
        dt: Real,
    ) -> StateVector<N> {
        let k1 = dynamics.derivatives(x, u);
        let k2 = dynamics.derivatives(&(x + k1 * (0.5 * dt)), u);
        let k3 = dynamics.derivatives(&(x + k2 * (0.5 * dt)), u);
        let k4 = dynamics.derivatives(&(x + k3 * dt), u);

        // x_new = x + (dt/6) * (k1 + 2*k2 + 2*k3 + k4)
        x + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0)
    }
}

/// Forward Euler (explicit, 1st order, fast for testing).
/// Calls `derivatives()` once per step instead of 4 times (RK4).
#[derive(Clone, Copy, Debug, Default)]
pub struct ForwardEuler;

impl Integrator for ForwardEuler {
    fn step<const N: usize, D: Dynamics<N> + ?Sized>(
        &self,
        dynamics: &D,
        x: &StateVector<N>,
        u: Real,
        dt: Real,
    ) -> StateVector<N> {
        x + dynamics.derivatives(x, u) * dt
    }
}

/// Integrator selection for a plant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorType {
    /// 4th-order Runge-Kutta (default, 4 derivative calls per step).
    #[default]
    Rk4,
    /// Forward Euler (1st-order, 1 derivative call per step).
    ForwardEuler,
}

impl IntegratorType {
    /// Advance one step with the selected scheme.
    pub fn step<const N: usize, D: Dynamics<N> + ?Sized>(
        self,
        dynamics: &D,
        x: &StateVector<N>,
        u: Real,
        dt: Real,
    ) -> StateVector<N> {
        match self {
            IntegratorType::Rk4 => Rk4.step(dynamics, x, u, dt),
            IntegratorType::ForwardEuler => ForwardEuler.step(dynamics, x, u, dt),
        }
    }

    /// Order of accuracy of the global error.
    pub fn order(self) -> u32 {
        match self {
            IntegratorType::Rk4 => 4,
            IntegratorType::ForwardEuler => 1,
        }
    }
}
