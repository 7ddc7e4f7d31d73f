//! Successive loop closure for the cart-pendulum.
//!
//! The inner loop drives the rod angle to a commanded angle with the cart
//! force; the outer loop, an order of magnitude slower, commands the rod angle
//! that moves the cart to its reference:
//!
//! ```text
//! theta_r = kp_z (z_r - z) - kd_z zdot
//! F       = kp_th (theta_r - theta) - kd_th thetadot
//! ```

use crate::error::PlantResult;
use crate::pendulum::PendulumParams;
use ms_controls::{Controller, LoopGains, SecondOrderPlant, SecondOrderSpec};
use ms_core::{Real, StateVector, saturate};
use serde::{Deserialize, Serialize};

/// Design targets for both loops.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendulumDesign {
    /// Inner (angle) loop response.
    pub inner: SecondOrderSpec,
    /// Ratio of inner to outer loop natural frequency.
    pub separation: Real,
    /// Outer (position) loop damping ratio.
    pub zeta_z: Real,
}

impl Default for PendulumDesign {
    fn default() -> Self {
        Self {
            inner: SecondOrderSpec {
                rise_time: 0.5,
                zeta: 0.707,
            },
            separation: 10.0,
            zeta_z: 0.707,
        }
    }
}

/// Gains of both loops.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendulumGains {
    pub kp_z: Real,
    pub kd_z: Real,
    pub kp_th: Real,
    pub kd_th: Real,
}

/// Cascaded PD controller for the cart-pendulum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendulumController {
    pub gains: PendulumGains,
    /// Force saturation limit.
    pub f_max: Real,
}

impl PendulumController {
    pub fn new(params: &PendulumParams, gains: PendulumGains) -> PlantResult<Self> {
        params.validate()?;
        Ok(Self {
            gains,
            f_max: params.f_max,
        })
    }

    /// Place both loops from nominal parameters.
    ///
    /// Linearized about the upright with the cart acceleration eliminated,
    /// `thetaddot = a theta - b0 F` with `a = 6 g (m1 + m2) / (ell (m1 + 4 m2))`
    /// and `b0 = 6 / (ell (m1 + 4 m2))`. For the outer loop the inner loop is
    /// replaced by its DC gain and `zddot = g theta`.
    pub fn design(params: &PendulumParams, design: &PendulumDesign) -> PlantResult<Self> {
        params.validate()?;
        let PendulumParams { m1, m2, ell, g, .. } = *params;
        let denom = ell * (m1 + 4.0 * m2);
        let a = 6.0 * g * (m1 + m2) / denom;
        let b0 = 6.0 / denom;

        let inner_plant = SecondOrderPlant {
            b0: -b0,
            a1: 0.0,
            a0: -a,
        };
        let inner = inner_plant.place(&design.inner)?;
        let k_dc = inner_plant.dc_gain(&inner);

        let outer_spec = design.inner.slower_by(design.separation, design.zeta_z)?;
        let outer_plant = SecondOrderPlant {
            b0: g * k_dc,
            a1: 0.0,
            a0: 0.0,
        };
        let outer: LoopGains = outer_plant.place(&outer_spec)?;

        tracing::debug!(
            kp_th = inner.kp,
            kd_th = inner.kd,
            kp_z = outer.kp,
            kd_z = outer.kd,
            k_dc,
            "designed pendulum gains"
        );

        Self::new(
            params,
            PendulumGains {
                kp_z: outer.kp,
                kd_z: outer.kd,
                kp_th: inner.kp,
                kd_th: inner.kd,
            },
        )
    }

    /// Angle command produced by the outer loop.
    pub fn angle_command(&self, z_r: Real, x: &StateVector<4>) -> Real {
        self.gains.kp_z * (z_r - x[0]) - self.gains.kd_z * x[2]
    }

    /// Unsaturated force.
    pub fn raw(&self, z_r: Real, x: &StateVector<4>) -> Real {
        let theta_r = self.angle_command(z_r, x);
        self.gains.kp_th * (theta_r - x[1]) - self.gains.kd_th * x[3]
    }
}

impl Controller<4> for PendulumController {
    fn compute(&mut self, z_r: Real, x: &StateVector<4>) -> Real {
        saturate(self.raw(z_r, x), self.f_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn designed_gain_signs() {
        let ctrl =
            PendulumController::design(&PendulumParams::default(), &PendulumDesign::default())
                .unwrap();
        // Upright rod: the angle loop pushes the cart under the rod
        assert!(ctrl.gains.kp_th < 0.0);
        assert!(ctrl.gains.kd_th < 0.0);
        assert!(ctrl.gains.kp_z > 0.0);
        assert!(ctrl.gains.kd_z > 0.0);
    }

    #[test]
    fn inner_loop_stabilizes_linearization() {
        let p = PendulumParams::default();
        let ctrl = PendulumController::design(&p, &PendulumDesign::default()).unwrap();
        let denom = p.ell * (p.m1 + 4.0 * p.m2);
        let a = 6.0 * p.g * (p.m1 + p.m2) / denom;
        let b0 = 6.0 / denom;
        // Closed loop: s^2 - b0 kd s - (a + b0 kp); both coefficients positive
        assert!(-b0 * ctrl.gains.kd_th > 0.0);
        assert!(-(a + b0 * ctrl.gains.kp_th) > 0.0);
    }

    #[test]
    fn zero_error_zero_force() {
        let mut ctrl = PendulumController::new(
            &PendulumParams::default(),
            PendulumGains {
                kp_z: 0.01,
                kd_z: 0.03,
                kp_th: -26.0,
                kd_th: -4.4,
            },
        )
        .unwrap();
        assert_eq!(ctrl.compute(0.0, &StateVector::<4>::zeros()), 0.0);
    }

    #[test]
    fn force_saturates() {
        let mut ctrl = PendulumController::new(
            &PendulumParams::default(),
            PendulumGains {
                kp_z: 0.0,
                kd_z: 0.0,
                kp_th: -100.0,
                kd_th: 0.0,
            },
        )
        .unwrap();
        let x = StateVector::<4>::new(0.0, -1.0, 0.0, 0.0);
        assert_eq!(ctrl.compute(0.0, &x), -5.0);
    }
}
