//! Pole-placement helpers for second-order loops.
//!
//! A loop is described by its linearized plant
//! `yddot + a1 ydot + a0 y = b0 u` and closed with the PD law
//! `u = kp (r - y) - kd ydot`. Matching the closed-loop characteristic
//! polynomial to `s^2 + 2 zeta wn s + wn^2` gives
//! `kp = (wn^2 - a0) / b0` and `kd = (2 zeta wn - a1) / b0`.

use crate::error::{ControlError, ControlResult};
use ms_core::{Real, ensure_finite, ensure_positive};
use serde::{Deserialize, Serialize};

/// Desired closed-loop response of a second-order loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SecondOrderSpec {
    /// 10-90% rise time (seconds).
    pub rise_time: Real,
    /// Damping ratio.
    pub zeta: Real,
}

impl SecondOrderSpec {
    pub fn new(rise_time: Real, zeta: Real) -> ControlResult<Self> {
        ensure_positive(rise_time, "rise time")?;
        ensure_positive(zeta, "damping ratio")?;
        Ok(Self { rise_time, zeta })
    }

    /// Natural frequency from the rise-time rule of thumb `wn = 2.2 / tr`.
    pub fn natural_frequency(&self) -> Real {
        2.2 / self.rise_time
    }

    /// Same damping, natural frequency slower by `separation`.
    ///
    /// Used to place an outer loop well below the bandwidth of an inner loop.
    pub fn slower_by(&self, separation: Real, zeta: Real) -> ControlResult<Self> {
        ensure_positive(separation, "bandwidth separation")?;
        Self::new(self.rise_time * separation, zeta)
    }
}

/// Linearized second-order plant `yddot + a1 ydot + a0 y = b0 u`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SecondOrderPlant {
    pub b0: Real,
    pub a1: Real,
    pub a0: Real,
}

/// PD gains of one loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopGains {
    pub kp: Real,
    pub kd: Real,
}

impl SecondOrderPlant {
    /// Place the closed-loop poles of `u = kp (r - y) - kd ydot`.
    ///
    /// # Errors
    ///
    /// Returns error if `b0` is zero or any coefficient is non-finite.
    pub fn place(&self, spec: &SecondOrderSpec) -> ControlResult<LoopGains> {
        let b0 = ensure_finite(self.b0, "input gain b0")?;
        ensure_finite(self.a1, "plant coefficient a1")?;
        ensure_finite(self.a0, "plant coefficient a0")?;
        if b0 == 0.0 {
            return Err(ControlError::Design {
                what: "plant input gain b0 is zero".to_string(),
            });
        }
        let wn = spec.natural_frequency();
        let gains = LoopGains {
            kp: (wn * wn - self.a0) / b0,
            kd: (2.0 * spec.zeta * wn - self.a1) / b0,
        };
        tracing::debug!(wn, zeta = spec.zeta, kp = gains.kp, kd = gains.kd, "placed loop poles");
        Ok(gains)
    }

    /// Closed-loop DC gain `y/r` for the given gains.
    pub fn dc_gain(&self, gains: &LoopGains) -> Real {
        self.b0 * gains.kp / (self.a0 + self.b0 * gains.kp)
    }
}
