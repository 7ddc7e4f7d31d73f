//! PID control on a single measured state component.
//!
//! [`PidController`] holds gains and limits and exposes a pure `update`;
//! [`SampledPid`] binds it to a state index and the plant sample period so it
//! can run as a [`Controller`]. The derivative acts on a first-order filtered
//! error and is skipped on the first sample. The integrator freezes while the
//! output is clamped.

use crate::controller::Controller;
use crate::error::{ControlError, ControlResult};
use ms_core::{Real, StateVector, ensure_finite, ensure_non_negative, ensure_positive};
use serde::{Deserialize, Serialize};

/// Gains and limits in ideal (series-free) form:
/// `u = kp (e + 1/ti int e + td de_f/dt)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PidController {
    pub kp: Real,
    /// Reset time (s); `None` gives PD.
    pub ti: Option<Real>,
    /// Rate time (s).
    pub td: Real,
    /// Time constant of the error filter feeding the rate term (s).
    pub td_filter: Real,
    /// Output clamp magnitude.
    pub out_limit: Real,
    /// Clamp on the integrated error, if any.
    pub integral_limit: Option<Real>,
}

impl PidController {
    /// Validate and build. `ti` and `td_filter` must be positive, `td`
    /// non-negative and `out_limit` positive.
    pub fn new(
        kp: Real,
        ti: Option<Real>,
        td: Real,
        td_filter: Real,
        out_limit: Real,
    ) -> ControlResult<Self> {
        let kp = ensure_finite(kp, "pid kp")?;
        let ti = ti.map(|ti| ensure_positive(ti, "pid ti")).transpose()?;
        Ok(Self {
            kp,
            ti,
            td: ensure_non_negative(td, "pid td")?,
            td_filter: ensure_positive(td_filter, "pid td_filter")?,
            out_limit: ensure_positive(out_limit, "pid out_limit")?,
            integral_limit: None,
        })
    }

    /// Clamp the integrated error to `[-limit, limit]`; `limit` must be
    /// positive.
    pub fn with_integral_limit(self, limit: Real) -> ControlResult<Self> {
        let limit = ensure_positive(limit, "pid integral_limit")?;
        Ok(Self {
            integral_limit: Some(limit),
            ..self
        })
    }

    /// One step from `state` with measurement `pv` and setpoint `sp` over `dt`.
    /// Returns the next state and the clamped output.
    pub fn update(&self, state: &PidState, pv: Real, sp: Real, dt: Real) -> (PidState, Real) {
        let e = sp - pv;

        let mut integral = state.integral + e * dt;
        if let Some(limit) = self.integral_limit {
            integral = integral.clamp(-limit, limit);
        }
        let i_term = self.ti.map_or(0.0, |ti| self.kp * integral / ti);

        // Backward-Euler discretization of tau df/dt + f = e
        let keep = self.td_filter / (self.td_filter + dt);
        let filtered = keep * state.filtered_error + (1.0 - keep) * e;
        let d_term = if state.primed {
            self.kp * self.td * (filtered - state.filtered_error) / dt
        } else {
            0.0
        };

        let unclamped = self.kp * e + i_term + d_term;
        let u = unclamped.clamp(-self.out_limit, self.out_limit);
        let saturated = u != unclamped;

        let next = PidState {
            integral: if saturated { state.integral } else { integral },
            filtered_error: filtered,
            primed: true,
        };
        (next, u)
    }
}

/// PID controller state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PidState {
    /// Integrated error.
    pub integral: Real,
    /// Last filtered error.
    pub filtered_error: Real,
    /// False until the first update; suppresses the initial derivative kick.
    pub primed: bool,
}

/// PID bound to one component of an `N`-state plant, executed every sample
/// period.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledPid<const N: usize> {
    pub pid: PidController,
    pub state: PidState,
    measured: usize,
    dt: Real,
}

impl<const N: usize> SampledPid<N> {
    /// Bind `pid` to state component `measured`, executed every `dt`.
    ///
    /// # Errors
    ///
    /// `IndexOob` when `measured >= N`; non-positive or non-finite `dt`.
    pub fn new(pid: PidController, measured: usize, dt: Real) -> ControlResult<Self> {
        if measured >= N {
            return Err(ControlError::IndexOob {
                index: measured,
                dim: N,
            });
        }
        let dt = ensure_positive(dt, "controller period")?;
        Ok(Self {
            pid,
            state: PidState::default(),
            measured,
            dt,
        })
    }

    /// Index of the regulated state component.
    pub fn measured(&self) -> usize {
        self.measured
    }

    /// Execution period (s), normally the plant `Ts`.
    pub fn dt(&self) -> Real {
        self.dt
    }
}

impl<const N: usize> Controller<N> for SampledPid<N> {
    fn compute(&mut self, reference: Real, state: &StateVector<N>) -> Real {
        let (next, u) = self
            .pid
            .update(&self.state, state[self.measured], reference, self.dt);
        self.state = next;
        u
    }

    fn reset(&mut self) {
        self.state = PidState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_keeps_gains() {
        let pid = PidController::new(1.0, Some(2.0), 0.5, 0.1, 1.0).unwrap();
        assert_eq!(pid.kp, 1.0);
        assert_eq!(pid.td, 0.5);
    }

    #[test]
    fn proportional_only() {
        let pid = PidController::new(2.0, None, 0.0, 0.1, 10.0).unwrap();
        let (_, output) = pid.update(&PidState::default(), 0.5, 1.0, 0.1);
        assert!((output - 1.0).abs() < 1e-12);
    }

    #[test]
    fn integral_action_accumulates() {
        let pid = PidController::new(1.0, Some(1.0), 0.0, 0.1, 10.0).unwrap();
        let mut state = PidState::default();
        for _ in 0..10 {
            let (next, _) = pid.update(&state, 0.0, 1.0, 0.1);
            state = next;
        }
        assert!((state.integral - 1.0).abs() < 1e-9);
    }

    #[test]
    fn output_clamping_and_anti_windup() {
        let pid = PidController::new(10.0, Some(1.0), 0.0, 0.1, 1.0).unwrap();
        let (state, output) = pid.update(&PidState::default(), 0.0, 10.0, 0.1);
        assert_eq!(output, 1.0);
        // Saturated: integral held
        assert_eq!(state.integral, 0.0);

        let (_, output) = pid.update(&PidState::default(), 10.0, 0.0, 0.1);
        assert_eq!(output, -1.0);
    }

    #[test]
    fn no_derivative_kick_on_first_sample() {
        let pid = PidController::new(1.0, None, 1.0, 0.01, 100.0).unwrap();
        let (state, output) = pid.update(&PidState::default(), 0.0, 1.0, 0.01);
        assert!((output - 1.0).abs() < 1e-12);
        assert!(state.primed);
    }

    #[test]
    fn sampled_pid_tracks_component() {
        let pid = PidController::new(2.0, None, 0.0, 0.1, 10.0).unwrap();
        let mut ctrl = SampledPid::<2>::new(pid, 1, 0.01).unwrap();
        let x = StateVector::<2>::new(100.0, 0.25);
        let u = ctrl.compute(1.0, &x);
        assert!((u - 1.5).abs() < 1e-12);
        assert_eq!(ctrl.measured(), 1);
    }

    #[test]
    fn sampled_pid_rejects_index_outside_state() {
        let pid = PidController::new(2.0, None, 0.0, 0.1, 10.0).unwrap();
        assert!(matches!(
            SampledPid::<2>::new(pid.clone(), 5, 0.01),
            Err(ControlError::IndexOob { index: 5, dim: 2 })
        ));
        assert!(SampledPid::<2>::new(pid, 2, 0.01).is_err());
    }

    #[test]
    fn integral_limit_must_be_positive() {
        let pid = PidController::new(1.0, Some(1.0), 0.0, 0.1, 10.0).unwrap();
        assert!(pid.clone().with_integral_limit(-1.0).is_err());
        assert!(pid.clone().with_integral_limit(0.0).is_err());
        assert!(pid.clone().with_integral_limit(Real::NAN).is_err());

        let limited = pid.with_integral_limit(0.2).unwrap();
        let mut state = PidState::default();
        for _ in 0..10 {
            state = limited.update(&state, 0.0, 1.0, 0.1).0;
        }
        assert!((state.integral - 0.2).abs() < 1e-12);
    }

    #[test]
    fn reset_clears_state() {
        let pid = PidController::new(1.0, Some(0.5), 0.0, 0.1, 10.0).unwrap();
        let mut ctrl = SampledPid::<1>::new(pid, 0, 0.1).unwrap();
        let x = StateVector::<1>::new(0.0);
        ctrl.compute(1.0, &x);
        assert!(ctrl.state.integral > 0.0);
        ctrl.reset();
        assert_eq!(ctrl.state, PidState::default());
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(PidController::new(1.0, Some(-1.0), 0.0, 0.1, 1.0).is_err());
        assert!(PidController::new(1.0, None, -0.5, 0.1, 1.0).is_err());
        assert!(PidController::new(1.0, None, 0.0, 0.0, 1.0).is_err());
        assert!(PidController::new(1.0, None, 0.0, 0.1, 0.0).is_err());
        let pid = PidController::new(1.0, None, 0.0, 0.1, 1.0).unwrap();
        assert!(SampledPid::<1>::new(pid, 0, 0.0).is_err());
    }

    proptest! {
        #[test]
        fn output_never_exceeds_limit(
            kp in -50.0f64..50.0,
            pvs in proptest::collection::vec(-10.0f64..10.0, 1..40),
            sp in -10.0f64..10.0,
        ) {
            let pid = PidController::new(kp, Some(0.3), 0.2, 0.05, 2.0).unwrap();
            let mut state = PidState::default();
            for pv in pvs {
                let (next, u) = pid.update(&state, pv, sp, 0.01);
                prop_assert!(u.abs() <= 2.0);
                state = next;
            }
        }
    }
}
