//! Plant: exclusive owner of a physical state advanced at a fixed rate.

use crate::error::{SimError, SimResult};
use crate::integrator::IntegratorType;
use crate::model::Dynamics;
use ms_core::{Real, StateVector, ensure_positive, ensure_state_finite, saturate};

/// A dynamics model together with the state it owns.
///
/// Each call to [`Plant::update`] saturates the actuator command, advances the
/// state by exactly one sample period `ts` with the input held constant, and
/// returns the measured output.
#[derive(Clone, Debug)]
pub struct Plant<D, const N: usize> {
    dynamics: D,
    state: StateVector<N>,
    ts: Real,
    input_limit: Real,
    integrator: IntegratorType,
}

impl<D: Dynamics<N>, const N: usize> Plant<D, N> {
    /// Create a plant at `initial` state.
    ///
    /// # Errors
    ///
    /// Returns error if `ts` or `input_limit` is not a positive finite number,
    /// or if the initial state contains a non-finite component.
    pub fn new(
        dynamics: D,
        initial: StateVector<N>,
        ts: Real,
        input_limit: Real,
    ) -> SimResult<Self> {
        let ts = ensure_positive(ts, "sample period Ts")?;
        let input_limit = ensure_positive(input_limit, "input saturation limit")?;
        ensure_state_finite(&initial, "initial state")?;
        Ok(Self {
            dynamics,
            state: initial,
            ts,
            input_limit,
            integrator: IntegratorType::default(),
        })
    }

    /// Select the integration scheme.
    pub fn with_integrator(mut self, integrator: IntegratorType) -> Self {
        self.integrator = integrator;
        self
    }

    /// Saturate `u`, advance one sample period, return `h(x)`.
    pub fn update(&mut self, u: Real) -> D::Output {
        let u = self.saturate(u);
        self.state = self
            .integrator
            .step(&self.dynamics, &self.state, u, self.ts);
        self.dynamics.output(&self.state)
    }

    /// Clamp a command to the actuator limit.
    #[inline]
    pub fn saturate(&self, u: Real) -> Real {
        saturate(u, self.input_limit)
    }

    /// Current output `h(x)` without advancing time.
    pub fn output(&self) -> D::Output {
        self.dynamics.output(&self.state)
    }

    pub fn state(&self) -> &StateVector<N> {
        &self.state
    }

    /// Overwrite the state, e.g. to restart from a new initial condition.
    pub fn reset(&mut self, state: StateVector<N>) -> SimResult<()> {
        ensure_state_finite(&state, "reset state")?;
        self.state = state;
        Ok(())
    }

    pub fn dynamics(&self) -> &D {
        &self.dynamics
    }

    pub fn ts(&self) -> Real {
        self.ts
    }

    pub fn input_limit(&self) -> Real {
        self.input_limit
    }

    pub fn integrator(&self) -> IntegratorType {
        self.integrator
    }

    /// Error if the state has left the finite numbers.
    pub fn check_finite(&self) -> SimResult<()> {
        match self.state.iter().find(|v| !v.is_finite()) {
            Some(&value) => Err(SimError::NonFinite {
                what: "plant state",
                value,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Double integrator `qddot = u`, output `q`.
    #[derive(Clone, Debug)]
    struct DoubleIntegrator;

    impl Dynamics<2> for DoubleIntegrator {
        type Output = Real;

        fn derivatives(&self, x: &StateVector<2>, u: Real) -> StateVector<2> {
            StateVector::<2>::new(x[1], u)
        }

        fn output(&self, x: &StateVector<2>) -> Real {
            x[0]
        }
    }

    #[test]
    fn update_saturates_input() {
        let mut plant =
            Plant::new(DoubleIntegrator, StateVector::<2>::zeros(), 0.1, 1.0).unwrap();
        plant.update(50.0);
        // Velocity after one step equals the clamped input times ts
        assert!((plant.state()[1] - 0.1).abs() < 1e-12);

        plant.update(-50.0);
        assert!(plant.state()[1].abs() < 1e-12);
    }

    #[test]
    fn update_returns_output_of_new_state() {
        let mut plant =
            Plant::new(DoubleIntegrator, StateVector::<2>::new(0.0, 1.0), 0.5, 10.0).unwrap();
        let y = plant.update(0.0);
        assert!((y - 0.5).abs() < 1e-12);
        assert_eq!(y, plant.output());
    }

    #[test]
    fn rk4_is_exact_for_constant_acceleration() {
        let mut plant =
            Plant::new(DoubleIntegrator, StateVector::<2>::zeros(), 0.1, 10.0).unwrap();
        for _ in 0..10 {
            plant.update(2.0);
        }
        // q = 1/2 * a * t^2 = 1.0 at t = 1
        assert!((plant.state()[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn invalid_configuration_rejected() {
        let x0 = StateVector::<2>::zeros();
        assert!(Plant::new(DoubleIntegrator, x0, 0.0, 1.0).is_err());
        assert!(Plant::new(DoubleIntegrator, x0, -0.01, 1.0).is_err());
        assert!(Plant::new(DoubleIntegrator, x0, 0.01, 0.0).is_err());
        assert!(Plant::new(DoubleIntegrator, x0, 0.01, -2.0).is_err());
        assert!(
            Plant::new(DoubleIntegrator, StateVector::<2>::new(Real::NAN, 0.0), 0.01, 1.0)
                .is_err()
        );
    }

    #[test]
    fn non_finite_state_detected() {
        let mut plant =
            Plant::new(DoubleIntegrator, StateVector::<2>::zeros(), 0.1, 1.0).unwrap();
        assert!(plant.check_finite().is_ok());
        plant.state = StateVector::<2>::new(Real::INFINITY, 0.0);
        assert!(matches!(
            plant.check_finite(),
            Err(SimError::NonFinite { .. })
        ));
    }
}
