//! Controller trait and basic control laws.

use crate::error::{ControlError, ControlResult};
use ms_core::{Real, StateVector, ensure_positive, saturate};

/// A control law for a plant with `N` states.
///
/// Called once per integration tick with the current reference and the full
/// plant state. Implementations may keep internal state (integrators, filters)
/// between calls.
pub trait Controller<const N: usize> {
    /// Compute the actuator command.
    fn compute(&mut self, reference: Real, state: &StateVector<N>) -> Real;

    /// Clear any internal state. Stateless laws need not override this.
    fn reset(&mut self) {}
}

impl<F, const N: usize> Controller<N> for F
where
    F: FnMut(Real, &StateVector<N>) -> Real,
{
    fn compute(&mut self, reference: Real, state: &StateVector<N>) -> Real {
        self(reference, state)
    }
}

/// Open-loop drive: the reference is the command.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OpenLoop;

impl<const N: usize> Controller<N> for OpenLoop {
    fn compute(&mut self, reference: Real, _state: &StateVector<N>) -> Real {
        reference
    }
}

/// Linear full-state feedback with reference gain and output saturation.
///
/// `u = sat(kr * r - K x, limit)`
#[derive(Debug, Clone, PartialEq)]
pub struct StateFeedback<const N: usize> {
    /// Feedback gain row `K`.
    pub gains: StateVector<N>,
    /// Reference (feed-forward) gain.
    pub kr: Real,
    /// Output magnitude limit.
    pub limit: Real,
}

impl<const N: usize> StateFeedback<N> {
    /// Create a state-feedback law.
    ///
    /// # Errors
    ///
    /// Returns error if `limit` is not positive or any gain is non-finite.
    pub fn new(gains: StateVector<N>, kr: Real, limit: Real) -> ControlResult<Self> {
        if gains.iter().any(|g| !g.is_finite()) || !kr.is_finite() {
            return Err(ControlError::InvalidArg {
                what: "state feedback gains must be finite",
            });
        }
        let limit = ensure_positive(limit, "state feedback limit")?;
        Ok(Self { gains, kr, limit })
    }

    /// Unsaturated command.
    pub fn raw(&self, reference: Real, state: &StateVector<N>) -> Real {
        self.kr * reference - self.gains.dot(state)
    }
}

impl<const N: usize> Controller<N> for StateFeedback<N> {
    fn compute(&mut self, reference: Real, state: &StateVector<N>) -> Real {
        saturate(self.raw(reference, state), self.limit)
    }
}
