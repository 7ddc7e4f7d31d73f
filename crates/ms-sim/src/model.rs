//! Dynamics trait for pluggable continuous-time plant models.

use ms_core::{Real, StateVector};

/// Continuous-time plant model with `N` states and a scalar actuator input.
///
/// A `Dynamics` implementation must provide:
/// - the state derivative `xdot = f(x, u)` (time-invariant; `u` is held
///   constant by the caller over each integration step)
/// - the output map `y = h(x)`, typically a partial observation of the state
///
/// Implementations hold the physical parameters of one run and are read-only
/// once constructed.
pub trait Dynamics<const N: usize> {
    /// Measured output type returned by `Plant::update`.
    type Output;

    /// Compute the state derivative `dx/dt = f(x, u)`.
    fn derivatives(&self, x: &StateVector<N>, u: Real) -> StateVector<N>;

    /// Compute the output `y = h(x)`.
    fn output(&self, x: &StateVector<N>) -> Self::Output;
}
