//! Collaborator interfaces consumed by the simulation loop.
//!
//! The loop queries a [`ReferenceSource`] once per sample tick and pushes the
//! sampled state to a [`PlotSink`]. Waveform generation and rendering live
//! outside this crate.

use ms_core::{Real, StateVector};

/// Reference signal as a pure function of time.
pub trait ReferenceSource {
    /// Reference value at time `t` (seconds).
    fn sample(&self, t: Real) -> Real;
}

impl<F> ReferenceSource for F
where
    F: Fn(Real) -> Real,
{
    fn sample(&self, t: Real) -> Real {
        self(t)
    }
}

/// Receiver of sampled simulation data.
///
/// Sinks are side-effecting; the loop never inspects what they do with the
/// data.
pub trait PlotSink<const N: usize> {
    /// Accept one sample: time, reference, state, and the last control command.
    fn push(&mut self, t: Real, reference: Real, state: &StateVector<N>, u: Real);
}

impl<S: PlotSink<N> + ?Sized, const N: usize> PlotSink<N> for &mut S {
    fn push(&mut self, t: Real, reference: Real, state: &StateVector<N>, u: Real) {
        (**self).push(t, reference, state, u);
    }
}
