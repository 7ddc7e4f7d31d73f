//! Recording sinks.

use crate::signal::PlotSink;
use ms_core::{Real, StateVector};

/// In-memory record of sampled simulation data.
#[derive(Clone, Debug, Default)]
pub struct SimRecord<const N: usize> {
    /// Sample times (seconds)
    pub t: Vec<Real>,
    /// Reference value at each sample
    pub reference: Vec<Real>,
    /// State snapshots
    pub x: Vec<StateVector<N>>,
    /// Last control command issued before each sample
    pub u: Vec<Real>,
}

impl<const N: usize> SimRecord<N> {
    pub fn new() -> Self {
        Self {
            t: Vec::new(),
            reference: Vec::new(),
            x: Vec::new(),
            u: Vec::new(),
        }
    }

    /// Pre-allocate for a known number of samples.
    pub fn with_capacity(samples: usize) -> Self {
        Self {
            t: Vec::with_capacity(samples),
            reference: Vec::with_capacity(samples),
            x: Vec::with_capacity(samples),
            u: Vec::with_capacity(samples),
        }
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn last_state(&self) -> Option<&StateVector<N>> {
        self.x.last()
    }

    /// Time series of a single state component.
    pub fn component(&self, index: usize) -> Vec<Real> {
        self.x.iter().map(|x| x[index]).collect()
    }

    /// Largest absolute value of a state component over the record.
    pub fn max_abs_component(&self, index: usize) -> Real {
        self.x.iter().map(|x| x[index].abs()).fold(0.0, Real::max)
    }

    /// Largest absolute control command over the record.
    pub fn max_abs_input(&self) -> Real {
        self.u.iter().map(|u| u.abs()).fold(0.0, Real::max)
    }
}

impl<const N: usize> PlotSink<N> for SimRecord<N> {
    fn push(&mut self, t: Real, reference: Real, state: &StateVector<N>, u: Real) {
        self.t.push(t);
        self.reference.push(reference);
        self.x.push(*state);
        self.u.push(u);
    }
}

/// Sink that discards every sample.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl<const N: usize> PlotSink<N> for NullSink {
    fn push(&mut self, _t: Real, _reference: Real, _state: &StateVector<N>, _u: Real) {}
}
