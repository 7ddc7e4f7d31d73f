use ms_core::{Real, StateVector};
use ms_sim::PlotSink;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Compiling,
    Simulating,
    Completed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunProgressEvent {
    pub stage: RunStage,
    pub sim_time_s: f64,
    pub t_end_s: f64,
    pub fraction_complete: f64,
    pub samples: usize,
    pub elapsed_wall_s: f64,
}

/// Optional progress callback threaded through a run.
pub type ProgressCallback<'a> = Option<&'a mut dyn FnMut(RunProgressEvent)>;

/// Sink that forwards every sample to an inner sink and reports progress
/// roughly every tenth of the run.
pub(crate) struct ProgressSink<'a, S> {
    pub inner: S,
    progress: ProgressCallback<'a>,
    t_start: f64,
    t_end: f64,
    every: usize,
    samples: usize,
    started: Instant,
}

impl<'a, S> ProgressSink<'a, S> {
    pub fn new(
        inner: S,
        progress: ProgressCallback<'a>,
        t_start: f64,
        t_end: f64,
        expected_samples: usize,
        started: Instant,
    ) -> Self {
        Self {
            inner,
            progress,
            t_start,
            t_end,
            every: (expected_samples / 10).max(1),
            samples: 0,
            started,
        }
    }

    pub fn emit(&mut self, stage: RunStage, sim_time_s: f64) {
        if let Some(cb) = self.progress.as_deref_mut() {
            let span = self.t_end - self.t_start;
            let fraction_complete = if span > 0.0 {
                ((sim_time_s - self.t_start) / span).clamp(0.0, 1.0)
            } else {
                1.0
            };
            cb(RunProgressEvent {
                stage,
                sim_time_s,
                t_end_s: self.t_end,
                fraction_complete,
                samples: self.samples,
                elapsed_wall_s: self.started.elapsed().as_secs_f64(),
            });
        }
    }
}

impl<S: PlotSink<N>, const N: usize> PlotSink<N> for ProgressSink<'_, S> {
    fn push(&mut self, t: Real, reference: Real, state: &StateVector<N>, u: Real) {
        self.inner.push(t, reference, state, u);
        self.samples += 1;
        if self.samples % self.every == 0 {
            self.emit(RunStage::Simulating, t);
        }
    }
}
