//! Two-rate simulation loop.
//!
//! The inner loop runs the controller and plant every sample period `Ts`; the
//! outer loop queries the reference and pushes a sample every `t_plot`. Time
//! is derived from an integer step counter so it never drifts.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ms_controls::Controller;
use ms_core::{Real, Tolerances, ensure_finite, ensure_positive, nearly_equal};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{SimError, SimResult};
use crate::model::Dynamics;
use crate::plant::Plant;
use crate::signal::{PlotSink, ReferenceSource};

/// Relative slack allowed when checking that `t_plot` is a multiple of `Ts`.
const MULTIPLE_TOL: Real = 1e-9;

/// Options for simulation runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimOptions {
    /// Start time (seconds)
    pub t_start: Real,
    /// End time (seconds); the loop stops at the first sample at or after it
    pub t_end: Real,
    /// Sample/plot period (seconds); must be an integer multiple of `Ts`
    pub t_plot: Real,
    /// Fail the run if the state becomes non-finite
    pub check_finite: bool,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            t_start: 0.0,
            t_end: 50.0,
            t_plot: 0.1,
            check_finite: false,
        }
    }
}

/// Integer schedule derived from `SimOptions` and a plant sample period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleSchedule {
    /// Integration steps per outer sample
    pub steps_per_sample: usize,
    /// Number of outer samples in the run
    pub samples: usize,
}

impl SampleSchedule {
    pub fn total_steps(&self) -> u64 {
        self.steps_per_sample as u64 * self.samples as u64
    }
}

impl SimOptions {
    /// Validate the options against a sample period and derive the schedule.
    ///
    /// # Errors
    ///
    /// Returns error if any time is non-finite, `ts` or `t_plot` is not
    /// positive, `t_end < t_start`, or `t_plot` is not a multiple of `ts`.
    pub fn schedule(&self, ts: Real) -> SimResult<SampleSchedule> {
        let ts = ensure_positive(ts, "sample period Ts")?;
        let t_plot = ensure_positive(self.t_plot, "plot period t_plot")?;
        let t_start = ensure_finite(self.t_start, "t_start")?;
        let t_end = ensure_finite(self.t_end, "t_end")?;
        if t_end < t_start {
            return Err(SimError::InvalidArg {
                what: "t_end must not precede t_start",
            });
        }

        let ratio = t_plot / ts;
        let steps_per_sample = ratio.round();
        let multiple = Tolerances {
            abs: 0.0,
            rel: MULTIPLE_TOL,
        };
        if steps_per_sample < 1.0 || !nearly_equal(ratio, steps_per_sample, multiple) {
            return Err(SimError::InvalidTiming {
                what: format!("t_plot ({t_plot}) must be an integer multiple of Ts ({ts})"),
            });
        }

        let span = (t_end - t_start) / t_plot;
        let samples = (span - MULTIPLE_TOL).ceil().max(0.0);

        Ok(SampleSchedule {
            steps_per_sample: steps_per_sample as usize,
            samples: samples as usize,
        })
    }
}

/// Cooperative stop flag shared between a running simulation and its owner.
#[derive(Clone, Debug, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the run to end at the next sample tick.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Outcome of a simulation run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Samples pushed to the sink
    pub samples: usize,
    /// Integration steps taken
    pub steps: u64,
    /// Simulation time at the end of the run (seconds)
    pub t_final: Real,
    /// True if the run ended because of a stop request
    pub stopped: bool,
}

/// Run a closed-loop simulation to `t_end`.
pub fn run<D, C, R, S, const N: usize>(
    plant: &mut Plant<D, N>,
    controller: &mut C,
    reference: &R,
    sink: &mut S,
    opts: &SimOptions,
) -> SimResult<RunSummary>
where
    D: Dynamics<N>,
    C: Controller<N> + ?Sized,
    R: ReferenceSource + ?Sized,
    S: PlotSink<N> + ?Sized,
{
    run_inner(plant, controller, reference, sink, opts, None)
}

/// Run a closed-loop simulation to `t_end` or until `stop` is raised.
pub fn run_with_stop<D, C, R, S, const N: usize>(
    plant: &mut Plant<D, N>,
    controller: &mut C,
    reference: &R,
    sink: &mut S,
    opts: &SimOptions,
    stop: &StopSignal,
) -> SimResult<RunSummary>
where
    D: Dynamics<N>,
    C: Controller<N> + ?Sized,
    R: ReferenceSource + ?Sized,
    S: PlotSink<N> + ?Sized,
{
    run_inner(plant, controller, reference, sink, opts, Some(stop))
}

fn run_inner<D, C, R, S, const N: usize>(
    plant: &mut Plant<D, N>,
    controller: &mut C,
    reference: &R,
    sink: &mut S,
    opts: &SimOptions,
    stop: Option<&StopSignal>,
) -> SimResult<RunSummary>
where
    D: Dynamics<N>,
    C: Controller<N> + ?Sized,
    R: ReferenceSource + ?Sized,
    S: PlotSink<N> + ?Sized,
{
    let ts = plant.ts();
    let schedule = opts.schedule(ts)?;
    info!(
        ts,
        t_plot = opts.t_plot,
        t_start = opts.t_start,
        t_end = opts.t_end,
        samples = schedule.samples,
        steps_per_sample = schedule.steps_per_sample,
        "starting simulation"
    );

    let mut step: u64 = 0;
    let mut t = opts.t_start;
    let mut u = 0.0;
    let mut samples = 0;
    let mut stopped = false;

    for _ in 0..schedule.samples {
        if stop.is_some_and(StopSignal::is_stopped) {
            warn!(t, "simulation stopped on request");
            stopped = true;
            break;
        }

        let r = reference.sample(t);
        for _ in 0..schedule.steps_per_sample {
            u = controller.compute(r, plant.state());
            plant.update(u);
            step += 1;
        }
        t = opts.t_start + step as Real * ts;

        if opts.check_finite {
            plant.check_finite()?;
        }

        sink.push(t, r, plant.state(), u);
        samples += 1;
        debug!(t, r, u, "sample");
    }

    info!(samples, steps = step, t_final = t, stopped, "simulation finished");

    Ok(RunSummary {
        samples,
        steps: step,
        t_final: t,
        stopped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_options_defaults() {
        let opts = SimOptions::default();
        assert_eq!(opts.t_start, 0.0);
        assert_eq!(opts.t_end, 50.0);
        assert_eq!(opts.t_plot, 0.1);
        assert!(!opts.check_finite);
    }

    #[test]
    fn schedule_uses_integer_counts() {
        let opts = SimOptions {
            t_start: 0.0,
            t_end: 1.0,
            t_plot: 0.1,
            check_finite: false,
        };
        let schedule = opts.schedule(0.01).unwrap();
        assert_eq!(schedule.steps_per_sample, 10);
        assert_eq!(schedule.samples, 10);
        assert_eq!(schedule.total_steps(), 100);
    }

    #[test]
    fn schedule_rounds_partial_sample_up() {
        let opts = SimOptions {
            t_start: 0.0,
            t_end: 1.05,
            t_plot: 0.1,
            check_finite: false,
        };
        assert_eq!(opts.schedule(0.01).unwrap().samples, 11);
    }

    #[test]
    fn schedule_rejects_non_multiple_plot_period() {
        let opts = SimOptions {
            t_plot: 0.105,
            ..SimOptions::default()
        };
        assert!(matches!(
            opts.schedule(0.01),
            Err(SimError::InvalidTiming { .. })
        ));

        let opts = SimOptions {
            t_plot: 0.005,
            ..SimOptions::default()
        };
        assert!(opts.schedule(0.01).is_err());
    }

    #[test]
    fn schedule_rejects_bad_bounds() {
        let opts = SimOptions {
            t_start: 2.0,
            t_end: 1.0,
            ..SimOptions::default()
        };
        assert!(opts.schedule(0.01).is_err());
        assert!(SimOptions::default().schedule(0.0).is_err());
        assert!(SimOptions::default().schedule(-0.01).is_err());
    }

    #[test]
    fn empty_span_has_no_samples() {
        let opts = SimOptions {
            t_start: 3.0,
            t_end: 3.0,
            ..SimOptions::default()
        };
        assert_eq!(opts.schedule(0.01).unwrap().samples, 0);
    }

    #[test]
    fn stop_signal_is_shared() {
        let stop = StopSignal::new();
        let handle = stop.clone();
        assert!(!stop.is_stopped());
        handle.stop();
        assert!(stop.is_stopped());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::record::NullSink;
    use ms_core::StateVector;
    use proptest::prelude::*;

    struct Decay;

    impl Dynamics<1> for Decay {
        type Output = Real;

        fn derivatives(&self, x: &StateVector<1>, u: Real) -> StateVector<1> {
            StateVector::<1>::new(u - x[0])
        }

        fn output(&self, x: &StateVector<1>) -> Real {
            x[0]
        }
    }

    fn sample_period() -> impl Strategy<Value = Real> {
        prop::sample::select(vec![0.001, 0.01, 0.02, 0.05, 0.1])
    }

    proptest! {
        #[test]
        fn whole_multiples_schedule_exactly(
            ts in sample_period(),
            k in 1usize..25,
            n in 0usize..40,
        ) {
            let t_plot = k as Real * ts;
            let opts = SimOptions {
                t_start: 0.0,
                t_end: n as Real * t_plot,
                t_plot,
                check_finite: false,
            };
            let schedule = opts.schedule(ts).unwrap();
            prop_assert_eq!(schedule.steps_per_sample, k);
            prop_assert_eq!(schedule.samples, n);

            let mut plant = Plant::new(Decay, StateVector::<1>::zeros(), ts, 1.0).unwrap();
            let mut ctrl = |_t: Real, _x: &StateVector<1>| 0.5;
            let summary = run(&mut plant, &mut ctrl, &|_t: Real| 0.0, &mut NullSink, &opts).unwrap();
            prop_assert_eq!(summary.samples, n);
            prop_assert_eq!(summary.steps, (n * k) as u64);
        }

        #[test]
        fn half_step_offsets_are_rejected(ts in sample_period(), k in 0usize..25) {
            let opts = SimOptions {
                t_plot: (k as Real + 0.5) * ts,
                ..SimOptions::default()
            };
            prop_assert!(
                matches!(opts.schedule(ts), Err(SimError::InvalidTiming { .. })),
                "accepted t_plot = {} with Ts = {}",
                opts.t_plot,
                ts
            );
        }
    }
}
