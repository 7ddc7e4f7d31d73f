//! Run execution service.

use std::time::Instant;

use ms_controls::Controller;
use ms_core::timing::Timer;
use ms_project::RunConfig;
use ms_sim::{Dynamics, Plant, RunSummary, SimOptions, SimRecord, StopSignal, run_with_stop};
use serde::Serialize;
use tracing::info;

use crate::error::AppResult;
use crate::metrics::{TrackingMetrics, TrackingSeries, compute_tracking_metrics};
use crate::progress::{ProgressCallback, ProgressSink, RunProgressEvent, RunStage};
use crate::reference::Reference;
use crate::runtime_compile::{DrawnParams, SystemRuntime, compile_run};

/// One recorded sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleRow {
    pub t: f64,
    pub reference: f64,
    pub state: Vec<f64>,
    pub u: f64,
}

/// Result of a completed (or stopped) run.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    pub name: String,
    pub system: &'static str,
    pub seed: u64,
    pub drawn: DrawnParams,
    pub state_labels: &'static [&'static str],
    pub summary: RunSummary,
    pub metrics: TrackingMetrics,
    pub wall_time_s: f64,
    pub samples: Vec<SampleRow>,
}

/// Upper bound on samples reserved before a run; longer runs grow the buffer.
const PREALLOCATED_SAMPLES: usize = 1 << 16;

pub const ARM_STATE_LABELS: &[&str] = &["theta", "thetadot"];
pub const PENDULUM_STATE_LABELS: &[&str] = &["z", "theta", "zdot", "thetadot"];

/// Execute a run to completion.
pub fn run_config(config: &RunConfig, seed: Option<u64>) -> AppResult<RunOutput> {
    run_config_with(config, seed, &StopSignal::new(), None)
}

/// Execute a run that can be stopped early and reports progress.
pub fn run_config_with(
    config: &RunConfig,
    seed: Option<u64>,
    stop: &StopSignal,
    mut progress: ProgressCallback<'_>,
) -> AppResult<RunOutput> {
    ms_project::validate_config(config)?;
    let started = Instant::now();
    let timer = Timer::start("run");
    if let Some(cb) = progress.as_deref_mut() {
        cb(RunProgressEvent {
            stage: RunStage::Compiling,
            sim_time_s: config.sim.t_start,
            t_end_s: config.sim.t_end,
            fraction_complete: 0.0,
            samples: 0,
            elapsed_wall_s: started.elapsed().as_secs_f64(),
        });
    }

    let compiled = compile_run(config, seed)?;
    let drawn = compiled.runtime.drawn();
    let ctx = RunContext {
        reference: &compiled.reference,
        opts: &config.sim,
        stop,
        started,
    };

    let (summary, samples, metrics, state_labels) = match compiled.runtime {
        SystemRuntime::Arm {
            mut plant,
            mut controller,
        } => {
            let (summary, record, initial) =
                simulate(&mut plant, controller.as_mut(), &ctx, progress)?;
            let metrics = metrics_from(&record, initial, 0, plant.input_limit());
            (summary, rows(&record), metrics, ARM_STATE_LABELS)
        }
        SystemRuntime::Pendulum {
            mut plant,
            mut controller,
        } => {
            let (summary, record, initial) =
                simulate(&mut plant, controller.as_mut(), &ctx, progress)?;
            let metrics = metrics_from(&record, initial, 1, plant.input_limit());
            (summary, rows(&record), metrics, PENDULUM_STATE_LABELS)
        }
    };

    timer.stop_and_log();
    let wall_time_s = started.elapsed().as_secs_f64();
    info!(
        name = %config.name,
        seed = compiled.seed,
        samples = summary.samples,
        final_error = metrics.final_error,
        wall_time_s,
        "run complete"
    );

    Ok(RunOutput {
        name: config.name.clone(),
        system: config.system.kind(),
        seed: compiled.seed,
        drawn,
        state_labels,
        summary,
        metrics,
        wall_time_s,
        samples,
    })
}

struct RunContext<'a> {
    reference: &'a Reference,
    opts: &'a SimOptions,
    stop: &'a StopSignal,
    started: Instant,
}

fn simulate<D, C, const N: usize>(
    plant: &mut Plant<D, N>,
    controller: &mut C,
    ctx: &RunContext<'_>,
    progress: ProgressCallback<'_>,
) -> AppResult<(RunSummary, SimRecord<N>, (f64, f64))>
where
    D: Dynamics<N>,
    C: Controller<N> + ?Sized,
{
    let initial = (ctx.opts.t_start, plant.state()[0]);
    let schedule = ctx.opts.schedule(plant.ts())?;
    let mut sink = ProgressSink::new(
        SimRecord::with_capacity(schedule.samples.min(PREALLOCATED_SAMPLES)),
        progress,
        ctx.opts.t_start,
        ctx.opts.t_end,
        schedule.samples,
        ctx.started,
    );
    sink.emit(RunStage::Simulating, ctx.opts.t_start);

    let summary = run_with_stop(plant, controller, ctx.reference, &mut sink, ctx.opts, ctx.stop)?;
    sink.emit(RunStage::Completed, summary.t_final);

    Ok((summary, sink.inner, initial))
}

fn rows<const N: usize>(record: &SimRecord<N>) -> Vec<SampleRow> {
    record
        .t
        .iter()
        .zip(&record.reference)
        .zip(&record.x)
        .zip(&record.u)
        .map(|(((t, r), x), u)| SampleRow {
            t: *t,
            reference: *r,
            state: x.iter().copied().collect(),
            u: *u,
        })
        .collect()
}

fn metrics_from<const N: usize>(
    record: &SimRecord<N>,
    initial: (f64, f64),
    angle_index: usize,
    input_limit: f64,
) -> TrackingMetrics {
    let tracked = record.component(0);
    let angle = record.component(angle_index);
    compute_tracking_metrics(&TrackingSeries {
        t: &record.t,
        reference: &record.reference,
        tracked: &tracked,
        angle: &angle,
        input: &record.u,
        initial,
        input_limit,
    })
}
