//! Tracking performance metrics.
//!
//! Computes tracking error, control effort and step-response figures (rise
//! time, settling time, overshoot) from a recorded run.

use serde::{Deserialize, Serialize};

/// Tracking and effort figures for one run.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TrackingMetrics {
    /// Reference minus tracked output at the last sample
    pub final_error: f64,
    /// Largest absolute control command
    pub peak_abs_input: f64,
    /// Largest absolute angle (arm angle or rod angle)
    pub peak_abs_angle: f64,
    /// Percentage of samples with the command at its limit
    pub saturation_pct: f64,
    /// Time to cover 90% of the first reference step (seconds)
    pub rise_time_90_s: Option<f64>,
    /// Time after which the output stays within 2% of the first step (seconds)
    pub settling_time_2pct_s: Option<f64>,
    /// Peak overshoot past the first step, in percent of the step size
    pub overshoot_pct: Option<f64>,
}

/// Recorded series for one run, all sampled at the same instants.
pub struct TrackingSeries<'a> {
    pub t: &'a [f64],
    pub reference: &'a [f64],
    /// Output that should follow the reference
    pub tracked: &'a [f64],
    pub angle: &'a [f64],
    pub input: &'a [f64],
    /// Start time and tracked output before the first sample
    pub initial: (f64, f64),
    /// Actuator saturation limit
    pub input_limit: f64,
}

/// Compute metrics from recorded series. Empty series give all-default metrics.
pub fn compute_tracking_metrics(series: &TrackingSeries<'_>) -> TrackingMetrics {
    let n = series.t.len();
    if n == 0 {
        return TrackingMetrics::default();
    }

    let mut metrics = TrackingMetrics {
        final_error: series.reference[n - 1] - series.tracked[n - 1],
        peak_abs_input: peak_abs(series.input),
        peak_abs_angle: peak_abs(series.angle),
        saturation_pct: saturation_pct(series.input, series.input_limit),
        ..TrackingMetrics::default()
    };

    // Step figures over the leading stretch of constant reference
    let target = series.reference[0];
    let end = series
        .reference
        .iter()
        .position(|r| (r - target).abs() > 1e-12)
        .unwrap_or(n);
    let (t0, y0) = series.initial;
    let response: Vec<(f64, f64)> = std::iter::once((t0, y0))
        .chain(
            series.t[..end]
                .iter()
                .copied()
                .zip(series.tracked[..end].iter().copied()),
        )
        .collect();

    let change = target - y0;
    if change.abs() > 1e-9 {
        metrics.rise_time_90_s = time_to_fraction(&response, y0, target, 0.9);
        metrics.settling_time_2pct_s = settling_time(&response, target, 0.02 * change.abs());

        let peak_past = response
            .iter()
            .map(|(_, y)| (y - target) * change.signum())
            .fold(f64::NEG_INFINITY, f64::max);
        if peak_past > 0.0 {
            metrics.overshoot_pct = Some(peak_past / change.abs() * 100.0);
        }
    }

    metrics
}

fn peak_abs(values: &[f64]) -> f64 {
    values.iter().map(|v| v.abs()).fold(0.0, f64::max)
}

fn saturation_pct(input: &[f64], limit: f64) -> f64 {
    if input.is_empty() || limit <= 0.0 {
        return 0.0;
    }
    let at_limit = input
        .iter()
        .filter(|u| u.abs() >= limit * (1.0 - 1e-9))
        .count();
    at_limit as f64 / input.len() as f64 * 100.0
}

/// Time at which the response first covers `fraction` of the way from
/// `initial` to `target`, linearly interpolated between samples.
fn time_to_fraction(series: &[(f64, f64)], initial: f64, target: f64, fraction: f64) -> Option<f64> {
    let change = target - initial;
    let level = initial + fraction * change;
    let reached = |v: f64| {
        if change > 0.0 {
            v >= level
        } else {
            v <= level
        }
    };

    for (i, &(time, val)) in series.iter().enumerate() {
        if i > 0 && reached(val) {
            let (prev_time, prev_val) = series[i - 1];
            let delta_v = val - prev_val;
            if delta_v.abs() > 1e-12 {
                let frac = (level - prev_val) / delta_v;
                return Some(prev_time + frac * (time - prev_time));
            }
            return Some(time);
        }
    }
    None
}

/// First sample time after which the response never leaves `target +/- band`.
fn settling_time(series: &[(f64, f64)], target: f64, band: f64) -> Option<f64> {
    let mut entered: Option<f64> = None;
    for &(time, val) in series {
        if (val - target).abs() < band {
            entered.get_or_insert(time);
        } else {
            entered = None;
        }
    }
    entered
}
