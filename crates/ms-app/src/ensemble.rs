//! Monte-Carlo ensembles: one configuration, many parameter draws.
//!
//! Members run in parallel on the rayon pool. Each member owns its plant,
//! controller and RNG; a member that fails is reported, not fatal.

use ms_project::RunConfig;
use ms_sim::StopSignal;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::metrics::TrackingMetrics;
use crate::run_service::run_config_with;
use crate::runtime_compile::DrawnParams;

/// Outcome of one ensemble member.
#[derive(Debug, Clone, Serialize)]
pub struct EnsembleMember {
    pub seed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drawn: Option<DrawnParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<TrackingMetrics>,
    pub stopped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregated ensemble results.
#[derive(Debug, Clone, Serialize)]
pub struct EnsembleReport {
    pub name: String,
    pub system: &'static str,
    pub runs: usize,
    pub failed: usize,
    /// Largest absolute final tracking error over successful members
    pub worst_final_error: f64,
    pub mean_abs_final_error: f64,
    pub peak_abs_input: f64,
    pub peak_abs_angle: f64,
    pub members: Vec<EnsembleMember>,
}

/// `runs` consecutive seeds starting at `base`.
pub fn ensemble_seeds(base: u64, runs: usize) -> Vec<u64> {
    (0..runs as u64).map(|i| base.wrapping_add(i)).collect()
}

/// Run `config` once per seed in parallel.
pub fn run_ensemble(
    config: &RunConfig,
    seeds: &[u64],
    stop: &StopSignal,
) -> AppResult<EnsembleReport> {
    if seeds.is_empty() {
        return Err(AppError::InvalidInput(
            "ensemble needs at least one seed".to_string(),
        ));
    }
    ms_project::validate_config(config)?;
    info!(name = %config.name, runs = seeds.len(), "starting ensemble");

    let members: Vec<EnsembleMember> = seeds
        .par_iter()
        .map(|&seed| match run_config_with(config, Some(seed), stop, None) {
            Ok(out) => EnsembleMember {
                seed,
                drawn: Some(out.drawn),
                metrics: Some(out.metrics),
                stopped: out.summary.stopped,
                error: None,
            },
            Err(e) => {
                warn!(seed, error = %e, "ensemble member failed");
                EnsembleMember {
                    seed,
                    drawn: None,
                    metrics: None,
                    stopped: false,
                    error: Some(e.to_string()),
                }
            }
        })
        .collect();

    let report = aggregate(config, members);
    info!(
        runs = report.runs,
        failed = report.failed,
        worst_final_error = report.worst_final_error,
        "ensemble finished"
    );
    Ok(report)
}

fn aggregate(config: &RunConfig, members: Vec<EnsembleMember>) -> EnsembleReport {
    let ok: Vec<&TrackingMetrics> = members.iter().filter_map(|m| m.metrics.as_ref()).collect();
    let fold_max = |f: fn(&TrackingMetrics) -> f64| ok.iter().map(|m| f(m)).fold(0.0, f64::max);

    let worst_final_error = fold_max(|m| m.final_error.abs());
    let mean_abs_final_error = if ok.is_empty() {
        0.0
    } else {
        ok.iter().map(|m| m.final_error.abs()).sum::<f64>() / ok.len() as f64
    };

    EnsembleReport {
        name: config.name.clone(),
        system: config.system.kind(),
        runs: members.len(),
        failed: members.len() - ok.len(),
        worst_final_error,
        mean_abs_final_error,
        peak_abs_input: fold_max(|m| m.peak_abs_input),
        peak_abs_angle: fold_max(|m| m.peak_abs_angle),
        members,
    }
}
