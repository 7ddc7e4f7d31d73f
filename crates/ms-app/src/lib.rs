//! Shared application service layer for mechsim.
//!
//! This crate sits between the command-line frontend and the simulation
//! crates: it loads run configurations, compiles them into a plant,
//! controller and reference, executes runs and Monte-Carlo ensembles, and
//! summarizes the results.

pub mod ensemble;
pub mod error;
pub mod metrics;
pub mod progress;
pub mod project_service;
pub mod reference;
pub mod run_service;
pub mod runtime_compile;

// Re-export key types for convenience
pub use ensemble::{EnsembleMember, EnsembleReport, ensemble_seeds, run_ensemble};
pub use error::{AppError, AppResult};
pub use metrics::{TrackingMetrics, compute_tracking_metrics};
pub use progress::{ProgressCallback, RunProgressEvent, RunStage};
pub use project_service::{
    ConfigSummary, default_config, load_config, save_config, summarize, validate_config,
};
pub use reference::Reference;
pub use run_service::{RunOutput, SampleRow, run_config, run_config_with};
pub use runtime_compile::{CompiledRun, DrawnParams, SystemRuntime, compile_run};
