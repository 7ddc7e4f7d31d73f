//! Fixed-rate simulation framework for mechanical control exercises.
//!
//! Provides:
//! - `Dynamics` trait for continuous-time plant models `xdot = f(x, u)`
//! - Fixed-step RK4 and forward Euler integrators
//! - `Plant`, which owns a state, saturates its input and advances one `Ts`
//! - Two-rate simulation loop (fast control/integration tick, slow sample tick)
//! - Reference source and sample sink collaborator traits, plus a recording sink

pub mod error;
pub mod integrator;
pub mod model;
pub mod plant;
pub mod record;
pub mod signal;
pub mod sim;

// Re-exports for public API
pub use error::{SimError, SimResult};
pub use integrator::{ForwardEuler, Integrator, IntegratorType, Rk4};
pub use model::Dynamics;
pub use plant::Plant;
pub use record::{NullSink, SimRecord};
pub use signal::{PlotSink, ReferenceSource};
pub use sim::{RunSummary, SampleSchedule, SimOptions, StopSignal, run, run_with_stop};
