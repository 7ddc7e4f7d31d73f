//! ms-core: shared foundation for mechsim.
//!
//! Contains:
//! - numeric (Real, tolerances, saturation, float helpers)
//! - state (fixed-size state vectors)
//! - timing (wall-clock timers for run instrumentation)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod state;
pub mod timing;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use state::*;
