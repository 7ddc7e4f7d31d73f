//! Feedback control laws for mechsim plants.
//!
//! A controller maps `(reference, state)` to a scalar actuator command. The
//! simulation loop treats controllers as a pluggable strategy through the
//! [`Controller`] trait, so any law with that signature (including a plain
//! closure) can drive a plant.
//!
//! Provided laws:
//! - [`OpenLoop`]: passes the reference straight through as the command
//! - [`StateFeedback`]: `u = sat(kr * r - K x)`
//! - [`SampledPid`]: PID on one state component with anti-windup and a
//!   filtered derivative
//!
//! [`design`] holds pole-placement helpers for second-order loops.

pub mod controller;
pub mod design;
pub mod error;
pub mod pid;

pub use controller::{Controller, OpenLoop, StateFeedback};
pub use design::{LoopGains, SecondOrderPlant, SecondOrderSpec};
pub use error::{ControlError, ControlResult};
pub use pid::{PidController, PidState, SampledPid};
