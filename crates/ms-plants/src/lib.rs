//! ms-plants: physical systems for mechsim.
//!
//! Provides two single-degree-of-freedom exercises, each as
//! - nominal parameters (with defaults from the coursework parameter files)
//! - continuous-time dynamics implementing `ms_sim::Dynamics`
//! - a feedback controller implementing `ms_controls::Controller`
//!
//! Systems:
//! - Single-link arm (`[theta, thetadot]`, torque input)
//! - Inverted pendulum on a cart (`[z, theta, zdot, thetadot]`, force input)
//!
//! Uncertain parameters are drawn once per plant from a seedable RNG.
//!
//! # Example
//!
//! ```
//! use ms_plants::{ArmController, ArmParams, Uncertainty, arm};
//! use ms_controls::SecondOrderSpec;
//! use ms_sim::{SimOptions, SimRecord, run};
//! use rand::SeedableRng;
//!
//! let params = ArmParams::default();
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let mut plant = arm::build_plant(&params, &Uncertainty::default(), &mut rng).unwrap();
//! let spec = SecondOrderSpec::new(0.4, 0.707).unwrap();
//! let mut ctrl = ArmController::design(&params, &spec).unwrap();
//! let mut record = SimRecord::new();
//! let opts = SimOptions { t_end: 2.0, ..SimOptions::default() };
//!
//! let summary = run(&mut plant, &mut ctrl, &|_t: f64| 0.5, &mut record, &opts).unwrap();
//! assert_eq!(summary.samples, 20);
//! ```

pub mod arm;
pub mod arm_control;
pub mod error;
pub mod pendulum;
pub mod pendulum_control;
pub mod uncertainty;

pub use arm::{ArmDynamics, ArmParams, ArmPlant};
pub use arm_control::ArmController;
pub use error::{PlantError, PlantResult};
pub use pendulum::{PendulumDynamics, PendulumParams, PendulumPlant};
pub use pendulum_control::{PendulumController, PendulumDesign, PendulumGains};
pub use uncertainty::{Uncertainty, run_rng};
