//! Compile a run configuration into a runnable plant, controller and reference.

use ms_controls::{
    Controller, LoopGains, OpenLoop, PidController, SampledPid, SecondOrderSpec, StateFeedback,
};
use ms_core::StateVector;
use ms_plants::{
    ArmController, ArmDynamics, ArmParams, ArmPlant, PendulumController, PendulumDesign,
    PendulumDynamics, PendulumGains, PendulumParams, PendulumPlant, Uncertainty, arm, pendulum,
    run_rng,
};
use ms_project::{ArmControllerDef, PendulumControllerDef, RunConfig, SystemDef};
use serde::Serialize;
use tracing::info;

use crate::error::AppResult;
use crate::reference::Reference;

/// Arm control law behind the `Controller` strategy.
pub type ArmLaw = Box<dyn Controller<2> + Send>;
/// Cart-pendulum control law behind the `Controller` strategy.
pub type PendulumLaw = Box<dyn Controller<4> + Send>;

/// Plant and controller for one configured system.
pub enum SystemRuntime {
    Arm { plant: ArmPlant, controller: ArmLaw },
    Pendulum {
        plant: PendulumPlant,
        controller: PendulumLaw,
    },
}

impl SystemRuntime {
    /// Physical constants drawn for this plant instance.
    pub fn drawn(&self) -> DrawnParams {
        match self {
            SystemRuntime::Arm { plant, .. } => DrawnParams::Arm(*plant.dynamics()),
            SystemRuntime::Pendulum { plant, .. } => DrawnParams::Pendulum(*plant.dynamics()),
        }
    }
}

/// Randomized physical constants of one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "system", rename_all = "snake_case")]
pub enum DrawnParams {
    Arm(ArmDynamics),
    Pendulum(PendulumDynamics),
}

/// Everything needed to execute one run.
pub struct CompiledRun {
    pub runtime: SystemRuntime,
    pub reference: Reference,
    /// Seed the parameters were drawn with.
    pub seed: u64,
}

/// Draw plant parameters and build the controller for `config`.
///
/// `seed` overrides the configured seed; with neither, one is drawn from
/// entropy and reported in the result.
pub fn compile_run(config: &RunConfig, seed: Option<u64>) -> AppResult<CompiledRun> {
    let uncertainty = Uncertainty::new(config.alpha)?;
    let (mut rng, seed) = run_rng(seed.or(config.seed));
    info!(
        seed,
        system = config.system.kind(),
        alpha = config.alpha,
        "compiling run"
    );

    let runtime = match &config.system {
        SystemDef::Arm { params, controller } => {
            let plant = arm::build_plant(params, &uncertainty, &mut rng)?
                .with_integrator(config.integrator);
            SystemRuntime::Arm {
                plant,
                controller: arm_law(params, controller)?,
            }
        }
        SystemDef::Pendulum { params, controller } => {
            let plant = pendulum::build_plant(params, &uncertainty, &mut rng)?
                .with_integrator(config.integrator);
            SystemRuntime::Pendulum {
                plant,
                controller: pendulum_law(params, controller)?,
            }
        }
    };

    Ok(CompiledRun {
        runtime,
        reference: Reference::from(&config.reference),
        seed,
    })
}

/// Build the arm control law. Controllers are designed from nominal values.
pub fn arm_law(params: &ArmParams, def: &ArmControllerDef) -> AppResult<ArmLaw> {
    let law: ArmLaw = match def {
        ArmControllerDef::Designed { rise_time_s, zeta } => {
            let spec = SecondOrderSpec::new(*rise_time_s, *zeta)?;
            Box::new(ArmController::design(params, &spec)?)
        }
        ArmControllerDef::Gains { kp, kd } => Box::new(ArmController::new(
            params,
            LoopGains { kp: *kp, kd: *kd },
        )?),
        ArmControllerDef::OpenLoop => Box::new(OpenLoop),
        ArmControllerDef::StateFeedback { k, kr } => Box::new(StateFeedback::new(
            StateVector::<2>::from_column_slice(k),
            *kr,
            params.tau_max,
        )?),
        ArmControllerDef::Pid {
            kp,
            ti_s,
            td_s,
            td_filter_s,
            integral_limit,
        } => {
            let mut pid = PidController::new(*kp, *ti_s, *td_s, *td_filter_s, params.tau_max)?;
            if let Some(limit) = integral_limit {
                pid = pid.with_integral_limit(*limit)?;
            }
            Box::new(SampledPid::<2>::new(pid, 0, params.ts)?)
        }
    };
    Ok(law)
}

/// Build the cart-pendulum control law.
pub fn pendulum_law(
    params: &PendulumParams,
    def: &PendulumControllerDef,
) -> AppResult<PendulumLaw> {
    let law: PendulumLaw = match def {
        PendulumControllerDef::Designed {
            rise_time_s,
            zeta_theta,
            separation,
            zeta_z,
        } => {
            let design = PendulumDesign {
                inner: SecondOrderSpec::new(*rise_time_s, *zeta_theta)?,
                separation: *separation,
                zeta_z: *zeta_z,
            };
            Box::new(PendulumController::design(params, &design)?)
        }
        PendulumControllerDef::Gains {
            kp_z,
            kd_z,
            kp_th,
            kd_th,
        } => Box::new(PendulumController::new(
            params,
            PendulumGains {
                kp_z: *kp_z,
                kd_z: *kd_z,
                kp_th: *kp_th,
                kd_th: *kd_th,
            },
        )?),
        PendulumControllerDef::OpenLoop => Box::new(OpenLoop),
        PendulumControllerDef::StateFeedback { k, kr } => Box::new(StateFeedback::new(
            StateVector::<4>::from_column_slice(k),
            *kr,
            params.f_max,
        )?),
    };
    Ok(law)
}
