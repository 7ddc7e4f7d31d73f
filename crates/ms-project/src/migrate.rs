//! Run configuration migrations.

use crate::ProjectError;
use crate::schema::RunConfig;

pub const LATEST_VERSION: u32 = 1;

pub fn migrate_to_latest(mut config: RunConfig) -> Result<RunConfig, ProjectError> {
    while config.version < LATEST_VERSION {
        config = migrate_one_version(config)?;
    }
    Ok(config)
}

fn migrate_one_version(config: RunConfig) -> Result<RunConfig, ProjectError> {
    match config.version {
        0 => migrate_v0_to_v1(config),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

/// Version 0 files predate `t_plot` validation and commonly carried a plot
/// period that was not a whole number of sample periods; snap it to the
/// nearest multiple of `Ts` (at least one).
fn migrate_v0_to_v1(mut config: RunConfig) -> Result<RunConfig, ProjectError> {
    let ts = config.ts();
    if ts > 0.0 && config.sim.t_plot.is_finite() {
        let steps = (config.sim.t_plot / ts).round().max(1.0);
        config.sim.t_plot = steps * ts;
    }
    config.version = 1;
    Ok(config)
}
