pub mod aim;
pub mod capture;
pub mod config;
pub mod error;
pub mod integrator;
pub mod shot;
pub mod speed;

use greenread_core::{ParamError, ShotParams, rolling_deceleration};

pub use aim::{AimSolution, AimSolverConfig};
pub use config::EngineConfig;
pub use error::{ConfigError, SolveError};
pub use integrator::{
    IntegratorConfig, Launch, ResistanceModel, SlopeAxis, SlopeFormula, SlopeModel, StopReason,
    StopRecord, Trajectory,
};
pub use shot::{Shot, SweepAxis, SweepOptions, SweepRun, sweep_values};
pub use speed::{SpeedSolution, SpeedSolverConfig, SpeedStatus};

/// Engine bound to one configuration. Every method is a pure function of its
/// arguments and the config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn integrate(&self, launch: &Launch) -> Trajectory {
        integrator::integrate(&self.config.integrator, launch)
    }

    /// Single forward roll with the cup in play.
    pub fn simulate(&self, params: &ShotParams) -> Result<Shot, ParamError> {
        shot::simulate(&self.config.integrator, params)
    }

    pub fn solve_launch_speed(&self, params: &ShotParams) -> Result<SpeedSolution, ParamError> {
        params.validate()?;
        Ok(speed::solve_launch_speed(
            &self.config.integrator,
            &self.config.speed,
            params,
        ))
    }

    pub fn solve_launch_angle(&self, params: &ShotParams) -> Result<AimSolution, SolveError> {
        aim::solve_launch_angle(&self.config.integrator, &self.config.aim, params)
    }

    pub fn sweep(
        &self,
        params: &ShotParams,
        axis: SweepAxis,
        options: &SweepOptions,
    ) -> Result<Vec<SweepRun>, ParamError> {
        shot::sweep(&self.config.integrator, params, axis, options)
    }
}

/// Rolling deceleration (m/s^2) for a stimpmeter reading in feet.
pub fn compute_deceleration(stimp_feet: f64) -> f64 {
    rolling_deceleration(stimp_feet)
}

/// Roll one ball with the default integrator settings.
pub fn integrate(
    distance_to_target: f64,
    slope_deg: f64,
    a_roll: f64,
    launch_angle_deg: f64,
    launch_speed: f64,
) -> Trajectory {
    Engine::default().integrate(&Launch {
        distance_to_target,
        slope_deg,
        a_roll,
        launch_angle_deg,
        launch_speed,
    })
}

/// Launch speed giving `target_overrun` past the cup, with default settings.
pub fn solve_launch_speed(
    distance_to_target: f64,
    slope_deg: f64,
    stimp_feet: f64,
    launch_angle_deg: f64,
    target_overrun: f64,
) -> Result<SpeedSolution, ParamError> {
    let params = ShotParams::new(
        distance_to_target,
        slope_deg,
        stimp_feet,
        launch_angle_deg,
        target_overrun,
    )?;
    Engine::default().solve_launch_speed(&params)
}

/// Aim that sends the ball through the cup centre at the pace of
/// `fixed_overrun`, with default settings.
pub fn solve_launch_angle(
    distance_to_target: f64,
    slope_deg: f64,
    stimp_feet: f64,
    fixed_overrun: f64,
) -> Result<AimSolution, SolveError> {
    let params = ShotParams::new(distance_to_target, slope_deg, stimp_feet, 0.0, fixed_overrun)?;
    Engine::default().solve_launch_angle(&params)
}
