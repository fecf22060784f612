use serde::{Deserialize, Serialize};

use greenread_core::{ParamError, ShotParams, Vec2, rolling_deceleration};

use crate::integrator::{IntegratorConfig, Launch, Trajectory, integrate};

/// Shortest level roll a simulated shot is given (m).
pub const MIN_TRAVEL: f64 = 0.05;
/// Sweep offsets, in steps, around the centre value.
pub const SWEEP_OFFSETS: [i32; 5] = [-2, -1, 0, 1, 2];

/// One forward simulation with the cup in play.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Shot {
    pub launch_speed: f64,
    pub a_roll: f64,
    pub slope_acceleration: Vec2,
    pub trajectory: Trajectory,
}

/// Roll a putt at the pace that would carry it `params.overrun` past the cup
/// on a level green.
pub fn simulate(config: &IntegratorConfig, params: &ShotParams) -> Result<Shot, ParamError> {
    params.validate()?;

    let a_roll = rolling_deceleration(params.stimp_feet);
    let travel = (params.distance_to_target + params.overrun).max(MIN_TRAVEL);
    let launch_speed = config.resistance.closed_form_speed(a_roll, travel);
    let trajectory = integrate(
        config,
        &Launch {
            distance_to_target: params.distance_to_target,
            slope_deg: params.slope_deg,
            a_roll,
            launch_angle_deg: params.launch_angle_deg,
            launch_speed,
        },
    );

    Ok(Shot {
        launch_speed,
        a_roll,
        slope_acceleration: config.slope.acceleration(params.slope_deg),
        trajectory,
    })
}

/// Parameter varied by a sweep.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SweepAxis {
    LaunchAngle,
    Slope,
    Overrun,
}

impl SweepAxis {
    pub fn default_step(self) -> f64 {
        match self {
            Self::LaunchAngle => 1.0,
            Self::Slope => 0.5,
            Self::Overrun => 0.25,
        }
    }

    fn get(self, params: &ShotParams) -> f64 {
        match self {
            Self::LaunchAngle => params.launch_angle_deg,
            Self::Slope => params.slope_deg,
            Self::Overrun => params.overrun,
        }
    }

    fn apply(self, params: ShotParams, value: f64) -> ShotParams {
        match self {
            Self::LaunchAngle => params.with_launch_angle(value),
            Self::Slope => params.with_slope(value),
            // A negative overrun is meaningless; the low end of the sweep
            // stops at zero.
            Self::Overrun => params.with_overrun(value.max(0.0)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SweepOptions {
    /// Falls back to [`SweepAxis::default_step`].
    pub step: Option<f64>,
    pub include_minus: bool,
    pub include_plus: bool,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            step: None,
            include_minus: true,
            include_plus: true,
        }
    }
}

/// The values `centre + k * step` for `k` in `-2..=2`, minus the negative or
/// positive offsets when they are switched off.
pub fn sweep_values(centre: f64, step: f64, include_minus: bool, include_plus: bool) -> Vec<f64> {
    SWEEP_OFFSETS
        .iter()
        .filter(|&&k| (k >= 0 || include_minus) && (k <= 0 || include_plus))
        .map(|&k| centre + f64::from(k) * step)
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepRun {
    pub value: f64,
    pub shot: Shot,
}

/// Independent [`simulate`] runs across one parameter.
pub fn sweep(
    config: &IntegratorConfig,
    params: &ShotParams,
    axis: SweepAxis,
    options: &SweepOptions,
) -> Result<Vec<SweepRun>, ParamError> {
    params.validate()?;
    let step = options.step.unwrap_or_else(|| axis.default_step());
    if !step.is_finite() {
        return Err(ParamError::NonFinite { field: "step" });
    }

    let values = sweep_values(
        axis.get(params),
        step,
        options.include_minus,
        options.include_plus,
    );
    tracing::debug!(?axis, step, runs = values.len(), "sweep");

    values
        .into_iter()
        .map(|value| {
            let varied = axis.apply(*params, value);
            let shot = simulate(config, &varied)?;
            Ok(SweepRun {
                value: axis.get(&varied),
                shot,
            })
        })
        .collect()
}
