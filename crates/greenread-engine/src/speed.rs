use serde::{Deserialize, Serialize};

use greenread_core::{ShotParams, rolling_deceleration};

use crate::integrator::{IntegratorConfig, Launch, Trajectory, integrate};

/// Integrations allowed per solve.
pub const MAX_ITERS: usize = 12;
/// Accept when the overrun is within this many metres of the request.
pub const TOLERANCE: f64 = 0.01;
/// Fraction of the sensitivity-scaled correction applied per iteration.
pub const GAIN: f64 = 0.5;
/// Floor on any speed guess (m/s).
pub const MIN_SPEED: f64 = 0.05;

/// Initial-speed solver settings, loadable from TOML.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpeedSolverConfig {
    pub max_iters: usize,
    pub tolerance: f64,
    pub gain: f64,
    pub min_speed: f64,
}

impl Default for SpeedSolverConfig {
    fn default() -> Self {
        Self {
            max_iters: MAX_ITERS,
            tolerance: TOLERANCE,
            gain: GAIN,
            min_speed: MIN_SPEED,
        }
    }
}

impl SpeedSolverConfig {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.max_iters == 0 {
            return Err("speed.max_iters must be > 0");
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err("speed.tolerance must be positive");
        }
        if !(self.gain > 0.0 && self.gain <= 1.0) {
            return Err("speed.gain must be in (0, 1]");
        }
        if !(self.min_speed.is_finite() && self.min_speed > 0.0) {
            return Err("speed.min_speed must be positive");
        }
        Ok(())
    }
}

/// How a speed solve ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SpeedStatus {
    /// Overrun within tolerance.
    Converged,
    /// Iteration budget ran out; the speed is a best effort.
    MaxIters,
    /// The slope pull toward the cup matches or beats resistance, or the
    /// slope is too steep for resistance to ever hold the ball still, so no
    /// launch speed stops the ball at the requested spot. The floor speed is
    /// returned.
    Degenerate,
}

/// Result of [`solve_launch_speed`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeedSolution {
    pub launch_speed: f64,
    pub status: SpeedStatus,
    /// Integrations performed.
    pub iterations: usize,
    /// Achieved overrun minus requested overrun (m).
    pub residual: f64,
    /// Cup-free roll at `launch_speed`.
    pub trajectory: Trajectory,
}

impl SpeedSolution {
    pub fn is_converged(&self) -> bool {
        self.status == SpeedStatus::Converged
    }
}

/// Distance past the cup line, measured as distance from launch minus the
/// target distance. Negative when the ball stops short.
pub fn achieved_overrun(trajectory: &Trajectory, distance_to_target: f64) -> f64 {
    trajectory.stop_position().length() - distance_to_target
}

fn floor_speed(speed: f64, min_speed: f64) -> f64 {
    if speed.is_finite() {
        speed.max(min_speed)
    } else {
        min_speed
    }
}

/// Find the launch speed whose cup-free roll stops `params.overrun` metres
/// past the target distance.
///
/// Starts from the level closed form and applies damped corrections scaled by
/// the closed form's sensitivity. The result always carries the last guess;
/// check [`SpeedSolution::status`] before trusting it.
pub fn solve_launch_speed(
    integrator: &IntegratorConfig,
    config: &SpeedSolverConfig,
    params: &ShotParams,
) -> SpeedSolution {
    let a_roll = rolling_deceleration(params.stimp_feet);
    let settings = integrator.without_cup();
    let distance = params.distance_to_target;
    let roll = |launch_speed: f64| {
        let trajectory = integrate(
            &settings,
            &Launch {
                distance_to_target: distance,
                slope_deg: params.slope_deg,
                a_roll,
                launch_angle_deg: params.launch_angle_deg,
                launch_speed,
            },
        );
        let error = achieved_overrun(&trajectory, distance) - params.overrun;
        (trajectory, error)
    };

    let a_eff = a_roll - integrator.slope.along_line(params.slope_deg);
    let slope_pull = integrator.slope.acceleration(params.slope_deg).length();
    let never_rests =
        slope_pull > 0.0 && !integrator.resistance.holds_against(slope_pull, a_roll);
    if a_eff.is_nan() || a_eff <= 0.0 || never_rests {
        tracing::warn!(
            a_roll,
            a_eff,
            slope_pull,
            slope_deg = params.slope_deg,
            "slope pull matches resistance; returning floor speed"
        );
        let (trajectory, residual) = roll(config.min_speed);
        return SpeedSolution {
            launch_speed: config.min_speed,
            status: SpeedStatus::Degenerate,
            iterations: 0,
            residual,
            trajectory,
        };
    }

    let resistance = integrator.resistance;
    let travel = distance + params.overrun;
    let mut guess = floor_speed(
        resistance.closed_form_speed(a_eff, travel),
        config.min_speed,
    );
    let (mut trajectory, mut error) = roll(guess);
    let mut iterations = 1;

    let status = loop {
        tracing::debug!(iterations, guess, error, "speed solver step");
        if error.abs() < config.tolerance {
            break SpeedStatus::Converged;
        }
        if iterations >= config.max_iters {
            tracing::warn!(
                iterations,
                guess,
                error,
                "speed solver hit its iteration budget"
            );
            break SpeedStatus::MaxIters;
        }

        let sensitivity = resistance.travel_sensitivity(a_eff, guess);
        guess = floor_speed(guess - config.gain * error / sensitivity, config.min_speed);
        (trajectory, error) = roll(guess);
        iterations += 1;
    };

    SpeedSolution {
        launch_speed: guess,
        status,
        iterations,
        residual: error,
        trajectory,
    }
}
