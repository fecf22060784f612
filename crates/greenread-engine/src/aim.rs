use serde::{Deserialize, Serialize};

use greenread_core::{ShotParams, Vec2, rolling_deceleration};

use crate::error::SolveError;
use crate::integrator::{IntegratorConfig, Launch, Trajectory, integrate};

pub const LOW_DEG: f64 = -45.0;
pub const HIGH_DEG: f64 = 45.0;
pub const MAX_ITERS: usize = 60;
/// Accept when the cup-line deflection is within this many metres.
pub const TOLERANCE: f64 = 0.001;
/// Bisection steps spent pulling an unreachable bracket end inward.
pub const BRACKET_CONTRACTIONS: usize = 6;

/// Aim-angle solver settings, loadable from TOML.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AimSolverConfig {
    pub low_deg: f64,
    pub high_deg: f64,
    pub max_iters: usize,
    pub tolerance: f64,
    /// Steps spent pulling a bracket end that misses the cup line toward the
    /// centre. Zero is strict bracketing: an end that misses the cup line
    /// fails the solve with [`SolveError::TargetUnreachable`] instead of
    /// being moved.
    pub bracket_contractions: usize,
}

impl Default for AimSolverConfig {
    fn default() -> Self {
        Self {
            low_deg: LOW_DEG,
            high_deg: HIGH_DEG,
            max_iters: MAX_ITERS,
            tolerance: TOLERANCE,
            bracket_contractions: BRACKET_CONTRACTIONS,
        }
    }
}

impl AimSolverConfig {
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(self.low_deg.is_finite() && self.high_deg.is_finite()) {
            return Err("aim bracket must be finite");
        }
        if self.low_deg >= self.high_deg {
            return Err("aim.low_deg must be below aim.high_deg");
        }
        if self.low_deg <= -90.0 || self.high_deg >= 90.0 {
            return Err("aim bracket must stay within (-90, 90) degrees");
        }
        if self.max_iters == 0 {
            return Err("aim.max_iters must be > 0");
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err("aim.tolerance must be positive");
        }
        Ok(())
    }

    fn centre(&self) -> f64 {
        (self.low_deg + self.high_deg) / 2.0
    }
}

/// Result of [`solve_launch_angle`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AimSolution {
    pub launch_angle_deg: f64,
    pub launch_speed: f64,
    /// Lateral offset where the path crosses the cup line (m).
    pub deflection: f64,
    /// Bisection steps taken; zero when a bracket end already met the
    /// tolerance.
    pub iterations: usize,
    /// Cup-free roll at the solved angle.
    pub trajectory: Trajectory,
}

/// Outcome of one trial roll.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Probe {
    /// The path crossed the cup line at this lateral offset.
    Crossed { deflection: f64 },
    /// Stopped before covering the putt distance.
    Short { stop: Vec2 },
    /// Covered the distance without crossing the cup line.
    Wide { stop: Vec2 },
}

impl Probe {
    fn deflection(self) -> Option<f64> {
        match self {
            Self::Crossed { deflection } => Some(deflection),
            _ => None,
        }
    }

    /// Signed side used to pick a half-interval. Misses fall back to the
    /// side the ball stopped on.
    fn side(self) -> f64 {
        match self {
            Self::Crossed { deflection } => deflection,
            Self::Short { stop } | Self::Wide { stop } => stop.x,
        }
    }
}

struct Prober<'a> {
    config: IntegratorConfig,
    params: &'a ShotParams,
    a_roll: f64,
    launch_speed: f64,
}

impl Prober<'_> {
    fn run(&self, angle_deg: f64) -> (Probe, Trajectory) {
        let distance = self.params.distance_to_target;
        let trajectory = integrate(
            &self.config,
            &Launch {
                distance_to_target: distance,
                slope_deg: self.params.slope_deg,
                a_roll: self.a_roll,
                launch_angle_deg: angle_deg,
                launch_speed: self.launch_speed,
            },
        );
        let stop = trajectory.stop_position();
        let probe = match trajectory.crossing_at(distance) {
            Some(hit) => Probe::Crossed { deflection: hit.x },
            None if stop.length() < distance => Probe::Short { stop },
            None => Probe::Wide { stop },
        };
        (probe, trajectory)
    }

    /// Angle nearest `end` whose path still reaches the cup line, searched
    /// by bisecting between `end` and the bracket centre.
    fn reach(&self, end: f64, centre: f64, contractions: usize) -> Option<(f64, f64)> {
        let (probe, _) = self.run(end);
        if let Some(deflection) = probe.deflection() {
            return Some((end, deflection));
        }

        let mut outer = end;
        let mut inner = centre;
        let mut found = None;
        for _ in 0..contractions {
            let mid = (outer + inner) / 2.0;
            match self.run(mid).0.deflection() {
                Some(deflection) => {
                    found = Some((mid, deflection));
                    inner = mid;
                },
                None => outer = mid,
            }
        }
        if let Some((angle, _)) = found {
            tracing::debug!(end, angle, "contracted bracket end to reach the cup line");
        }
        found
    }

    fn solution(&self, angle: f64, iterations: usize) -> AimSolution {
        let (probe, trajectory) = self.run(angle);
        AimSolution {
            launch_angle_deg: angle,
            launch_speed: self.launch_speed,
            deflection: probe.side(),
            iterations,
            trajectory,
        }
    }
}

/// Find the launch angle whose path crosses the cup line through the cup
/// centre, at the launch speed that gives `params.overrun` on a level green.
///
/// Bisects on the lateral deflection at `y = distance_to_target` with the cup
/// ignored. `params.launch_angle_deg` is not used.
pub fn solve_launch_angle(
    integrator: &IntegratorConfig,
    config: &AimSolverConfig,
    params: &ShotParams,
) -> Result<AimSolution, SolveError> {
    params.validate()?;

    let a_roll = rolling_deceleration(params.stimp_feet);
    let launch_speed = integrator
        .resistance
        .closed_form_speed(a_roll, params.distance_to_target + params.overrun);
    let prober = Prober {
        config: integrator.without_cup(),
        params,
        a_roll,
        launch_speed,
    };

    let centre = config.centre();
    let (mut low, mut f_low) = prober
        .reach(config.low_deg, centre, config.bracket_contractions)
        .ok_or(SolveError::TargetUnreachable {
            angle_deg: config.low_deg,
        })?;
    let (mut high, mut f_high) = prober
        .reach(config.high_deg, centre, config.bracket_contractions)
        .ok_or(SolveError::TargetUnreachable {
            angle_deg: config.high_deg,
        })?;

    if f_low.abs() < config.tolerance {
        return Ok(prober.solution(low, 0));
    }
    if f_high.abs() < config.tolerance {
        return Ok(prober.solution(high, 0));
    }
    if f_low.signum() == f_high.signum() {
        tracing::warn!(low, high, f_low, f_high, "aim bracket does not straddle the cup");
        return Err(SolveError::NotBracketed {
            low_deg: low,
            high_deg: high,
            f_low,
            f_high,
        });
    }

    let mut best = (low, f_low);
    if f_high.abs() < f_low.abs() {
        best = (high, f_high);
    }

    for iteration in 1..=config.max_iters {
        let mid = (low + high) / 2.0;
        let (probe, trajectory) = prober.run(mid);
        let side = probe.side();
        tracing::debug!(iteration, mid, side, ?probe, "aim solver step");

        if let Some(deflection) = probe.deflection() {
            if deflection.abs() < config.tolerance {
                return Ok(AimSolution {
                    launch_angle_deg: mid,
                    launch_speed,
                    deflection,
                    iterations: iteration,
                    trajectory,
                });
            }
            if deflection.abs() < best.1.abs() {
                best = (mid, deflection);
            }
        } else {
            tracing::debug!(mid, ?probe, "midpoint missed the cup line, using stop side");
        }

        if side.signum() == f_low.signum() {
            low = mid;
            f_low = side;
        } else {
            high = mid;
            f_high = side;
        }
    }

    tracing::warn!(
        iterations = config.max_iters,
        best_angle = best.0,
        residual = best.1,
        f_high,
        "aim solver hit its iteration budget"
    );
    Err(SolveError::NoConvergence {
        iterations: config.max_iters,
        best_angle_deg: best.0,
        residual: best.1,
    })
}
