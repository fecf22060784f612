use serde::{Deserialize, Serialize};

use greenread_core::Vec2;

use crate::capture::segment_circle_hit;

/// Standard gravity (m/s^2).
pub const GRAVITY: f64 = 9.80665;
/// Fixed integration step (s).
pub const TIME_STEP: f64 = 0.01;
/// Below this speed (m/s) the ball is at rest.
pub const STOP_SPEED: f64 = 0.01;
/// Below this acceleration magnitude (m/s^2) slope and resistance cancel out.
pub const ACCEL_EPSILON: f64 = 1e-6;
/// Floor on the simulated duration (s).
pub const MIN_DURATION: f64 = 10.0;
/// Added to the stopping-time estimate before the duration floor applies (s).
pub const DURATION_MARGIN: f64 = 2.0;
/// Regulation cup diameter (m).
pub const CUP_DIAMETER: f64 = 0.108;
/// Suggested lip-out speed (m/s) for `max_capture_speed`: crossings faster
/// than this keep rolling. Off by default.
pub const LIP_OUT_SPEED: f64 = 1.31;
/// Keep every n-th step in the stored path.
pub const SAMPLE_STRIDE: usize = 2;
/// Added to the speed in the resistance denominator.
const SPEED_GUARD: f64 = 1e-9;

/// How rolling resistance scales with speed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResistanceModel {
    /// Constant-magnitude deceleration opposing the velocity.
    #[default]
    Constant,
    /// Deceleration proportional to velocity, `k = a_roll / launch_speed`.
    LinearDrag,
}

impl ResistanceModel {
    /// Resistance acceleration for the current velocity.
    pub fn acceleration(self, velocity: Vec2, speed: f64, a_roll: f64, launch_speed: f64) -> Vec2 {
        match self {
            Self::Constant => velocity * (-a_roll / (speed + SPEED_GUARD)),
            Self::LinearDrag => velocity * (-a_roll / launch_speed.max(SPEED_GUARD)),
        }
    }

    /// Launch speed that rolls `travel` metres on the level under
    /// deceleration `a`.
    pub fn closed_form_speed(self, a: f64, travel: f64) -> f64 {
        match self {
            Self::Constant => (2.0 * a * travel).sqrt(),
            Self::LinearDrag => (a * travel).sqrt(),
        }
    }

    /// d(stopping distance)/d(launch speed) of the level closed form.
    pub fn travel_sensitivity(self, a: f64, speed: f64) -> f64 {
        match self {
            Self::Constant => speed / a,
            Self::LinearDrag => 2.0 * speed / a,
        }
    }

    /// Rough time until a ball launched at `speed` comes to rest.
    fn time_estimate(self, speed: f64, a_roll: f64, stop_speed: f64) -> f64 {
        match self {
            Self::Constant => speed / a_roll,
            Self::LinearDrag => speed / a_roll * (speed / stop_speed).max(1.0).ln(),
        }
    }

    /// Whether resistance holds a resting ball against a slope pull of the
    /// given magnitude. Drag vanishes at rest, so it never does.
    pub fn holds_against(self, slope_pull: f64, a_roll: f64) -> bool {
        match self {
            Self::Constant => slope_pull <= a_roll,
            Self::LinearDrag => false,
        }
    }
}

/// Formula turning the slope angle into a downhill acceleration.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SlopeFormula {
    /// `g * tan(theta)`.
    #[default]
    Tangent,
    /// `g * sin(theta)`.
    Sine,
}

/// Direction in which the green falls for a positive slope angle.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SlopeAxis {
    /// Side slope: positive angles pull toward `+x`.
    #[default]
    Lateral,
    /// Along the putt line: positive angles pull toward the cup (`+y`).
    AlongLine,
}

/// Slope convention: one signed downhill acceleration applied along one axis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SlopeModel {
    pub formula: SlopeFormula,
    pub axis: SlopeAxis,
    pub gravity: f64,
}

impl Default for SlopeModel {
    fn default() -> Self {
        Self {
            formula: SlopeFormula::default(),
            axis: SlopeAxis::default(),
            gravity: GRAVITY,
        }
    }
}

impl SlopeModel {
    /// Signed downhill acceleration (m/s^2) for a slope in degrees.
    pub fn downhill_acceleration(&self, slope_deg: f64) -> f64 {
        let theta = slope_deg.to_radians();
        let a = match self.formula {
            SlopeFormula::Tangent => self.gravity * theta.tan(),
            SlopeFormula::Sine => self.gravity * theta.sin(),
        };
        if a.is_finite() { a } else { 0.0 }
    }

    /// Constant slope acceleration vector.
    pub fn acceleration(&self, slope_deg: f64) -> Vec2 {
        let a = self.downhill_acceleration(slope_deg);
        match self.axis {
            SlopeAxis::Lateral => Vec2::new(a, 0.0),
            SlopeAxis::AlongLine => Vec2::new(0.0, a),
        }
    }

    /// Component of the slope pull toward the cup.
    pub fn along_line(&self, slope_deg: f64) -> f64 {
        match self.axis {
            SlopeAxis::Lateral => 0.0,
            SlopeAxis::AlongLine => self.downhill_acceleration(slope_deg),
        }
    }
}

/// Integrator settings, loadable from TOML.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IntegratorConfig {
    pub dt: f64,
    pub stop_speed: f64,
    pub accel_epsilon: f64,
    pub min_duration: f64,
    pub duration_margin: f64,
    pub sample_stride: usize,
    pub cup_diameter: f64,
    /// Crossings faster than this lip out. `inf` (the default) captures
    /// every crossing.
    pub max_capture_speed: f64,
    /// When false the cup is ignored entirely.
    pub capture: bool,
    pub resistance: ResistanceModel,
    pub slope: SlopeModel,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            dt: TIME_STEP,
            stop_speed: STOP_SPEED,
            accel_epsilon: ACCEL_EPSILON,
            min_duration: MIN_DURATION,
            duration_margin: DURATION_MARGIN,
            sample_stride: SAMPLE_STRIDE,
            cup_diameter: CUP_DIAMETER,
            max_capture_speed: f64::INFINITY,
            capture: true,
            resistance: ResistanceModel::default(),
            slope: SlopeModel::default(),
        }
    }
}

impl IntegratorConfig {
    pub fn cup_radius(&self) -> f64 {
        self.cup_diameter / 2.0
    }

    /// Settings for solver runs: the cup is ignored (the ball rolls as if
    /// the target were absent) and every step is stored.
    pub fn without_cup(&self) -> Self {
        Self {
            capture: false,
            sample_stride: 1,
            ..*self
        }
    }

    /// Safety bound on simulated time for a launch.
    pub fn max_duration(&self, launch_speed: f64, a_roll: f64) -> f64 {
        let estimate = self
            .resistance
            .time_estimate(launch_speed, a_roll, self.stop_speed);
        if estimate.is_finite() {
            (estimate + self.duration_margin).max(self.min_duration)
        } else {
            self.min_duration
        }
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err("integrator.dt must be positive");
        }
        if !(self.stop_speed.is_finite() && self.stop_speed > 0.0) {
            return Err("integrator.stop_speed must be positive");
        }
        if !(self.accel_epsilon.is_finite() && self.accel_epsilon >= 0.0) {
            return Err("integrator.accel_epsilon must not be negative");
        }
        if !(self.min_duration.is_finite() && self.min_duration > 0.0) {
            return Err("integrator.min_duration must be positive");
        }
        if !(self.duration_margin.is_finite() && self.duration_margin >= 0.0) {
            return Err("integrator.duration_margin must not be negative");
        }
        if self.sample_stride == 0 {
            return Err("integrator.sample_stride must be > 0");
        }
        if !(self.cup_diameter.is_finite() && self.cup_diameter > 0.0) {
            return Err("integrator.cup_diameter must be positive");
        }
        if self.max_capture_speed.is_nan() || self.max_capture_speed <= 0.0 {
            return Err("integrator.max_capture_speed must be positive");
        }
        if !(self.slope.gravity.is_finite() && self.slope.gravity > 0.0) {
            return Err("integrator.slope.gravity must be positive");
        }
        Ok(())
    }
}

/// Inputs of one integration run. Angles in degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Launch {
    pub distance_to_target: f64,
    pub slope_deg: f64,
    pub a_roll: f64,
    pub launch_angle_deg: f64,
    pub launch_speed: f64,
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Speed fell below the rest threshold or resistance used up the motion.
    Rested,
    /// Slope and resistance cancelled out.
    Balanced,
    /// The ball dropped into the cup.
    Captured,
    /// The simulated-time bound ran out.
    TimeLimit,
}

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StopRecord {
    pub position: Vec2,
    pub elapsed: f64,
    pub captured: bool,
    /// Speed of the step that crossed the cup.
    pub capture_speed: Option<f64>,
    /// Index of the capture point in [`Trajectory::samples`].
    pub captured_index: Option<usize>,
    pub reason: StopReason,
}

/// Path from launch to termination. `samples[0]` is the launch point and the
/// last sample is always the stop position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trajectory {
    pub samples: Vec<Vec2>,
    pub stop: StopRecord,
}

impl Trajectory {
    pub fn stop_position(&self) -> Vec2 {
        self.stop.position
    }

    pub fn is_captured(&self) -> bool {
        self.stop.captured
    }

    /// Where the stored path first crosses the line `y = distance`, linearly
    /// interpolated between the straddling samples.
    pub fn crossing_at(&self, distance: f64) -> Option<Vec2> {
        self.samples.windows(2).find_map(|pair| {
            let (a, b) = (pair[0], pair[1]);
            if a.y < distance && b.y >= distance {
                let t = (distance - a.y) / (b.y - a.y);
                Some(a.lerp(b, t))
            } else {
                None
            }
        })
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

/// Roll one ball from the origin toward the cup at `(0, distance_to_target)`
/// until it rests, balances, drops, or runs out of time.
///
/// Forward Euler: velocity first, then position from the new velocity.
pub fn integrate(config: &IntegratorConfig, launch: &Launch) -> Trajectory {
    let target = Vec2::new(0.0, launch.distance_to_target);
    let radius = config.cup_radius();
    let dt = config.dt;
    let stride = config.sample_stride.max(1);

    let a_roll = finite_or(launch.a_roll, 0.0).max(0.0);
    let launch_speed = finite_or(launch.launch_speed, 0.0).max(0.0);
    let heading = finite_or(launch.launch_angle_deg, 0.0).to_radians();
    let slope = config.slope.acceleration(launch.slope_deg);
    let slope_pull = slope.length();

    let max_steps = (config.max_duration(launch_speed, a_roll) / dt).ceil() as usize;

    let mut position = Vec2::ZERO;
    let mut velocity = Vec2::from_heading(heading) * launch_speed;
    let mut samples = vec![position];
    let mut steps = 0usize;
    let mut capture: Option<(usize, f64)> = None;

    let reason = loop {
        let speed = velocity.length();
        if speed < config.stop_speed {
            break StopReason::Rested;
        }
        if steps >= max_steps {
            break StopReason::TimeLimit;
        }

        let accel = config
            .resistance
            .acceleration(velocity, speed, a_roll, launch_speed)
            + slope;
        if accel.length() < config.accel_epsilon {
            break StopReason::Balanced;
        }

        let next_velocity = velocity + accel * dt;
        steps += 1;

        // Resistance would flip the ball around: it comes to rest this step
        // unless the slope is steep enough to roll it back.
        if next_velocity.dot(velocity) <= 0.0
            && config.resistance.holds_against(slope_pull, a_roll)
        {
            break StopReason::Rested;
        }

        velocity = next_velocity;
        let previous = position;
        position += velocity * dt;

        if config.capture
            && let Some(hit) = segment_circle_hit(previous, position, target, radius)
        {
            let crossing_speed = velocity.length();
            if crossing_speed <= config.max_capture_speed {
                position = hit;
                samples.push(hit);
                capture = Some((samples.len() - 1, crossing_speed));
                break StopReason::Captured;
            }
        }

        if steps % stride == 0 {
            samples.push(position);
        }
    };

    if samples.last() != Some(&position) {
        samples.push(position);
    }

    let elapsed = steps as f64 * dt;
    tracing::trace!(?reason, steps, elapsed, x = position.x, y = position.y, "roll finished");

    Trajectory {
        samples,
        stop: StopRecord {
            position,
            elapsed,
            captured: capture.is_some(),
            capture_speed: capture.map(|(_, speed)| speed),
            captured_index: capture.map(|(index, _)| index),
            reason,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use greenread_core::rolling_deceleration;

    fn straight(distance: f64, a_roll: f64, launch_speed: f64) -> Launch {
        Launch {
            distance_to_target: distance,
            slope_deg: 0.0,
            a_roll,
            launch_angle_deg: 0.0,
            launch_speed,
        }
    }

    /// Level-green speed that rolls `travel` metres.
    fn level_speed(a_roll: f64, travel: f64) -> f64 {
        ResistanceModel::Constant.closed_form_speed(a_roll, travel)
    }

    #[test]
    fn level_roll_stops_near_closed_form_distance() {
        let a = rolling_deceleration(9.0);
        let config = IntegratorConfig::default().without_cup();
        let traj = integrate(&config, &straight(3.0, a, level_speed(a, 3.5)));

        assert_eq!(traj.stop.reason, StopReason::Rested);
        assert!(!traj.is_captured());
        assert_abs_diff_eq!(traj.stop_position().x, 0.0, epsilon = 1e-12);
        // Euler with velocity-first update falls slightly short.
        let stop_y = traj.stop_position().y;
        assert!(stop_y < 3.5 && stop_y > 3.47, "stop y = {stop_y}");
    }

    #[test]
    fn path_starts_at_launch_and_ends_at_stop() {
        let a = rolling_deceleration(9.0);
        let traj = integrate(&IntegratorConfig::default(), &straight(3.0, a, 1.0));
        assert_eq!(traj.samples[0], Vec2::ZERO);
        assert_eq!(traj.samples.last().copied(), Some(traj.stop_position()));
    }

    #[test]
    fn moderate_pace_through_centre_drops() {
        let a = rolling_deceleration(9.0);
        let traj = integrate(
            &IntegratorConfig::default(),
            &straight(3.0, a, level_speed(a, 3.5)),
        );

        assert!(traj.is_captured());
        assert_eq!(traj.stop.reason, StopReason::Captured);
        let index = traj.stop.captured_index.expect("capture index");
        assert_eq!(index, traj.samples.len() - 1);
        assert_eq!(traj.samples[index], traj.stop_position());
        assert!(traj.stop_position().distance(Vec2::new(0.0, 3.0)) <= 0.054);

        let speed = traj.stop.capture_speed.expect("capture speed");
        assert!(speed > 0.0 && speed <= LIP_OUT_SPEED);
    }

    #[test]
    fn fast_ball_through_centre_drops_by_default() {
        let a = rolling_deceleration(9.0);
        let traj = integrate(
            &IntegratorConfig::default(),
            &straight(3.0, a, level_speed(a, 6.0)),
        );
        assert!(traj.is_captured());
        assert_eq!(traj.stop.reason, StopReason::Captured);
        assert!(traj.stop_position().distance(Vec2::new(0.0, 3.0)) <= 0.054);
        assert!(traj.stop.capture_speed.unwrap_or_default() > LIP_OUT_SPEED);
    }

    #[test]
    fn lip_out_gate_lets_fast_ball_roll_on() {
        let a = rolling_deceleration(9.0);
        let config = IntegratorConfig {
            max_capture_speed: LIP_OUT_SPEED,
            ..IntegratorConfig::default()
        };
        let traj = integrate(&config, &straight(3.0, a, level_speed(a, 6.0)));
        assert!(!traj.is_captured());
        assert_eq!(traj.stop.captured_index, None);
        assert_eq!(traj.stop.capture_speed, None);
        assert!(traj.stop_position().y > 5.9);
    }

    #[test]
    fn side_slope_breaks_toward_low_side() {
        let a = rolling_deceleration(9.0);
        let mut launch = straight(3.0, a, level_speed(a, 3.5));
        launch.slope_deg = 2.0;
        let traj = integrate(&IntegratorConfig::default(), &launch);
        assert!(traj.stop_position().x > 0.1, "stop = {:?}", traj.stop_position());
        assert!(!traj.is_captured());

        launch.slope_deg = -2.0;
        let traj = integrate(&IntegratorConfig::default(), &launch);
        assert!(traj.stop_position().x < -0.1);
    }

    #[test]
    fn downhill_along_line_rolls_further() {
        let a = rolling_deceleration(9.0);
        let config = IntegratorConfig {
            slope: SlopeModel {
                axis: SlopeAxis::AlongLine,
                ..SlopeModel::default()
            },
            ..IntegratorConfig::default()
        }
        .without_cup();
        let level = integrate(&config, &straight(3.0, a, 2.0));
        let mut launch = straight(3.0, a, 2.0);
        launch.slope_deg = 1.0;
        let downhill = integrate(&config, &launch);
        launch.slope_deg = -1.0;
        let uphill = integrate(&config, &launch);

        assert!(downhill.stop_position().y > level.stop_position().y);
        assert!(uphill.stop_position().y < level.stop_position().y);
    }

    #[test]
    fn slope_formulas_differ_only_slightly_at_small_angles() {
        let tan = SlopeModel::default();
        let sin = SlopeModel {
            formula: SlopeFormula::Sine,
            ..SlopeModel::default()
        };
        let t = tan.downhill_acceleration(2.0);
        let s = sin.downhill_acceleration(2.0);
        assert!(t > s);
        assert_abs_diff_eq!(t, s, epsilon = 1e-3);
        assert_eq!(tan.along_line(2.0), 0.0);
        assert_abs_diff_eq!(tan.downhill_acceleration(-2.0), -t, epsilon = 1e-12);
    }

    #[test]
    fn linear_drag_rolls_about_twice_as_far() {
        let a = rolling_deceleration(9.0);
        let constant = IntegratorConfig::default().without_cup();
        let drag = IntegratorConfig {
            resistance: ResistanceModel::LinearDrag,
            ..constant
        };
        let c = integrate(&constant, &straight(3.0, a, 2.0));
        let d = integrate(&drag, &straight(3.0, a, 2.0));
        let ratio = d.stop_position().y / c.stop_position().y;
        assert!(ratio > 1.9 && ratio < 2.1, "ratio = {ratio}");
        assert_eq!(d.stop.reason, StopReason::Rested);
    }

    #[test]
    fn zero_speed_is_a_single_sample() {
        let traj = integrate(&IntegratorConfig::default(), &straight(3.0, 0.6, 0.0));
        assert_eq!(traj.samples, vec![Vec2::ZERO]);
        assert_eq!(traj.stop.reason, StopReason::Rested);
        assert_eq!(traj.stop.elapsed, 0.0);
    }

    #[test]
    fn non_finite_inputs_are_clamped() {
        let traj = integrate(&IntegratorConfig::default(), &straight(3.0, 0.6, f64::NAN));
        assert_eq!(traj.samples.len(), 1);

        let traj = integrate(&IntegratorConfig::default(), &straight(3.0, f64::NAN, 1.0));
        // No resistance and no slope: nothing acts on the ball.
        assert_eq!(traj.stop.reason, StopReason::Balanced);
    }

    #[test]
    fn runaway_ball_hits_time_limit() {
        // Side slope pull (~1.38 m/s^2) far exceeds resistance.
        let launch = Launch {
            distance_to_target: 3.0,
            slope_deg: 8.0,
            a_roll: 0.1,
            launch_angle_deg: 0.0,
            launch_speed: 1.0,
        };
        let config = IntegratorConfig::default();
        let traj = integrate(&config, &launch);
        assert_eq!(traj.stop.reason, StopReason::TimeLimit);
        assert_abs_diff_eq!(traj.stop.elapsed, config.max_duration(1.0, 0.1), epsilon = 0.011);
        assert!(traj.stop_position().is_finite());
    }

    #[test]
    fn max_duration_has_floor() {
        let config = IntegratorConfig::default();
        assert_eq!(config.max_duration(1.0, 0.6), MIN_DURATION);
        assert_eq!(config.max_duration(1.0, 0.0), MIN_DURATION);
        assert_abs_diff_eq!(config.max_duration(20.0, 1.0), 22.0);
    }

    #[test]
    fn crossing_interpolates_between_samples() {
        let traj = Trajectory {
            samples: vec![Vec2::ZERO, Vec2::new(0.1, 2.0), Vec2::new(0.3, 4.0)],
            stop: StopRecord {
                position: Vec2::new(0.3, 4.0),
                elapsed: 1.0,
                captured: false,
                capture_speed: None,
                captured_index: None,
                reason: StopReason::Rested,
            },
        };
        let hit = traj.crossing_at(3.0).expect("path crosses y = 3");
        assert_abs_diff_eq!(hit.x, 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(hit.y, 3.0, epsilon = 1e-12);
        assert_eq!(traj.crossing_at(5.0), None);
    }

    #[test]
    fn integration_is_deterministic() {
        let launch = Launch {
            distance_to_target: 4.0,
            slope_deg: 1.5,
            a_roll: rolling_deceleration(10.0),
            launch_angle_deg: -7.0,
            launch_speed: 2.1,
        };
        let config = IntegratorConfig::default();
        assert_eq!(integrate(&config, &launch), integrate(&config, &launch));
    }

    #[test]
    fn config_validation_rejects_bad_values() {
        assert!(IntegratorConfig::default().validate().is_ok());
        let bad = IntegratorConfig {
            dt: 0.0,
            ..IntegratorConfig::default()
        };
        assert!(bad.validate().is_err());
        let bad = IntegratorConfig {
            sample_stride: 0,
            ..IntegratorConfig::default()
        };
        assert!(bad.validate().is_err());
        let open_gate = IntegratorConfig {
            max_capture_speed: f64::INFINITY,
            ..IntegratorConfig::default()
        };
        assert!(open_gate.validate().is_ok());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn trajectory_invariants_hold(
                distance in 0.5f64..10.0,
                slope in -6.0f64..6.0,
                stimp in 4.0f64..15.0,
                angle in -30.0f64..30.0,
                speed in 0.0f64..5.0,
            ) {
                let launch = Launch {
                    distance_to_target: distance,
                    slope_deg: slope,
                    a_roll: rolling_deceleration(stimp),
                    launch_angle_deg: angle,
                    launch_speed: speed,
                };
                let traj = integrate(&IntegratorConfig::default(), &launch);

                prop_assert_eq!(traj.samples[0], Vec2::ZERO);
                prop_assert_eq!(traj.samples.last().copied(), Some(traj.stop_position()));
                for p in &traj.samples {
                    prop_assert!(p.is_finite());
                }
                match traj.stop.captured_index {
                    Some(i) => {
                        prop_assert!(traj.stop.captured);
                        prop_assert!(i < traj.samples.len());
                        let cup = Vec2::new(0.0, distance);
                        prop_assert!(traj.samples[i].distance(cup) <= 0.054 + 1e-12);
                        prop_assert!(traj.stop.capture_speed.is_some());
                    }
                    None => {
                        prop_assert!(!traj.stop.captured);
                        prop_assert!(traj.stop.capture_speed.is_none());
                    }
                }
            }
        }
    }
}
