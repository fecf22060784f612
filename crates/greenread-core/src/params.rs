use serde::{Deserialize, Serialize};

use crate::error::ParamError;

/// Input ranges accepted by [`ShotParams::clamped`]: `(min, max)`.
pub const DISTANCE_RANGE: (f64, f64) = (0.1, 20.0);
pub const SLOPE_RANGE_DEG: (f64, f64) = (-8.0, 8.0);
pub const STIMP_RANGE_FEET: (f64, f64) = (4.0, 15.0);
pub const LAUNCH_ANGLE_RANGE_DEG: (f64, f64) = (-30.0, 30.0);
pub const OVERRUN_RANGE: (f64, f64) = (0.0, 5.0);

/// One putt's inputs.
///
/// Angles are in degrees, lengths in metres, and the green speed is a
/// stimpmeter reading in feet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShotParams {
    /// Straight-line distance from the ball to the cup centre.
    pub distance_to_target: f64,
    /// Signed slope angle; positive tilts the green down toward the
    /// positive end of the configured slope axis.
    pub slope_deg: f64,
    /// Stimpmeter reading.
    pub stimp_feet: f64,
    /// Aim offset from the straight line to the cup; positive aims toward `+x`.
    pub launch_angle_deg: f64,
    /// How far past the cup the ball would roll on a level green.
    pub overrun: f64,
}

impl Default for ShotParams {
    fn default() -> Self {
        Self {
            distance_to_target: 3.0,
            slope_deg: 2.0,
            stimp_feet: 9.0,
            launch_angle_deg: 0.0,
            overrun: 0.5,
        }
    }
}

impl ShotParams {
    /// Build and validate a parameter set.
    pub fn new(
        distance_to_target: f64,
        slope_deg: f64,
        stimp_feet: f64,
        launch_angle_deg: f64,
        overrun: f64,
    ) -> Result<Self, ParamError> {
        let params = Self {
            distance_to_target,
            slope_deg,
            stimp_feet,
            launch_angle_deg,
            overrun,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check the invariants: every field finite, distance and stimp strictly
    /// positive, overrun non-negative.
    pub fn validate(&self) -> Result<(), ParamError> {
        let fields = [
            ("distance_to_target", self.distance_to_target),
            ("slope_deg", self.slope_deg),
            ("stimp_feet", self.stimp_feet),
            ("launch_angle_deg", self.launch_angle_deg),
            ("overrun", self.overrun),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ParamError::NonFinite { field });
            }
        }
        if self.distance_to_target <= 0.0 {
            return Err(ParamError::NonPositive {
                field: "distance_to_target",
                value: self.distance_to_target,
            });
        }
        if self.stimp_feet <= 0.0 {
            return Err(ParamError::NonPositive {
                field: "stimp_feet",
                value: self.stimp_feet,
            });
        }
        if self.overrun < 0.0 {
            return Err(ParamError::Negative {
                field: "overrun",
                value: self.overrun,
            });
        }
        Ok(())
    }

    /// Clamp every field into its accepted input range. Non-finite fields
    /// fall back to the default value.
    pub fn clamped(&self) -> Self {
        let defaults = Self::default();
        let fit = |value: f64, fallback: f64, (lo, hi): (f64, f64)| {
            if value.is_finite() {
                value.clamp(lo, hi)
            } else {
                fallback
            }
        };
        Self {
            distance_to_target: fit(
                self.distance_to_target,
                defaults.distance_to_target,
                DISTANCE_RANGE,
            ),
            slope_deg: fit(self.slope_deg, defaults.slope_deg, SLOPE_RANGE_DEG),
            stimp_feet: fit(self.stimp_feet, defaults.stimp_feet, STIMP_RANGE_FEET),
            launch_angle_deg: fit(
                self.launch_angle_deg,
                defaults.launch_angle_deg,
                LAUNCH_ANGLE_RANGE_DEG,
            ),
            overrun: fit(self.overrun, defaults.overrun, OVERRUN_RANGE),
        }
    }

    /// Copy with a different launch angle.
    pub fn with_launch_angle(self, launch_angle_deg: f64) -> Self {
        Self {
            launch_angle_deg,
            ..self
        }
    }

    /// Copy with a different slope.
    pub fn with_slope(self, slope_deg: f64) -> Self {
        Self { slope_deg, ..self }
    }

    /// Copy with a different overrun distance.
    pub fn with_overrun(self, overrun: f64) -> Self {
        Self { overrun, ..self }
    }
}
