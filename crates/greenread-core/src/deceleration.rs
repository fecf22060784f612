//! Rolling-resistance deceleration derived from a stimpmeter reading.
//!
//! A stimpmeter releases the ball at a known speed and reports how far it
//! rolls on a level green. Treating resistance as a constant-magnitude
//! deceleration, `v_ref^2 = 2 * a * s` gives the deceleration directly.

/// Release speed of the stimpmeter ramp (m/s).
pub const STIMP_RELEASE_SPEED: f64 = 1.83;
/// Stimp readings are published in feet.
pub const FEET_TO_METERS: f64 = 0.3048;
/// Floor on the roll length so degenerate readings never divide by zero.
pub const MIN_ROLL_LENGTH: f64 = 0.1;

/// Roll length in metres for a stimp reading in feet, clamped to
/// [`MIN_ROLL_LENGTH`].
pub fn stimp_distance(stimp_feet: f64) -> f64 {
    // f64::max returns the other operand for NaN.
    (stimp_feet * FEET_TO_METERS).max(MIN_ROLL_LENGTH)
}

/// Constant rolling-resistance deceleration magnitude (m/s^2).
///
/// Faster greens (higher readings) give lower deceleration.
pub fn rolling_deceleration(stimp_feet: f64) -> f64 {
    let s = stimp_distance(stimp_feet);
    STIMP_RELEASE_SPEED * STIMP_RELEASE_SPEED / (2.0 * s)
}
