pub mod deceleration;
pub mod error;
pub mod params;
pub mod vec2;
pub mod view;

pub use deceleration::rolling_deceleration;
pub use error::ParamError;
pub use params::ShotParams;
pub use vec2::Vec2;
pub use view::ViewState;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::params::ShotParams;
    use crate::vec2::Vec2;

    /// Level green, straight aim: 3 m putt, stimp 9, 0.5 m past the cup.
    pub fn flat_params() -> ShotParams {
        ShotParams {
            distance_to_target: 3.0,
            slope_deg: 0.0,
            stimp_feet: 9.0,
            launch_angle_deg: 0.0,
            overrun: 0.5,
        }
    }

    /// Flat parameters with the given distance and overrun.
    pub fn flat_params_with(distance_to_target: f64, overrun: f64) -> ShotParams {
        ShotParams {
            distance_to_target,
            overrun,
            ..flat_params()
        }
    }

    /// Assert every point of a path is finite.
    pub fn assert_path_finite(samples: &[Vec2]) {
        for (i, p) in samples.iter().enumerate() {
            assert!(p.is_finite(), "sample {i} is not finite: {p:?}");
        }
    }

    /// Distance of `point` from the launch point (the frame origin).
    pub fn distance_from_launch(point: Vec2) -> f64 {
        point.length()
    }
}
