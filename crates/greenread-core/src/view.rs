use serde::{Deserialize, Serialize};

use crate::vec2::Vec2;

/// Extra metres of margin kept around the shot when fitting it to a view.
const FIT_MARGIN: f64 = 1.5;
const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 20.0;

/// Viewport state for a renderer, passed explicitly instead of living in
/// globals. The engine never reads it.
///
/// Screen coordinates are pixels with the origin at the top-left corner and
/// `+y` pointing down. The cup sits at the centre of the view before panning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ViewState {
    pub width: f64,
    pub height: f64,
    pub zoom: f64,
    /// Screen-space offset in pixels.
    pub pan: Vec2,
}

impl ViewState {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            zoom: 1.0,
            pan: Vec2::ZERO,
        }
    }

    /// Pixels per metre so a shot of `distance` fits the view.
    pub fn fit_scale(&self, distance: f64) -> f64 {
        let range = (distance + FIT_MARGIN).max(1.0);
        self.width.min(self.height) / (2.0 * range) * self.zoom
    }

    /// Map a point in the shot frame (launch at the origin, cup at
    /// `(0, distance)`) to screen pixels.
    pub fn to_screen(&self, point: Vec2, distance: f64) -> Vec2 {
        let scale = self.fit_scale(distance);
        let from_cup = point - Vec2::new(0.0, distance);
        Vec2::new(
            self.width / 2.0 + from_cup.x * scale + self.pan.x,
            self.height / 2.0 - from_cup.y * scale + self.pan.y,
        )
    }

    /// Multiply the zoom by `factor`, clamped to a sane range.
    pub fn zoom_by(&mut self, factor: f64) {
        if factor.is_finite() && factor > 0.0 {
            self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        if delta.is_finite() {
            self.pan += delta;
        }
    }

    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cup_maps_to_view_centre() {
        let view = ViewState::new(400.0, 300.0);
        let cup = view.to_screen(Vec2::new(0.0, 3.0), 3.0);
        assert_eq!(cup, Vec2::new(200.0, 150.0));
    }

    #[test]
    fn launch_point_is_below_cup_on_screen() {
        let view = ViewState::new(400.0, 400.0);
        let ball = view.to_screen(Vec2::ZERO, 3.0);
        assert!(ball.y > 200.0, "ball should render below the cup");
        assert_eq!(ball.x, 200.0);
    }

    #[test]
    fn fit_scale_uses_short_side_and_margin() {
        let view = ViewState::new(900.0, 450.0);
        // 450 / (2 * 4.5)
        assert_eq!(view.fit_scale(3.0), 50.0);
        // Tiny distances still use at least a 1 m range.
        assert_eq!(view.fit_scale(-1.0), 225.0);
    }

    #[test]
    fn zoom_and_pan_are_explicit_and_resettable() {
        let mut view = ViewState::new(400.0, 400.0);
        let before = view.to_screen(Vec2::ZERO, 3.0);

        view.zoom_by(2.0);
        view.pan_by(Vec2::new(10.0, -5.0));
        assert_ne!(view.to_screen(Vec2::ZERO, 3.0), before);

        view.zoom_by(1e9);
        assert_eq!(view.zoom, MAX_ZOOM);
        view.zoom_by(-3.0);
        assert_eq!(view.zoom, MAX_ZOOM, "non-positive factor is ignored");

        view.reset();
        assert_eq!(view.to_screen(Vec2::ZERO, 3.0), before);
    }
}
