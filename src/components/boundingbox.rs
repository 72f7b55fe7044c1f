//! Axis-aligned box used for node hit-testing.
//!
//! The box is never rotated: a node drawn at an angle still hit-tests against
//! its upright width/height around the center.

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

use super::mapposition::MapPosition;

#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn square(side: f64) -> Self {
        Self::new(side, side)
    }

    pub fn left_x(&self, center: MapPosition) -> f64 {
        center.x - self.width / 2.0
    }

    pub fn right_x(&self, center: MapPosition) -> f64 {
        center.x + self.width / 2.0
    }

    pub fn upper_y(&self, center: MapPosition) -> f64 {
        center.y - self.height / 2.0
    }

    pub fn bottom_y(&self, center: MapPosition) -> f64 {
        center.y + self.height / 2.0
    }

    /// Point containment, edges inclusive.
    pub fn contains_point(&self, center: MapPosition, x: f64, y: f64) -> bool {
        x >= self.left_x(center)
            && x <= self.right_x(center)
            && y >= self.upper_y(center)
            && y <= self.bottom_y(center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_are_centered() {
        let bb = BoundingBox::new(10.0, 4.0);
        let c = MapPosition::new(100.0, 50.0);
        assert_eq!(bb.left_x(c), 95.0);
        assert_eq!(bb.right_x(c), 105.0);
        assert_eq!(bb.upper_y(c), 48.0);
        assert_eq!(bb.bottom_y(c), 52.0);
    }

    #[test]
    fn contains_point_includes_edges() {
        let bb = BoundingBox::square(2.0);
        let c = MapPosition::new(0.0, 0.0);
        assert!(bb.contains_point(c, 1.0, 1.0));
        assert!(bb.contains_point(c, -1.0, 0.0));
        assert!(!bb.contains_point(c, 1.01, 0.0));
        assert!(!bb.contains_point(c, 0.0, -1.5));
    }
}
