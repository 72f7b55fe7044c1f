use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

/// Center position of a node in battlefield units.
///
/// For child nodes the position is relative to the parent's center and
/// heading; see [`GlobalTransform2D`](super::globaltransform2d::GlobalTransform2D).
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MapPosition {
    pub x: f64,
    pub y: f64,
}

impl MapPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to a point.
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        let dx = x - self.x;
        let dy = y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}
