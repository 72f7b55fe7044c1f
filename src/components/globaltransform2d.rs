//! Computed world-space transform for nodes in a hierarchy.
//!
//! When a node has a [`ChildOf`](bevy_ecs::hierarchy::ChildOf) parent, its
//! [`MapPosition`] and [`Rotation`](super::rotation::Rotation) are local to
//! that parent. The
//! [`propagate_transforms`](crate::systems::propagate_transforms::propagate_transforms)
//! system composes the ancestor chain and stores the result here.

use bevy_ecs::prelude::*;

use crate::components::mapposition::MapPosition;
use crate::components::rotation::{normalize_angle, to_degrees};

/// World-space transform. Root nodes mirror their own position and rotation.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct GlobalTransform2D {
    /// World-space center.
    pub position: MapPosition,
    /// World-space orientation in radians, in `[0, 2π)`.
    pub orientation: f64,
}

impl GlobalTransform2D {
    pub fn new(position: MapPosition, orientation: f64) -> Self {
        Self {
            position,
            orientation: normalize_angle(orientation),
        }
    }

    /// Place a local offset and orientation under this transform.
    pub fn compose(&self, local: MapPosition, local_orientation: f64) -> Self {
        let (sin, cos) = self.orientation.sin_cos();
        let offset = MapPosition::new(
            local.x * cos - local.y * sin,
            local.x * sin + local.y * cos,
        );
        Self::new(
            MapPosition::new(self.position.x + offset.x, self.position.y + offset.y),
            self.orientation + local_orientation,
        )
    }

    pub fn degree_orientation(&self) -> f64 {
        to_degrees(self.orientation)
    }
}
