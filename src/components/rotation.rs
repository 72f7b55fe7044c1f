//! Angle helpers for orientation-bearing nodes.
//!
//! Orientations are stored in radians. `0` points along the positive x axis
//! and angles grow clockwise on screen (y grows downwards).

use std::f64::consts::{PI, TAU};

use bevy_ecs::prelude::Component;

/// Heading of a node in radians. Local to the parent for child nodes.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct Rotation {
    pub radians: f64,
}

impl Rotation {
    pub fn new(radians: f64) -> Self {
        Self { radians }
    }

    pub fn degrees(&self) -> f64 {
        to_degrees(self.radians)
    }

    /// Wrap the heading back into `[0, 2π)`.
    pub fn normalize(&mut self) {
        self.radians = normalize_angle(self.radians);
    }
}

/// Wrap `angle` into `[0, 2π)`.
///
/// Idempotent: a value already in range is returned unchanged. Non-finite
/// input is returned as-is.
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return angle;
    }
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid rounds tiny negative inputs up to exactly TAU
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Signed difference `a - b` wrapped to the representative with the smallest
/// magnitude among `d`, `d + 2π` and `d - 2π`.
///
/// Both operands are normalized first, so the result lies in `[-π, π]` for
/// any finite input. Candidates are tried in that order and the first minimal
/// one wins: for a difference of exactly `±π` the unwrapped `d` is returned.
pub fn min_angle_difference(a: f64, b: f64) -> f64 {
    let d0 = normalize_angle(a) - normalize_angle(b);
    let d1 = d0 + TAU;
    let d2 = d0 - TAU;
    let mut best = d0;
    for candidate in [d1, d2] {
        if candidate.abs() < best.abs() {
            best = candidate;
        }
    }
    best
}

/// Radians to degrees, as consumed by renderers.
pub fn to_degrees(radians: f64) -> f64 {
    radians * 180.0 / PI
}
