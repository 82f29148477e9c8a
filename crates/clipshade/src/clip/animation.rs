//! Per-frame spin of the triangle about +Y.

use std::f32::consts::TAU;

use crate::math::Quat;

/// Radians added every frame.
pub const SPIN_STEP: f32 = 0.01;

/// Rotation angle about the vertical axis, advanced once per presented frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spin {
    angle: f32,
    step: f32,
}

impl Spin {
    pub fn new(step: f32) -> Self {
        Self { angle: 0.0, step }
    }

    /// Advance one frame. The angle stays in `[0, TAU)`.
    pub fn advance(&mut self) {
        self.angle = (self.angle + self.step).rem_euclid(TAU);
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.angle)
    }
}

impl Default for Spin {
    fn default() -> Self {
        Self::new(SPIN_STEP)
    }
}
