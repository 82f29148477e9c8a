//! # Plane — The Clip Plane Model
//!
//! A plane in world space stored as a unit normal `n` and a constant `c`.
//! The signed distance of a point `p` is `dot(n, p) + c`:
//!
//! ```text
//!            n = (1,0,0)
//!   cut away   │ ──►   kept
//!   d < 0      │       d >= 0
//!              │
//!            x = 0.3   (c = -0.3)
//! ```
//!
//! Fragments with a strictly negative distance are discarded; everything on
//! the plane or on the side the normal points to is kept. The same value
//! feeds the shading pipeline (clip test) and the overlay (placement), so the
//! two can never disagree.

use glam::{Vec3, Vec4};

use crate::error::{RenderError, Result};

/// Where the fixed plane sits along its normal.
pub const CLIP_OFFSET: f32 = 0.3;

/// A normalized world-space plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipPlane {
    normal: Vec3,
    constant: f32,
}

impl ClipPlane {
    /// Build a plane from any non-zero normal. The normal is normalized and
    /// the constant rescaled so the plane itself does not move.
    pub fn new(normal: Vec3, constant: f32) -> Result<Self> {
        if !normal.is_finite() || !constant.is_finite() {
            return Err(RenderError::InvalidPlane {
                reason: "normal and constant must be finite",
            });
        }
        let length = normal.length();
        if length <= f32::EPSILON {
            return Err(RenderError::InvalidPlane {
                reason: "normal must be non-zero",
            });
        }
        Ok(Self {
            normal: normal / length,
            constant: constant / length,
        })
    }

    /// The scene's plane: `x = 0.3`, keeping `x >= 0.3`.
    pub fn fixed() -> Self {
        Self {
            normal: Vec3::X,
            constant: -CLIP_OFFSET,
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn constant(&self) -> f32 {
        self.constant
    }

    /// `dot(normal, point) + constant`.
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.constant
    }

    /// Whether the clip test keeps a world-space point.
    pub fn keeps(&self, point: Vec3) -> bool {
        self.signed_distance(point) >= 0.0
    }

    /// The point on the plane closest to the origin.
    pub fn coplanar_point(&self) -> Vec3 {
        self.normal * -self.constant
    }

    /// Packed as `(n.x, n.y, n.z, c)` for the shader.
    pub fn as_vec4(&self) -> Vec4 {
        self.normal.extend(self.constant)
    }
}

impl Default for ClipPlane {
    fn default() -> Self {
        Self::fixed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_plane_sits_at_x_point_three() {
        let plane = ClipPlane::fixed();
        assert_eq!(plane.normal(), Vec3::X);
        assert!(plane.signed_distance(Vec3::new(0.3, 5.0, -2.0)).abs() < 1e-6);
        assert_eq!(plane.coplanar_point(), Vec3::new(0.3, 0.0, 0.0));
    }

    #[test]
    fn keeps_the_side_the_normal_points_to() {
        let plane = ClipPlane::fixed();
        assert!(plane.keeps(Vec3::new(0.9, 0.0, 0.0)));
        assert!(plane.keeps(Vec3::new(0.3, 0.0, 0.0)), "points on the plane are kept");
        assert!(!plane.keeps(Vec3::new(0.29, 0.0, 0.0)));
        assert!(!plane.keeps(Vec3::new(-1.0, -1.0, 0.0)));
    }

    #[test]
    fn new_normalizes_without_moving_the_plane() {
        let plane = ClipPlane::new(Vec3::new(4.0, 0.0, 0.0), -1.2).unwrap();
        assert!((plane.normal().length() - 1.0).abs() < 1e-6);
        assert!((plane.constant() + 0.3).abs() < 1e-6);
        assert!(plane.signed_distance(Vec3::new(0.3, 0.0, 0.0)).abs() < 1e-6);
    }

    #[test]
    fn zero_normal_fails_fast() {
        let err = ClipPlane::new(Vec3::ZERO, 1.0).unwrap_err();
        assert!(matches!(err, RenderError::InvalidPlane { .. }));
    }

    #[test]
    fn non_finite_input_fails_fast() {
        assert!(ClipPlane::new(Vec3::new(f32::NAN, 0.0, 0.0), 0.0).is_err());
        assert!(ClipPlane::new(Vec3::Y, f32::INFINITY).is_err());
    }

    #[test]
    fn packs_normal_and_constant() {
        assert_eq!(ClipPlane::fixed().as_vec4(), Vec4::new(1.0, 0.0, 0.0, -0.3));
    }
}
