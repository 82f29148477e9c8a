//! A perspective camera with simple orbit controls.
//!
//! The camera is not part of the clipping core. It only supplies the
//! view-projection matrix, and the demo orbits it with the arrow keys.

use crate::math::{Mat4, Quat, Vec3};

/// Perspective camera looking at a target point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 3.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 60f32.to_radians(),
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect.max(f32::EPSILON), self.near, self.far)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view()
    }

    /// Orbit the eye around the target. `yaw` turns about `up`, `pitch`
    /// tilts toward it; the pitch is clamped short of the poles.
    pub fn orbit(&mut self, yaw: f32, pitch: f32) {
        let offset = self.eye - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }

        let offset = Quat::from_axis_angle(self.up, yaw) * offset;
        let dir = offset / radius;
        let current = dir.dot(self.up).clamp(-1.0, 1.0).asin();
        let limit = 85f32.to_radians();
        let pitch = (current + pitch).clamp(-limit, limit) - current;

        let side = self.up.cross(dir).normalize_or_zero();
        let offset = if side == Vec3::ZERO {
            offset
        } else {
            Quat::from_axis_angle(side, -pitch) * offset
        };
        self.eye = self.target + offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera_looks_down_negative_z() {
        let cam = Camera::default();
        let ndc = cam.view_proj(1.0).project_point3(Vec3::ZERO);
        assert!(ndc.x.abs() < 1e-6 && ndc.y.abs() < 1e-6);
        assert!(ndc.z > 0.0 && ndc.z < 1.0, "origin inside the depth range: {ndc}");
    }

    #[test]
    fn orbit_keeps_the_distance() {
        let mut cam = Camera::default();
        cam.orbit(0.8, 0.3);
        assert!((cam.eye.length() - 3.0).abs() < 1e-4);
        assert!(cam.eye.y > 0.0);
    }

    #[test]
    fn yaw_quarter_turn_moves_to_the_side() {
        let mut cam = Camera::default();
        cam.orbit(std::f32::consts::FRAC_PI_2, 0.0);
        assert!((cam.eye - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-4, "{}", cam.eye);
    }

    #[test]
    fn pitch_stops_short_of_the_pole() {
        let mut cam = Camera::default();
        cam.orbit(0.0, 10.0);
        let elevation = (cam.eye.y / cam.eye.length()).asin();
        assert!(elevation <= 85f32.to_radians() + 1e-4);
    }
}
