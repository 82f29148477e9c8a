//! # Scene — The Drawable Nodes
//!
//! The CPU side of what gets drawn each frame:
//!
//! ```text
//! Scene
//! ├── plane: ClipPlane            (shared by program key and overlay)
//! ├── triangle: Mesh              (geometry + transform, spun every frame)
//! ├── overlay: Option<OverlayQuad>  (Some iff config.clipping)
//! ├── config: RenderConfig        (latest panel snapshot)
//! └── spin: Spin
//! ```
//!
//! `Scene` knows nothing about the GPU. The renderer reads it through
//! [`Scene::program_key`] and the public fields.

use std::sync::Arc;

use super::animation::Spin;
use super::config::RenderConfig;
use super::geometry::TriangleGeometry;
use super::overlay::OverlayQuad;
use super::plane::ClipPlane;
use super::program::ProgramKey;
use crate::math::Transform;

/// Geometry paired with a transform. The rotation is the only field that
/// changes after creation.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub geometry: Arc<TriangleGeometry>,
    pub transform: Transform,
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub plane: ClipPlane,
    pub triangle: Mesh,
    pub overlay: Option<OverlayQuad>,
    config: RenderConfig,
    spin: Spin,
}

impl Scene {
    pub fn new(config: RenderConfig) -> Self {
        let plane = ClipPlane::fixed();
        Self {
            plane,
            triangle: Mesh {
                geometry: Arc::new(TriangleGeometry::new()),
                transform: Transform::IDENTITY,
            },
            overlay: config.clipping.then(|| OverlayQuad::from_plane(&plane)),
            config,
            spin: Spin::default(),
        }
    }

    pub fn config(&self) -> RenderConfig {
        self.config
    }

    pub fn spin(&self) -> &Spin {
        &self.spin
    }

    /// Take a new configuration snapshot. The overlay node is created when
    /// clipping turns on and removed when it turns off.
    pub fn apply_config(&mut self, config: RenderConfig) {
        if config.clipping != self.config.clipping {
            log::info!("Clipping {}", if config.clipping { "on" } else { "off" });
        }
        self.config = config;
        match (config.clipping, self.overlay.is_some()) {
            (true, false) => self.overlay = Some(OverlayQuad::from_plane(&self.plane)),
            (false, true) => self.overlay = None,
            _ => {}
        }
    }

    /// Advance the animation by one frame.
    pub fn tick(&mut self) {
        self.spin.advance();
        self.triangle.transform.rotation = self.spin.rotation();
    }

    /// The inputs the triangle's GPU program is built from.
    pub fn program_key(&self) -> ProgramKey {
        ProgramKey::new(self.config, self.plane)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::config::Toggle;
    use crate::clip::program::{CullMode, FragmentOutput, PolygonMode, SURFACE_COLOR};
    use crate::clip::shader::FragmentStage;
    use glam::Vec3;

    #[test]
    fn overlay_present_iff_clipping() {
        let mut scene = Scene::default();
        assert!(scene.overlay.is_none());

        scene.apply_config(scene.config().toggled(Toggle::Clipping));
        assert!(scene.overlay.is_some());

        scene.apply_config(scene.config().toggled(Toggle::Wireframe));
        assert!(scene.overlay.is_some(), "unrelated toggles leave the overlay alone");

        scene.apply_config(scene.config().toggled(Toggle::Clipping));
        assert!(scene.overlay.is_none());
    }

    #[test]
    fn overlay_returns_with_the_same_transform() {
        let mut scene = Scene::new(RenderConfig {
            clipping: true,
            ..RenderConfig::default()
        });
        let before = scene.overlay;
        scene.apply_config(RenderConfig::default());
        scene.apply_config(RenderConfig {
            clipping: true,
            ..RenderConfig::default()
        });
        assert_eq!(scene.overlay, before);
    }

    #[test]
    fn tick_spins_only_the_triangle() {
        let mut scene = Scene::default();
        let key = scene.program_key();
        for _ in 0..50 {
            scene.tick();
        }
        assert!((scene.spin().angle() - 0.5).abs() < 1e-4);
        assert_eq!(scene.triangle.transform.rotation, scene.spin().rotation());
        assert_eq!(scene.triangle.transform.translation, Vec3::ZERO);
        assert_eq!(scene.program_key(), key, "animation is not a program input");
    }

    #[test]
    fn geometry_is_shared_not_copied() {
        let scene = Scene::default();
        let copy = scene.clone();
        assert!(Arc::ptr_eq(&scene.triangle.geometry, &copy.triangle.geometry));
    }

    #[test]
    fn cut_scene_end_to_end() {
        let config = RenderConfig {
            wireframe: false,
            back_face_culling: true,
            clipping: true,
            fragments: false,
        };
        let scene = Scene::new(config);
        let desc = scene.program_key().describe();

        assert_eq!(desc.polygon_mode, PolygonMode::Fill);
        assert_eq!(desc.cull_mode, CullMode::Back);
        assert_eq!(desc.fragment, FragmentOutput::Solid(SURFACE_COLOR));
        assert_eq!(desc.clip_planes, vec![scene.plane]);

        let fs = FragmentStage::new(&desc);
        let tf = scene.triangle.transform;
        let shade = |p: Vec3| fs.shade(p, tf.transform_point(p));
        assert_eq!(shade(Vec3::new(0.6, -0.8, 0.0)), Some(SURFACE_COLOR));
        assert_eq!(shade(Vec3::new(0.0, -0.8, 0.0)), None);

        let overlay = scene.overlay.expect("overlay while clipping");
        assert!((overlay.transform.translation.x - 0.3).abs() < 1e-6);
        assert!(overlay.color[3] < 1.0, "overlay is translucent");
    }
}
