//! Scene composition root: one frame is rebuild, draw, then animate.

use std::fmt;
use std::sync::Arc;

use super::camera::Camera;
use super::config::RenderConfig;
use super::pipeline::ClipRenderer;
use super::scene::Scene;
use crate::error::{RenderError, Result};
use crate::render::pass::render_frame;
use crate::render::{ClearColor, GpuContext};

/// Counters from one presented frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: u32,
    pub rebuilds: u64,
    pub overlay: bool,
}

/// Why a frame came out wrong or not at all.
#[derive(Debug)]
pub enum FrameError {
    /// The surface texture could not be acquired. Nothing was presented.
    Surface(wgpu::SurfaceError),
    /// The triangle's program could not be built. The frame was presented
    /// without the triangle.
    Program(RenderError),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Surface(e) => write!(f, "surface error: {e}"),
            Self::Program(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for FrameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Surface(e) => Some(e),
            Self::Program(e) => Some(e),
        }
    }
}

/// Owns the rendering context and everything drawn into it.
pub struct SceneRoot {
    gpu: GpuContext,
    renderer: ClipRenderer,
    scene: Scene,
    camera: Camera,
    clear_color: ClearColor,
}

impl SceneRoot {
    /// Create the context for `window`, enable local clipping on it, and
    /// build the scene from the initial configuration.
    pub fn new(window: Arc<winit::window::Window>, config: RenderConfig) -> Result<Self> {
        let mut gpu = GpuContext::new(window)?;
        gpu.enable_local_clipping()?;
        let scene = Scene::new(config);
        let renderer = ClipRenderer::new(&gpu, &scene.triangle.geometry);
        Ok(Self {
            gpu,
            renderer,
            scene,
            camera: Camera::default(),
            clear_color: ClearColor::default(),
        })
    }

    pub fn with_clear_color(mut self, clear_color: ClearColor) -> Self {
        self.clear_color = clear_color;
        self
    }

    /// Run one frame with the latest configuration snapshot.
    ///
    /// The frame is presented even when the triangle's program failed to
    /// build: the triangle is left out and the overlay is still drawn. The
    /// spin only advances once the frame has been submitted.
    pub fn frame(&mut self, config: RenderConfig) -> std::result::Result<FrameStats, FrameError> {
        self.scene.apply_config(config);

        let program = self.renderer.prepare(&self.gpu, &self.scene, &self.camera);

        let mut draw_calls = 0;
        let renderer = &self.renderer;
        let clear_color = self.clear_color;
        let presented = render_frame(&self.gpu, |frame| {
            draw_calls = renderer.record(frame, clear_color);
        })
        .map(|()| draw_calls);

        settle_frame(&mut self.scene, program, presented, self.renderer.rebuilds())
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
    }

    /// Reconfigure the surface at its current size (after `Lost`/`Outdated`).
    pub fn reconfigure(&mut self) {
        let (w, h) = self.gpu.surface_size();
        self.gpu.resize(w, h);
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }
}

/// Turn the outcome of one frame into its result. The scene animates only if
/// the frame reached the screen, and a program error is reported after the
/// frame was presented without the triangle.
pub(crate) fn settle_frame(
    scene: &mut Scene,
    program: Result<()>,
    presented: std::result::Result<u32, wgpu::SurfaceError>,
    rebuilds: u64,
) -> std::result::Result<FrameStats, FrameError> {
    let draw_calls = presented.map_err(FrameError::Surface)?;
    scene.tick();
    program.map_err(FrameError::Program)?;
    Ok(FrameStats {
        draw_calls,
        rebuilds,
        overlay: scene.overlay.is_some(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clipped() -> RenderConfig {
        RenderConfig {
            clipping: true,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn presented_frame_spins_once() {
        let mut scene = Scene::new(clipped());
        let stats = settle_frame(&mut scene, Ok(()), Ok(2), 1).unwrap();
        assert_eq!(
            stats,
            FrameStats {
                draw_calls: 2,
                rebuilds: 1,
                overlay: true,
            }
        );
        assert!((scene.spin().angle() - 0.01).abs() < 1e-6);
    }

    #[test]
    fn failed_program_still_counts_as_a_presented_frame() {
        let mut scene = Scene::new(clipped());
        let missing = RenderError::MissingFeature {
            feature: "POLYGON_MODE_LINE (wireframe)",
        };
        // Only the overlay was drawn.
        let err = settle_frame(&mut scene, Err(missing.clone()), Ok(1), 2).unwrap_err();
        assert!(matches!(err, FrameError::Program(ref e) if *e == missing));
        assert!(scene.spin().angle() > 0.0, "the overlay frame reached the screen");
        assert!(scene.overlay.is_some());
    }

    #[test]
    fn unpresented_frame_does_not_spin() {
        let mut scene = Scene::default();
        for surface in [wgpu::SurfaceError::Timeout, wgpu::SurfaceError::Outdated] {
            let err = settle_frame(&mut scene, Ok(()), Err(surface), 0).unwrap_err();
            assert!(matches!(err, FrameError::Surface(_)));
        }
        let err = settle_frame(&mut scene, Err(RenderError::ClippingNotEnabled), Err(wgpu::SurfaceError::Lost), 0)
            .unwrap_err();
        assert!(matches!(err, FrameError::Surface(wgpu::SurfaceError::Lost)));
        assert_eq!(scene.spin().angle(), 0.0);
    }

    #[test]
    fn n_presented_frames_give_n_steps() {
        let mut scene = Scene::default();
        for i in 0..30 {
            // Every third frame misses the surface.
            let presented = if i % 3 == 0 {
                Err(wgpu::SurfaceError::Timeout)
            } else {
                Ok(1)
            };
            let _ = settle_frame(&mut scene, Ok(()), presented, 1);
        }
        assert!((scene.spin().angle() - 20.0 * 0.01).abs() < 1e-5);
    }
}
