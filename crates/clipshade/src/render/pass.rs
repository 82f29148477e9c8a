//! Frame acquisition and submission.
//!
//! [`render_frame`] acquires the surface texture, hands a [`FrameContext`] to
//! the caller to record passes into, then submits and presents. It never
//! builds GPU programs: by the time a frame is acquired, every program the
//! frame draws with must already be complete.

use crate::render::gpu::GpuContext;

/// The background color behind the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearColor(pub [f64; 4]);

impl Default for ClearColor {
    fn default() -> Self {
        // #111111
        Self([0.067, 0.067, 0.067, 1.0])
    }
}

impl From<ClearColor> for wgpu::Color {
    fn from(c: ClearColor) -> Self {
        wgpu::Color {
            r: c.0[0],
            g: c.0[1],
            b: c.0[2],
            a: c.0[3],
        }
    }
}

/// Per-frame render context passed to the scene renderer.
pub struct FrameContext<'a> {
    pub encoder: wgpu::CommandEncoder,
    pub view: wgpu::TextureView,
    pub gpu: &'a GpuContext,
}

/// Render a single frame. `record` adds the scene's passes to the encoder.
pub fn render_frame(
    gpu: &GpuContext,
    record: impl FnOnce(&mut FrameContext<'_>),
) -> Result<(), wgpu::SurfaceError> {
    let output = gpu.surface.get_current_texture()?;
    let view = output
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());
    let encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("clipshade frame encoder"),
        });

    let mut frame = FrameContext { encoder, view, gpu };

    record(&mut frame);

    gpu.queue.submit(std::iter::once(frame.encoder.finish()));
    output.present();

    Ok(())
}
