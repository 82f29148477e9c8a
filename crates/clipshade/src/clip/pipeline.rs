//! # Pipeline — GPU Resources for the Clip Scene
//!
//! [`ClipRenderer`] owns everything the GPU needs to draw a [`Scene`]:
//!
//! - **Two bind group layouts**: camera (group 0, per frame) and model
//!   (group 1, per object). Both are shared by every rebuilt program, so a
//!   rebuild only replaces the shader module and the pipeline.
//!
//! - **The program cache**: one [`ClipProgram`] keyed by [`ProgramKey`].
//!   [`ClipRenderer::prepare`] brings it up to date before the frame is
//!   acquired; [`ClipRenderer::record`] only draws with what is already built.
//!
//! - **Depth buffer**: `Depth32Float`, recreated when the surface resizes.
//!   The overlay reads it so the triangle occludes the far side of the quad.
//!
//! Building a program happens inside a validation error scope. A shader or
//! pipeline error is reported as [`RenderError::ShaderCompilation`] with the
//! backend's message and the candidate is thrown away.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::camera::Camera;
use super::geometry::{GpuGeometry, PositionVertex, TriangleGeometry};
use super::overlay::OverlayRenderer;
use super::program::{FragmentOutput, PolygonMode, ProgramCache, ProgramKey};
use super::scene::Scene;
use super::shader::program_source;
use crate::error::{RenderError, Result};
use crate::render::{ClearColor, FrameContext, GpuContext};

/// Depth texture format used by the clip renderer.
pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub(crate) struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub(crate) struct ModelUniform {
    pub model: [[f32; 4]; 4],
}

/// A built GPU program for the triangle.
pub(crate) struct ClipProgram {
    pipeline: wgpu::RenderPipeline,
}

impl ClipProgram {
    /// Build the program for `key`. Fails without touching the device if the
    /// context cannot run it, and with the backend diagnostic if validation
    /// rejects it.
    pub fn build(gpu: &GpuContext, layout: &wgpu::PipelineLayout, key: &ProgramKey) -> Result<Self> {
        let desc = key.describe();
        desc.check_support(gpu.capabilities(), gpu.local_clipping())?;

        let label = program_label(key);
        let source = program_source(&desc);

        gpu.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = gpu.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let pipeline = gpu.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[PositionVertex::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.surface_format(),
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: desc.cull_mode.into(),
                polygon_mode: desc.polygon_mode.into(),
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(gpu.device.pop_error_scope()) {
            return Err(RenderError::ShaderCompilation {
                label,
                diagnostic: err.to_string(),
            });
        }

        Ok(Self { pipeline })
    }
}

/// Human-readable program name, e.g. `clip program [line, double-sided, clipped, fragments]`.
pub(crate) fn program_label(key: &ProgramKey) -> String {
    let desc = key.describe();
    let raster = match desc.polygon_mode {
        PolygonMode::Fill => "fill",
        PolygonMode::Line => "line",
    };
    let sides = if key.config.back_face_culling {
        "culled"
    } else {
        "double-sided"
    };
    let clip = if desc.clip_planes.is_empty() {
        "unclipped"
    } else {
        "clipped"
    };
    let fragment = match desc.fragment {
        FragmentOutput::Solid(_) => "solid",
        FragmentOutput::Position => "fragments",
    };
    format!("clip program [{raster}, {sides}, {clip}, {fragment}]")
}

/// All GPU resources for the clip scene. Created once the surface exists.
pub(crate) struct ClipRenderer {
    camera_bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,

    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,

    geometry: GpuGeometry,
    programs: ProgramCache<ClipProgram>,
    overlay: Option<OverlayRenderer>,

    // Depth buffer (recreated on resize)
    depth_texture: wgpu::TextureView,
    depth_size: (u32, u32),
}

impl ClipRenderer {
    pub fn new(gpu: &GpuContext, geometry: &TriangleGeometry) -> Self {
        let device = &gpu.device;

        // ── Bind group layout 0: Camera (per frame) ────────────────────
        let camera_bind_group_layout = uniform_layout(device, "clip camera layout");

        // ── Bind group layout 1: Model (per object) ────────────────────
        let model_bind_group_layout = uniform_layout(device, "clip model layout");

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("clip pipeline layout"),
            bind_group_layouts: &[&camera_bind_group_layout, &model_bind_group_layout],
            push_constant_ranges: &[],
        });

        // ── Uniform buffers + bind groups ───────────────────────────────
        let identity = glam::Mat4::IDENTITY.to_cols_array_2d();
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("clip camera buffer"),
            contents: bytemuck::cast_slice(&[CameraUniform { view_proj: identity }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("clip camera bind group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let model_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("clip model buffer"),
            contents: bytemuck::cast_slice(&[ModelUniform { model: identity }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let model_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("clip model bind group"),
            layout: &model_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: model_buffer.as_entire_binding(),
            }],
        });

        let (w, h) = gpu.surface_size();
        let depth_texture = create_depth_texture(device, w, h);

        Self {
            camera_bind_group_layout,
            pipeline_layout,
            camera_buffer,
            camera_bind_group,
            model_buffer,
            model_bind_group,
            geometry: GpuGeometry::upload(gpu, geometry),
            programs: ProgramCache::new(),
            overlay: None,
            depth_texture,
            depth_size: (w, h),
        }
    }

    /// Recreate the depth texture if the surface size changed.
    pub fn resize_depth_if_needed(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if (width, height) != self.depth_size && width > 0 && height > 0 {
            self.depth_texture = create_depth_texture(device, width, height);
            self.depth_size = (width, height);
        }
    }

    /// Upload this frame's uniforms, sync the overlay, and bring the program
    /// up to date with the scene. Nothing is drawn here.
    pub fn prepare(&mut self, gpu: &GpuContext, scene: &Scene, camera: &Camera) -> Result<()> {
        let (w, h) = gpu.surface_size();
        self.resize_depth_if_needed(&gpu.device, w, h);

        let aspect = w as f32 / h.max(1) as f32;
        let camera_uniform = CameraUniform {
            view_proj: camera.view_proj(aspect).to_cols_array_2d(),
        };
        gpu.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[camera_uniform]));

        let model_uniform = ModelUniform {
            model: scene.triangle.transform.matrix().to_cols_array_2d(),
        };
        gpu.queue
            .write_buffer(&self.model_buffer, 0, bytemuck::cast_slice(&[model_uniform]));

        if scene.overlay.is_some() && self.overlay.is_none() {
            self.overlay = Some(OverlayRenderer::new(gpu, &self.camera_bind_group_layout));
        }
        if let Some(overlay) = &mut self.overlay {
            overlay.sync(gpu, scene.overlay.as_ref());
        }

        let layout = &self.pipeline_layout;
        self.programs
            .get_or_build(scene.program_key(), |key| ClipProgram::build(gpu, layout, key))?;
        Ok(())
    }

    /// Record the scene pass: the triangle with the cached program, then the
    /// overlay if present. Returns the number of draw calls issued.
    pub fn record(&self, frame: &mut FrameContext<'_>, clear_color: ClearColor) -> u32 {
        let mut render_pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("clip render pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color.into()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let mut draw_calls = 0;

        if let Some(program) = self.programs.current() {
            render_pass.set_pipeline(&program.pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            render_pass.set_bind_group(1, &self.model_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.geometry.vertex_buffer.slice(..));
            render_pass.draw(0..self.geometry.vertex_count, 0..1);
            draw_calls += 1;
        }

        if let Some(overlay) = &self.overlay {
            draw_calls += overlay.draw(&mut render_pass, &self.camera_bind_group);
        }

        draw_calls
    }

    pub fn rebuilds(&self) -> u64 {
        self.programs.rebuilds()
    }
}

fn uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

/// Create a depth texture at the given dimensions.
fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("clip depth texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::config::RenderConfig;
    use crate::clip::plane::ClipPlane;

    #[test]
    fn uniforms_are_one_matrix_each() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 64);
        assert_eq!(std::mem::size_of::<ModelUniform>(), 64);
    }

    #[test]
    fn labels_name_every_input() {
        let key = ProgramKey::new(
            RenderConfig {
                wireframe: true,
                back_face_culling: false,
                clipping: true,
                fragments: true,
            },
            ClipPlane::fixed(),
        );
        assert_eq!(
            program_label(&key),
            "clip program [line, double-sided, clipped, fragments]"
        );
        assert_eq!(
            program_label(&ProgramKey::new(RenderConfig::default(), ClipPlane::fixed())),
            "clip program [fill, culled, unclipped, solid]"
        );
    }
}
