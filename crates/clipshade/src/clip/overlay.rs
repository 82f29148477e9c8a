//! Clip-plane overlay: a translucent quad lying in the clip plane.
//!
//! The overlay is reference geometry. Its transform is derived from the
//! [`ClipPlane`] alone, it is drawn double-sided with alpha blending, and it
//! never runs the clip test. It reads the depth buffer (`LessEqual`) without
//! writing to it so the triangle stays visible through it.
//!
//! The scene holds the overlay as `Option<OverlayQuad>`: it exists while
//! clipping is on and is absent otherwise. The GPU buffers follow the same
//! lifetime.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::geometry::PositionVertex;
use super::pipeline::DEPTH_FORMAT;
use super::plane::ClipPlane;
use crate::math::{Quat, Transform, Vec3};
use crate::render::GpuContext;

/// Edge length of the overlay quad.
pub const OVERLAY_SIZE: [f32; 2] = [4.0, 4.0];

/// Red at 30% opacity.
pub const OVERLAY_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 0.3];

/// The overlay scene node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayQuad {
    pub transform: Transform,
    pub size: [f32; 2],
    pub color: [f32; 4],
}

impl OverlayQuad {
    /// Place a quad in `plane`: moved to the plane's closest point to the
    /// origin and turned so its +Z face points along the plane normal.
    pub fn from_plane(plane: &ClipPlane) -> Self {
        Self {
            transform: Transform::from_translation_rotation(
                plane.coplanar_point(),
                Quat::from_rotation_arc(Vec3::Z, plane.normal()),
            ),
            size: OVERLAY_SIZE,
            color: OVERLAY_COLOR,
        }
    }

    /// Local-space corners, counter-clockwise from +Z.
    pub fn vertices(&self) -> [PositionVertex; 4] {
        let [hw, hh] = self.size.map(|s| s * 0.5);
        [
            [-hw, -hh, 0.0],
            [hw, -hh, 0.0],
            [hw, hh, 0.0],
            [-hw, hh, 0.0],
        ]
        .map(|position| PositionVertex { position })
    }
}

pub const OVERLAY_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub(crate) struct OverlayUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl From<&OverlayQuad> for OverlayUniform {
    fn from(quad: &OverlayQuad) -> Self {
        Self {
            model: quad.transform.matrix().to_cols_array_2d(),
            color: quad.color,
        }
    }
}

/// Buffers for one overlay instance.
struct OverlayInstance {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// GPU side of the overlay. Created the first time an overlay appears.
pub(crate) struct OverlayRenderer {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    instance: Option<OverlayInstance>,
}

impl OverlayRenderer {
    pub fn new(gpu: &GpuContext, camera_bind_group_layout: &wgpu::BindGroupLayout) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("clip overlay shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("overlay.wgsl").into()),
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("clip overlay layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("clip overlay pipeline layout"),
            bind_group_layouts: &[camera_bind_group_layout, &layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("clip overlay pipeline"),
            layout: Some(&pipeline_layout),
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
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None, // double-sided
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            layout,
            instance: None,
        }
    }

    /// Match the GPU buffers to the scene's overlay node.
    pub fn sync(&mut self, gpu: &GpuContext, quad: Option<&OverlayQuad>) {
        let Some(quad) = quad else {
            if self.instance.take().is_some() {
                log::debug!("Clip overlay removed");
            }
            return;
        };

        let uniform = OverlayUniform::from(quad);
        if let Some(instance) = &self.instance {
            gpu.queue
                .write_buffer(&instance.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));
            return;
        }

        let device = &gpu.device;
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("clip overlay vertex buffer"),
            contents: bytemuck::cast_slice(&quad.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("clip overlay index buffer"),
            contents: bytemuck::cast_slice(&OVERLAY_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("clip overlay uniform buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("clip overlay bind group"),
            layout: &self.layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        self.instance = Some(OverlayInstance {
            vertex_buffer,
            index_buffer,
            uniform_buffer,
            bind_group,
        });
        log::debug!("Clip overlay created at {}", quad.transform.translation);
    }

    /// Draw the overlay if one is present. Returns the number of draw calls.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, camera_bind_group: &wgpu::BindGroup) -> u32 {
        let Some(instance) = &self.instance else {
            return 0;
        };
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, camera_bind_group, &[]);
        pass.set_bind_group(1, &instance.bind_group, &[]);
        pass.set_vertex_buffer(0, instance.vertex_buffer.slice(..));
        pass.set_index_buffer(instance.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..OVERLAY_INDICES.len() as u32, 0, 0..1);
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_shader_compiles() {
        let src = include_str!("overlay.wgsl");
        let module = naga::front::wgsl::parse_str(src).unwrap();
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::empty(),
        )
        .validate(&module)
        .unwrap();
    }

    #[test]
    fn overlay_lies_in_the_clip_plane() {
        let plane = ClipPlane::fixed();
        let quad = OverlayQuad::from_plane(&plane);
        assert!((quad.transform.translation - Vec3::new(0.3, 0.0, 0.0)).length() < 1e-6);
        for v in quad.vertices() {
            let world = quad.transform.transform_point(Vec3::from(v.position));
            assert!(plane.signed_distance(world).abs() < 1e-5, "{world}");
        }
    }

    #[test]
    fn overlay_faces_along_the_normal() {
        let plane = ClipPlane::fixed();
        let quad = OverlayQuad::from_plane(&plane);
        let facing = quad.transform.rotation * Vec3::Z;
        assert!((facing - plane.normal()).length() < 1e-5, "{facing}");
    }

    #[test]
    fn rebuilt_overlay_is_identical() {
        let plane = ClipPlane::fixed();
        assert_eq!(OverlayQuad::from_plane(&plane), OverlayQuad::from_plane(&plane));
    }

    #[test]
    fn overlay_is_four_by_four_translucent_red() {
        let quad = OverlayQuad::from_plane(&ClipPlane::fixed());
        let xs: Vec<f32> = quad.vertices().iter().map(|v| v.position[0]).collect();
        assert_eq!(xs, vec![-2.0, 2.0, 2.0, -2.0]);
        assert_eq!(quad.color, [1.0, 0.0, 0.0, 0.3]);
    }

    #[test]
    fn uniform_is_eighty_bytes() {
        assert_eq!(std::mem::size_of::<OverlayUniform>(), 80);
    }
}
