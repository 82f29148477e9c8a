//! # Geometry — The Triangle Vertex Buffer
//!
//! The scene draws exactly one primitive: a triangle with vertices
//! `(-1,-1,0)`, `(1,-1,0)`, `(0,1,0)` in local space. The buffer is built once
//! and never mutated; it is shared read-only by every frame and every rebuilt
//! GPU program, since geometry does not depend on the configuration.
//!
//! ## Winding Order
//!
//! The vertices are listed counter-clockwise when viewed from +Z, which
//! matches `FrontFace::Ccw`. With back-face culling on, the triangle is
//! visible from the front (+Z side) and vanishes when it has rotated to show
//! its back.
//!
//! ## Memory Layout
//!
//! ```text
//! PositionVertex (12 bytes)
//! ┌──────────────┐
//! │ position     │
//! │ [f32; 3]     │
//! │ location(0)  │
//! └──────────────┘
//! ```

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::render::GpuContext;

/// Local-space corners of the triangle, counter-clockwise from +Z.
pub const TRIANGLE_POSITIONS: [[f32; 3]; 3] = [
    [-1.0, -1.0, 0.0],
    [1.0, -1.0, 0.0],
    [0.0, 1.0, 0.0],
];

/// Per-vertex data: position only.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PositionVertex {
    pub position: [f32; 3],
}

impl PositionVertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<PositionVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        }],
    };
}

/// The immutable triangle geometry. Exactly three vertices.
#[derive(Debug)]
pub struct TriangleGeometry {
    vertices: [PositionVertex; 3],
}

impl TriangleGeometry {
    pub fn new() -> Self {
        Self {
            vertices: TRIANGLE_POSITIONS.map(|position| PositionVertex { position }),
        }
    }

    pub fn vertices(&self) -> &[PositionVertex; 3] {
        &self.vertices
    }
}

impl Default for TriangleGeometry {
    fn default() -> Self {
        Self::new()
    }
}

/// The triangle uploaded to a GPU vertex buffer.
pub(crate) struct GpuGeometry {
    pub vertex_buffer: wgpu::Buffer,
    pub vertex_count: u32,
}

impl GpuGeometry {
    pub fn upload(gpu: &GpuContext, geometry: &TriangleGeometry) -> Self {
        let vertex_buffer = gpu.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("triangle vertex buffer"),
            contents: bytemuck::cast_slice(geometry.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            vertex_buffer,
            vertex_count: geometry.vertices().len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn triangle_has_the_three_fixed_corners() {
        let geo = TriangleGeometry::new();
        let positions: Vec<[f32; 3]> = geo.vertices().iter().map(|v| v.position).collect();
        assert_eq!(positions, TRIANGLE_POSITIONS.to_vec());
    }

    #[test]
    fn triangle_is_counter_clockwise_from_front() {
        let [a, b, c] = TRIANGLE_POSITIONS.map(Vec3::from);
        let normal = (b - a).cross(c - a);
        assert!(normal.z > 0.0, "front face should point toward +Z, got {normal}");
    }

    #[test]
    fn vertex_stride_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<PositionVertex>(), 12);
        assert_eq!(PositionVertex::LAYOUT.array_stride, 12);
        assert_eq!(bytemuck::cast_slice::<_, u8>(TriangleGeometry::new().vertices()).len(), 36);
    }
}
