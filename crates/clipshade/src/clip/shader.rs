//! # Shader — Generated WGSL for One Program Key
//!
//! The clip program is one fixed WGSL body (`clip.wgsl`) specialized by a
//! header of `const` declarations:
//!
//! ```text
//! const CLIPPING: bool = true;
//! const SHOW_FRAGMENTS: bool = false;
//! const CLIP_PLANE: vec4<f32> = vec4<f32>(1.0, 0.0, 0.0, -0.3);
//! const SURFACE_COLOR: vec4<f32> = vec4<f32>(0.2, 0.6, 1.0, 1.0);
//! ─────────────────────────────────────────────── clip.wgsl ──
//! ```
//!
//! Constant branches are folded by the shader compiler, so a program built
//! without clipping carries no plane test at all.
//!
//! Test builds also carry `FragmentStage`, the same fragment logic
//! evaluated on the CPU, so the discard and color rules can be checked
//! without a device.

#[cfg(test)]
use glam::Vec3;

use super::program::{FragmentOutput, ProgramDesc, SURFACE_COLOR};

/// The fixed program body.
pub const CLIP_SHADER_BODY: &str = include_str!("clip.wgsl");

/// Generate the full WGSL source for a program description.
pub fn program_source(desc: &ProgramDesc) -> String {
    let plane = desc.clip_plane().map(|p| p.as_vec4().to_array()).unwrap_or([0.0; 4]);
    let (show_fragments, color) = match desc.fragment {
        FragmentOutput::Solid(color) => (false, color),
        FragmentOutput::Position => (true, SURFACE_COLOR),
    };

    let mut src = format!(
        "const CLIPPING: bool = {};\n\
         const SHOW_FRAGMENTS: bool = {show_fragments};\n\
         const CLIP_PLANE: vec4<f32> = {};\n\
         const SURFACE_COLOR: vec4<f32> = {};\n\n",
        desc.clip_plane().is_some(),
        wgsl_vec4(plane),
        wgsl_vec4(color),
    );
    src.push_str(CLIP_SHADER_BODY);
    src
}

fn wgsl_vec4(v: [f32; 4]) -> String {
    // `{:?}` always prints a decimal point or exponent, which WGSL needs to
    // read the literal as a float.
    format!("vec4<f32>({:?}, {:?}, {:?}, {:?})", v[0], v[1], v[2], v[3])
}

/// CPU evaluation of the fragment stage for one program.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FragmentStage {
    plane: Option<[f32; 4]>,
    output: FragmentOutput,
}

#[cfg(test)]
impl FragmentStage {
    pub(crate) fn new(desc: &ProgramDesc) -> Self {
        Self {
            plane: desc.clip_plane().map(|p| p.as_vec4().to_array()),
            output: desc.fragment,
        }
    }

    /// Shade one fragment. `None` means the fragment was discarded.
    pub(crate) fn shade(&self, local: Vec3, world: Vec3) -> Option<[f32; 4]> {
        if let Some([x, y, z, w]) = self.plane {
            if Vec3::new(x, y, z).dot(world) + w < 0.0 {
                return None;
            }
        }
        Some(match self.output {
            FragmentOutput::Solid(color) => color,
            FragmentOutput::Position => local.abs().extend(1.0).to_array(),
        })
    }
}
