//! # Program — Keys, Descriptions, and the Rebuild Cache
//!
//! A GPU program is a pure function of five inputs: the four configuration
//! toggles plus the clip plane. [`ProgramKey`] bundles exactly those inputs,
//! and [`ProgramKey::describe`] turns them into a backend-neutral
//! [`ProgramDesc`]: which rasterization mode, which cull mode, which clip
//! planes, and which fragment output.
//!
//! ## The Rebuild Rule
//!
//! [`ProgramCache`] holds one slot and the key it was filled from:
//!
//! ```text
//!   slot key == key?
//!   ├── yes, Ok(program)  → reuse the program
//!   ├── yes, Err(error)   → replay the error
//!   └── no / empty        → drop the slot, build a candidate
//!                              │
//!               Ok ────────────┴──────────── Err
//!        slot = (key, Ok(p))          slot = (key, Err(e))
//! ```
//!
//! The slot is always replaced whole. A failed build drops the previous
//! program too, so a draw can never fall back to a program built for a
//! different configuration. Replaying the stored error means a deterministic
//! failure is not retried until an input changes.
//!
//! The cache is generic over the program type so the rule is tested without a
//! GPU; the renderer instantiates it with its `wgpu::RenderPipeline` wrapper.

use super::config::RenderConfig;
use super::plane::ClipPlane;
use crate::error::{RenderError, Result};
use crate::render::{Capabilities, LocalClipping};

/// Solid surface color used when debug fragments are off.
pub const SURFACE_COLOR: [f32; 4] = [0.2, 0.6, 1.0, 1.0];

/// How triangles are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonMode {
    Fill,
    Line,
}

/// Which faces are dropped before the fragment stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    /// Back faces are culled (single-sided).
    Back,
    /// Both faces are shaded (double-sided).
    None,
}

/// What the fragment stage writes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FragmentOutput {
    /// A constant color.
    Solid([f32; 4]),
    /// `abs(local position)` with alpha 1.
    Position,
}

impl From<PolygonMode> for wgpu::PolygonMode {
    fn from(mode: PolygonMode) -> Self {
        match mode {
            PolygonMode::Fill => wgpu::PolygonMode::Fill,
            PolygonMode::Line => wgpu::PolygonMode::Line,
        }
    }
}

impl From<CullMode> for Option<wgpu::Face> {
    fn from(mode: CullMode) -> Self {
        match mode {
            CullMode::Back => Some(wgpu::Face::Back),
            CullMode::None => None,
        }
    }
}

/// The full set of inputs a program depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgramKey {
    pub config: RenderConfig,
    pub plane: ClipPlane,
}

impl ProgramKey {
    pub fn new(config: RenderConfig, plane: ClipPlane) -> Self {
        Self { config, plane }
    }

    /// Derive the program description from the key.
    pub fn describe(&self) -> ProgramDesc {
        let cfg = &self.config;
        ProgramDesc {
            polygon_mode: if cfg.wireframe {
                PolygonMode::Line
            } else {
                PolygonMode::Fill
            },
            cull_mode: if cfg.back_face_culling {
                CullMode::Back
            } else {
                CullMode::None
            },
            clip_planes: if cfg.clipping {
                vec![self.plane]
            } else {
                Vec::new()
            },
            fragment: if cfg.fragments {
                FragmentOutput::Position
            } else {
                FragmentOutput::Solid(SURFACE_COLOR)
            },
        }
    }
}

/// Backend-neutral description of one GPU program.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramDesc {
    pub polygon_mode: PolygonMode,
    pub cull_mode: CullMode,
    /// Empty, or exactly the one clip plane.
    pub clip_planes: Vec<ClipPlane>,
    pub fragment: FragmentOutput,
}

impl ProgramDesc {
    /// The active clip plane, if any.
    pub fn clip_plane(&self) -> Option<&ClipPlane> {
        self.clip_planes.first()
    }

    /// Check that the context can run this program as described.
    pub fn check_support(&self, caps: &Capabilities, clipping: LocalClipping) -> Result<()> {
        if self.polygon_mode == PolygonMode::Line && !caps.polygon_mode_line {
            return Err(RenderError::MissingFeature {
                feature: "POLYGON_MODE_LINE (wireframe)",
            });
        }
        if !self.clip_planes.is_empty() {
            if !caps.fragment_clip_test {
                return Err(RenderError::MissingFeature {
                    feature: "fragment clip test (SM4-class shader model)",
                });
            }
            if !clipping.is_enabled() {
                return Err(RenderError::ClippingNotEnabled);
            }
        }
        Ok(())
    }
}

/// Single-slot cache that rebuilds its program only when the key changes.
///
/// The slot holds the key it was filled from and the outcome of that build:
/// a ready program or the error that stopped it.
pub struct ProgramCache<P> {
    slot: Option<(ProgramKey, Result<P>)>,
    rebuilds: u64,
}

impl<P> ProgramCache<P> {
    pub fn new() -> Self {
        Self {
            slot: None,
            rebuilds: 0,
        }
    }

    /// Return the program for `key`, building it with `build` if the cached
    /// slot was filled from a different key.
    pub fn get_or_build(
        &mut self,
        key: ProgramKey,
        build: impl FnOnce(&ProgramKey) -> Result<P>,
    ) -> Result<&P> {
        let entry = match self.slot.take() {
            Some(entry) if entry.0 == key => entry,
            previous => {
                // Release the old program before building its replacement.
                drop(previous);
                self.rebuilds += 1;
                let built = build(&key);
                if let Err(e) = &built {
                    log::error!("GPU program build failed for {:?}: {e}", key.config);
                } else {
                    log::info!("Built GPU program for {:?}", key.config);
                }
                (key, built)
            }
        };
        let (_, built) = self.slot.insert(entry);
        built.as_ref().map_err(|e| e.clone())
    }

    /// The program currently in the slot, if the last build succeeded.
    pub fn current(&self) -> Option<&P> {
        self.slot.as_ref().and_then(|(_, built)| built.as_ref().ok())
    }

    /// The key the slot was last filled from.
    pub fn key(&self) -> Option<&ProgramKey> {
        self.slot.as_ref().map(|(key, _)| key)
    }

    /// Number of builds attempted so far.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }
}

impl<P> Default for ProgramCache<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// Every one of the 16 possible configurations.
#[cfg(test)]
pub(crate) fn all_configs() -> impl Iterator<Item = RenderConfig> {
    (0u8..16).map(|bits| RenderConfig {
        wireframe: bits & 1 != 0,
        back_face_culling: bits & 2 != 0,
        clipping: bits & 4 != 0,
        fragments: bits & 8 != 0,
    })
}
