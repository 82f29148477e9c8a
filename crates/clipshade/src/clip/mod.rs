//! # Clip — The Shader-Driven Clipping Pipeline
//!
//! Everything that decides what the triangle looks like:
//!
//! ```text
//!  RenderConfig ──┐
//!                 ├─► ProgramKey ─► ProgramCache ─► ClipProgram ──┐
//!  ClipPlane ─────┤                 (rebuild on key change)       ├─► frame
//!                 └─► OverlayQuad (iff clipping) ─────────────────┘
//!  Spin ─► Mesh transform ───────────────────────────────────────────┘
//! ```
//!
//! The CPU-side types (`config`, `plane`, `program`, `shader`, `overlay`,
//! `animation`, `scene`) have no GPU dependency and are tested directly. The
//! GPU side lives in `pipeline`, and `root` sequences one frame.

pub mod animation;
pub mod camera;
pub mod config;
pub mod geometry;
pub mod overlay;
pub(crate) mod pipeline;
pub mod plane;
pub mod program;
pub mod root;
pub mod scene;
pub mod shader;

pub use animation::Spin;
pub use camera::Camera;
pub use config::{RenderConfig, Toggle};
pub use geometry::TriangleGeometry;
pub use overlay::OverlayQuad;
pub use plane::ClipPlane;
pub use program::{ProgramCache, ProgramDesc, ProgramKey};
pub use root::{FrameError, FrameStats, SceneRoot};
pub use scene::{Mesh, Scene};
