//! Common imports: `use clipshade::prelude::*`.

pub use crate::app::App;
pub use crate::clip::{
    Camera, ClipPlane, FrameStats, OverlayQuad, ProgramKey, RenderConfig, Scene, SceneRoot, Toggle,
};
pub use crate::error::{RenderError, Result};
pub use crate::input::KeyCode;
pub use crate::math::{Quat, Transform, Vec3};
pub use crate::render::ClearColor;
