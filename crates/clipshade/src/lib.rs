//! # Clipshade — Shader-Driven Plane Clipping
//!
//! A small wgpu renderer for a single triangle whose GPU program can be
//! reconfigured at runtime: wireframe rasterization, back-face culling,
//! per-fragment plane clipping, and a debug view that colors each fragment by
//! its interpolated model-space position.
//!
//! Start with `use clipshade::prelude::*` and run an [`App`](app::App).

pub mod app;
pub mod clip;
pub mod error;
pub mod input;
pub mod math;
pub mod prelude;
pub mod render;
pub mod time;
pub(crate) mod window;

#[cfg(feature = "diagnostics")]
pub mod diag;

pub use error::{RenderError, Result};
