//! Rendering subsystem — wgpu abstraction.

pub mod gpu;
pub mod pass;

pub use gpu::{Capabilities, GpuContext, LocalClipping};
pub use pass::{ClearColor, FrameContext};
