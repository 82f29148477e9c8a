//! Error types.
//!
//! Every failure in the core is deterministic for a fixed set of inputs, so
//! nothing here is retried: errors propagate to the caller as [`RenderError`]
//! values and are never swallowed.

use std::fmt;

/// Errors produced while setting up the GPU or building a GPU program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A clip plane was constructed from a zero-length or non-finite normal.
    InvalidPlane { reason: &'static str },
    /// WGSL failed to compile, or the render pipeline failed validation.
    ShaderCompilation { label: String, diagnostic: String },
    /// The device lacks a capability the requested program depends on.
    MissingFeature { feature: &'static str },
    /// A clipping program was requested before local clipping was enabled on
    /// the rendering context.
    ClippingNotEnabled,
    /// No GPU adapter is compatible with the surface.
    NoAdapter(String),
    /// The adapter refused to create a device.
    RequestDevice(String),
    /// The window could not be turned into a presentable surface.
    CreateSurface(String),
    /// The windowing event loop failed.
    EventLoop(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPlane { reason } => write!(f, "invalid clip plane: {reason}"),
            Self::ShaderCompilation { label, diagnostic } => {
                write!(f, "failed to build GPU program '{label}': {diagnostic}")
            }
            Self::MissingFeature { feature } => {
                write!(f, "rendering context is missing required capability {feature}")
            }
            Self::ClippingNotEnabled => {
                write!(f, "clipping requested but local clipping is not enabled on the context")
            }
            Self::NoAdapter(e) => write!(f, "no suitable GPU adapter: {e}"),
            Self::RequestDevice(e) => write!(f, "failed to create GPU device: {e}"),
            Self::CreateSurface(e) => write!(f, "failed to create surface: {e}"),
            Self::EventLoop(e) => write!(f, "event loop error: {e}"),
        }
    }
}

impl std::error::Error for RenderError {}

pub type Result<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shader_errors_carry_the_diagnostic() {
        let err = RenderError::ShaderCompilation {
            label: "clip program".into(),
            diagnostic: "expected ';'".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("clip program"));
        assert!(msg.contains("expected ';'"));
    }

    #[test]
    fn missing_feature_names_the_feature() {
        let err = RenderError::MissingFeature { feature: "POLYGON_MODE_LINE" };
        assert!(err.to_string().contains("POLYGON_MODE_LINE"));
    }
}
