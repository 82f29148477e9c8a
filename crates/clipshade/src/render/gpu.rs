//! GPU context — wgpu device, queue, and surface management.
//!
//! [`GpuContext`] wraps the wgpu primitives needed for rendering, plus the
//! two pieces of context-level state the clipping pipeline depends on:
//!
//! - [`Capabilities`]: what the adapter can do, read once at creation.
//!   Wireframe needs `POLYGON_MODE_LINE`; the fragment clip test needs a
//!   shader model with reliable `discard`.
//! - [`LocalClipping`]: the global switch that must be on before any program
//!   may carry a clip plane. It goes `Disabled → Enabled` once and is never
//!   turned off again.

use std::sync::Arc;

use crate::error::{RenderError, Result};

/// Device capabilities the clipping pipeline cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// `PolygonMode::Line` is available (wireframe rasterization).
    pub polygon_mode_line: bool,
    /// The fragment stage can discard on a per-fragment plane test.
    pub fragment_clip_test: bool,
}

impl Capabilities {
    /// Everything available.
    #[cfg(test)]
    pub(crate) const ALL: Self = Self {
        polygon_mode_line: true,
        fragment_clip_test: true,
    };

    /// Read what an adapter supports.
    pub fn from_adapter(adapter: &wgpu::Adapter) -> Self {
        let features = adapter.features();
        let downlevel = adapter.get_downlevel_capabilities();
        Self {
            polygon_mode_line: features.contains(wgpu::Features::POLYGON_MODE_LINE),
            fragment_clip_test: !matches!(downlevel.shader_model, wgpu::ShaderModel::Sm2),
        }
    }

    /// Features to request from the device so that detected capabilities are
    /// actually usable.
    pub fn required_features(&self) -> wgpu::Features {
        if self.polygon_mode_line {
            wgpu::Features::POLYGON_MODE_LINE
        } else {
            wgpu::Features::empty()
        }
    }
}

/// Global clip-test switch of a rendering context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocalClipping {
    #[default]
    Disabled,
    Enabled,
}

impl LocalClipping {
    /// Transition to [`LocalClipping::Enabled`]. Idempotent once enabled;
    /// fails if the context cannot run the clip test.
    pub fn enable(&mut self, caps: &Capabilities) -> Result<()> {
        if *self == Self::Enabled {
            return Ok(());
        }
        if !caps.fragment_clip_test {
            return Err(RenderError::MissingFeature {
                feature: "fragment clip test (SM4-class shader model)",
            });
        }
        *self = Self::Enabled;
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        *self == Self::Enabled
    }
}

/// Wraps the wgpu device, queue, surface, and surface configuration.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    capabilities: Capabilities,
    local_clipping: LocalClipping,
}

impl GpuContext {
    /// Initialize wgpu: create instance, adapter, device, queue, and configure
    /// the surface for the given window.
    pub fn new(window: Arc<winit::window::Window>) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let surface = instance
            .create_surface(window)
            .map_err(|e| RenderError::CreateSurface(e.to_string()))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|e| RenderError::NoAdapter(e.to_string()))?;

        let capabilities = Capabilities::from_adapter(&adapter);
        log::info!(
            "GPU adapter: {} ({:?}), {:?}",
            adapter.get_info().name,
            adapter.get_info().backend,
            capabilities
        );

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("clipshade device"),
                required_features: capabilities.required_features(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            },
        ))
        .map_err(|e| RenderError::RequestDevice(e.to_string()))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| RenderError::CreateSurface("surface reports no formats".into()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            capabilities,
            local_clipping: LocalClipping::Disabled,
        })
    }

    /// Turn on the clip test for this context. Must happen before any
    /// clipping program is built.
    pub fn enable_local_clipping(&mut self) -> Result<()> {
        let was_enabled = self.local_clipping.is_enabled();
        self.local_clipping.enable(&self.capabilities)?;
        if !was_enabled {
            log::info!("Local clipping enabled on rendering context");
        }
        Ok(())
    }

    pub fn local_clipping(&self) -> LocalClipping {
        self.local_clipping
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Resize the surface (call when the window is resized).
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.surface_config.width = width;
            self.surface_config.height = height;
            self.surface.configure(&self.device, &self.surface_config);
        }
    }

    /// Get the current surface texture format.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_config.format
    }

    /// Get the current surface size.
    pub fn surface_size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_clipping_starts_disabled() {
        assert_eq!(LocalClipping::default(), LocalClipping::Disabled);
        assert!(!LocalClipping::default().is_enabled());
    }

    #[test]
    fn enable_is_one_way_and_idempotent() {
        let mut state = LocalClipping::Disabled;
        state.enable(&Capabilities::ALL).unwrap();
        assert!(state.is_enabled());
        state.enable(&Capabilities::ALL).unwrap();
        assert_eq!(state, LocalClipping::Enabled);
    }

    #[test]
    fn enable_reports_missing_capability() {
        let caps = Capabilities {
            polygon_mode_line: true,
            fragment_clip_test: false,
        };
        let mut state = LocalClipping::Disabled;
        let err = state.enable(&caps).unwrap_err();
        assert!(matches!(err, RenderError::MissingFeature { .. }));
        assert!(!state.is_enabled(), "a failed enable must not flip the switch");
    }

    #[test]
    fn line_mode_is_requested_only_when_offered() {
        assert_eq!(
            Capabilities::ALL.required_features(),
            wgpu::Features::POLYGON_MODE_LINE
        );
        let caps = Capabilities {
            polygon_mode_line: false,
            fragment_clip_test: true,
        };
        assert!(caps.required_features().is_empty());
    }
}
