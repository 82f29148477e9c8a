//! Window management via winit.
//!
//! Implements [`winit::application::ApplicationHandler`] to drive the event
//! loop: window creation, keyboard forwarding, resize, and one scene frame
//! per redraw. Keys `1`–`4` stand in for the debug control panel; the arrow
//! keys orbit the camera.

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use crate::clip::{FrameError, RenderConfig, SceneRoot, Toggle};
use crate::error::RenderError;
use crate::input::{KeyCode, Keyboard};
use crate::render::ClearColor;
use crate::time::Time;

/// Orbit speed for the arrow keys, radians per second.
const ORBIT_SPEED: f32 = 1.5;

/// The control-panel key for each toggle.
pub(crate) fn toggle_for(key: KeyCode) -> Option<Toggle> {
    match key {
        KeyCode::Digit1 => Some(Toggle::Wireframe),
        KeyCode::Digit2 => Some(Toggle::BackFaceCulling),
        KeyCode::Digit3 => Some(Toggle::Clipping),
        KeyCode::Digit4 => Some(Toggle::Fragments),
        _ => None,
    }
}

/// The application state that winit drives.
pub(crate) struct WinitApp {
    title: String,
    config: RenderConfig,
    clear_color: ClearColor,
    keys: Keyboard,
    time: Time,
    window: Option<Arc<Window>>,
    root: Option<SceneRoot>,
    /// The last program error, logged once until it changes.
    program_error: Option<RenderError>,
    /// An error that stopped the event loop.
    fatal: Option<RenderError>,
    #[cfg(feature = "diagnostics")]
    diag: Option<crate::diag::DiagSender>,
    #[cfg(feature = "diagnostics")]
    last_stats: Option<crate::clip::FrameStats>,
}

impl WinitApp {
    pub fn new(title: String, config: RenderConfig, clear_color: ClearColor) -> Self {
        Self {
            title,
            config,
            clear_color,
            keys: Keyboard::new(),
            time: Time::new(),
            window: None,
            root: None,
            program_error: None,
            fatal: None,
            #[cfg(feature = "diagnostics")]
            diag: crate::diag::DiagSender::new(),
            #[cfg(feature = "diagnostics")]
            last_stats: None,
        }
    }

    pub fn take_fatal(&mut self) -> Option<RenderError> {
        self.fatal.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: RenderError) {
        log::error!("{error}");
        self.fatal = Some(error);
        event_loop.exit();
    }

    /// Apply control-panel keys pressed since the last frame.
    fn apply_toggles(&mut self) {
        for key in [
            KeyCode::Digit1,
            KeyCode::Digit2,
            KeyCode::Digit3,
            KeyCode::Digit4,
        ] {
            if let Some(toggle) = toggle_for(key).filter(|_| self.keys.tapped(key)) {
                self.config = self.config.toggled(toggle);
                log::info!("{toggle:?} toggled: {:?}", self.config);
            }
        }
    }

    fn orbit_camera(&mut self) {
        let Some(root) = &mut self.root else { return };
        let step = ORBIT_SPEED * self.time.delta_secs();
        let yaw = self.keys.axis(KeyCode::ArrowRight, KeyCode::ArrowLeft);
        let pitch = self.keys.axis(KeyCode::ArrowDown, KeyCode::ArrowUp);
        if yaw != 0.0 || pitch != 0.0 {
            root.camera_mut().orbit(yaw * step, pitch * step);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.time.tick();
        self.apply_toggles();
        self.orbit_camera();
        self.keys.end_frame();

        let Some(root) = &mut self.root else { return };
        match root.frame(self.config) {
            Ok(_stats) => {
                if self.program_error.take().is_some() {
                    log::info!("GPU program recovered");
                }
                #[cfg(feature = "diagnostics")]
                {
                    self.last_stats = Some(_stats);
                }
            }
            Err(FrameError::Program(e)) => {
                if self.program_error.as_ref() != Some(&e) {
                    log::error!("Triangle not drawn: {e}");
                    self.program_error = Some(e);
                }
            }
            Err(FrameError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                root.reconfigure();
            }
            Err(FrameError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                log::error!("Out of GPU memory!");
                event_loop.exit();
            }
            Err(FrameError::Surface(e)) => {
                log::warn!("Surface error: {e:?}");
            }
        }
    }
}

impl ApplicationHandler for WinitApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(&self.title)
            .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 720.0));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, RenderError::CreateSurface(e.to_string()));
                return;
            }
        };

        match SceneRoot::new(window.clone(), self.config) {
            Ok(root) => {
                log::info!("Scene ready: {:?}", self.config);
                self.root = Some(root.with_clear_color(self.clear_color));
                window.request_redraw();
                self.window = Some(window);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Window close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(root) = &mut self.root {
                    root.resize(size.width, size.height);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => self.keys.press(key_code),
                        ElementState::Released => self.keys.release(key_code),
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);

                // Request next frame.
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        #[cfg(feature = "diagnostics")]
        if let Some(diag) = &mut self.diag {
            let error = self.program_error.as_ref().map(|e| e.to_string());
            diag.send(
                &self.time,
                self.config,
                self.last_stats.as_ref(),
                error.as_deref(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_keys_map_to_the_four_toggles() {
        assert_eq!(toggle_for(KeyCode::Digit1), Some(Toggle::Wireframe));
        assert_eq!(toggle_for(KeyCode::Digit2), Some(Toggle::BackFaceCulling));
        assert_eq!(toggle_for(KeyCode::Digit3), Some(Toggle::Clipping));
        assert_eq!(toggle_for(KeyCode::Digit4), Some(Toggle::Fragments));
        assert_eq!(toggle_for(KeyCode::Digit5), None);
    }

    #[test]
    fn pressing_three_turns_clipping_on() {
        let mut app = WinitApp::new("test".into(), RenderConfig::default(), ClearColor::default());
        app.keys.press(KeyCode::Digit3);
        app.apply_toggles();
        assert!(app.config.clipping);

        // Held keys do not toggle again on the next frame.
        app.keys.end_frame();
        app.apply_toggles();
        assert!(app.config.clipping);
    }
}
