//! Application builder.
//!
//! [`App`] is the entry point for the demo: set the window title, the
//! initial configuration, and the background, then call [`run`](App::run).
//!
//! # Example
//!
//! ```ignore
//! use clipshade::prelude::*;
//!
//! fn main() -> clipshade::Result<()> {
//!     env_logger::init();
//!     App::new("Clipping")
//!         .config(RenderConfig { clipping: true, ..Default::default() })
//!         .run()
//! }
//! ```

use crate::clip::RenderConfig;
use crate::error::{RenderError, Result};
use crate::render::ClearColor;
use crate::window::WinitApp;

pub struct App {
    title: String,
    config: RenderConfig,
    clear_color: ClearColor,
}

impl App {
    /// Create an app with the given window title and default toggles.
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            config: RenderConfig::default(),
            clear_color: ClearColor::default(),
        }
    }

    /// Initial control-panel snapshot.
    pub fn config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn clear_color(mut self, clear_color: ClearColor) -> Self {
        self.clear_color = clear_color;
        self
    }

    /// Start the event loop. Returns when the window closes, or with the
    /// error that made setup impossible.
    pub fn run(self) -> Result<()> {
        let event_loop = winit::event_loop::EventLoop::new()
            .map_err(|e| RenderError::EventLoop(e.to_string()))?;

        let mut app = WinitApp::new(self.title, self.config, self.clear_color);

        event_loop
            .run_app(&mut app)
            .map_err(|e| RenderError::EventLoop(e.to_string()))?;

        match app.take_fatal() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
