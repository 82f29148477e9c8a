//! Render configuration — the four operator toggles.
//!
//! The configuration is produced by an external control panel (in the demo,
//! the number keys) and is read-only to the core. Each change is a discrete
//! snapshot; the core reads the latest complete snapshot at rebuild time.

use serde::{Deserialize, Serialize};

/// The four independent rendering behaviors.
///
/// | Field | Effect |
/// |-------|--------|
/// | `wireframe` | rasterize edges only instead of filled triangles |
/// | `back_face_culling` | discard back-facing triangles; otherwise double-sided |
/// | `clipping` | supply the clip plane to the fragment clip test |
/// | `fragments` | color fragments by `abs(local position)` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    pub wireframe: bool,
    pub back_face_culling: bool,
    pub clipping: bool,
    pub fragments: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            wireframe: false,
            back_face_culling: true,
            clipping: false,
            fragments: false,
        }
    }
}

/// One of the four toggles, addressable by the control panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Wireframe,
    BackFaceCulling,
    Clipping,
    Fragments,
}

impl RenderConfig {
    /// Return a copy with one toggle flipped.
    pub fn toggled(mut self, toggle: Toggle) -> Self {
        let field = match toggle {
            Toggle::Wireframe => &mut self.wireframe,
            Toggle::BackFaceCulling => &mut self.back_face_culling,
            Toggle::Clipping => &mut self.clipping,
            Toggle::Fragments => &mut self.fragments,
        };
        *field = !*field;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_control_panel() {
        let cfg = RenderConfig::default();
        assert!(!cfg.wireframe);
        assert!(cfg.back_face_culling);
        assert!(!cfg.clipping);
        assert!(!cfg.fragments);
    }

    #[test]
    fn toggled_flips_exactly_one_field() {
        let cfg = RenderConfig::default().toggled(Toggle::Clipping);
        assert_eq!(
            cfg,
            RenderConfig {
                clipping: true,
                ..RenderConfig::default()
            }
        );
        assert_eq!(cfg.toggled(Toggle::Clipping), RenderConfig::default());
    }

    #[test]
    fn panel_snapshots_use_camel_case_names() {
        let cfg: RenderConfig =
            serde_json::from_str(r#"{"wireframe":true,"backFaceCulling":false}"#).unwrap();
        assert!(cfg.wireframe);
        assert!(!cfg.back_face_culling);
        // Missing fields fall back to the panel defaults.
        assert!(!cfg.clipping);
        assert!(!cfg.fragments);

        let json = serde_json::to_string(&RenderConfig::default()).unwrap();
        assert!(json.contains("\"backFaceCulling\":true"), "got {json}");
    }
}
