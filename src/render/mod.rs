//! Canvas 2D render pass
//!
//! Pure functions of the current scene state: read everything, mutate
//! nothing. One module per scene.

pub mod flappy;
pub mod graph;
pub mod loader;

/// Effect toggles derived from the settings profile
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub glow: bool,
    pub reduced_motion: bool,
}

impl RenderOptions {
    pub fn from_settings(settings: &crate::Settings) -> Self {
        Self {
            glow: settings.glow,
            reduced_motion: settings.reduced_motion,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            glow: true,
            reduced_motion: false,
        }
    }
}

/// Shared palette (the site's neon scheme)
pub mod palette {
    pub const BG: &str = "#121212";
    pub const CYAN: &str = "#00ffff";
    pub const MAGENTA: &str = "#ff00ff";
    pub const TEXT: &str = "#e0e0e0";
    pub const HUD_FONT: &str = "20px \"Share Tech Mono\", monospace";
    pub const OVERLAY_FONT: &str = "28px \"Share Tech Mono\", monospace";
    pub const PROMPT_FONT: &str = "18px \"Share Tech Mono\", monospace";
}
