//! Scene settings and preferences
//!
//! Persisted separately from anything the simulations own. Best scores are
//! deliberately NOT here - they are session-only by contract.

use serde::{Deserialize, Serialize};

/// Background density presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DensityPreset {
    Sparse,
    #[default]
    Normal,
    Dense,
}

impl DensityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            DensityPreset::Sparse => "Sparse",
            DensityPreset::Normal => "Normal",
            DensityPreset::Dense => "Dense",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sparse" | "low" => Some(DensityPreset::Sparse),
            "normal" | "medium" => Some(DensityPreset::Normal),
            "dense" | "high" => Some(DensityPreset::Dense),
            _ => None,
        }
    }

    /// Multiplier on the area-per-node divisor; larger means fewer nodes
    pub fn area_factor(&self) -> f32 {
        match self {
            DensityPreset::Sparse => 1.8,
            DensityPreset::Normal => 1.0,
            DensityPreset::Dense => 0.6,
        }
    }
}

/// Scene settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Background node density
    pub density: DensityPreset,

    // === Effects ===
    /// Node glow halos
    pub glow: bool,
    /// The UFO roams the background at all
    pub ufo_enabled: bool,
    /// Pointer pushes nearby nodes around
    pub pointer_force: bool,

    // === Accessibility ===
    /// Minimize jitter and warp flashes
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            density: DensityPreset::Normal,
            glow: true,
            ufo_enabled: true,
            pointer_force: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective charge/warp jitter switch (respects reduced_motion)
    pub fn effective_jitter(&self) -> bool {
        !self.reduced_motion
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "neon_graph_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage
            && let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY)
            && let Ok(settings) = serde_json::from_str(&json)
        {
            log::info!("Loaded settings from LocalStorage");
            return settings;
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage
            && let Ok(json) = serde_json::to_string(self)
        {
            let _ = storage.set_item(Self::STORAGE_KEY, &json);
            log::info!("Settings saved");
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_json_round_trip() {
        let mut settings = Settings::default();
        settings.density = DensityPreset::Dense;
        settings.reduced_motion = true;
        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.density, DensityPreset::Dense);
        assert!(back.reduced_motion);
        assert!(back.glow);
    }

    #[test]
    fn test_density_parse() {
        assert_eq!(DensityPreset::from_str("dense"), Some(DensityPreset::Dense));
        assert_eq!(DensityPreset::from_str("LOW"), Some(DensityPreset::Sparse));
        assert_eq!(DensityPreset::from_str("nope"), None);
        assert!(DensityPreset::Sparse.area_factor() > DensityPreset::Dense.area_factor());
    }
}
