//! Neon Graph - the canvas simulation layer of the GCPC site
//!
//! Core modules:
//! - `sim`: Deterministic simulations (node graph + UFO, Flappy Node, loader)
//! - `render`: Canvas 2D render pass (wasm only)
//! - `app`: Lifecycle controllers exposed to the host page (wasm only)
//! - `settings`: Effects/density preferences persisted to LocalStorage
//! - `storage`: Host key-value flag collaborator
//! - `tween`, `secret`, `quotes`: small page utilities

pub mod quotes;
pub mod secret;
pub mod settings;
pub mod sim;
pub mod storage;
pub mod tween;

#[cfg(target_arch = "wasm32")]
pub mod app;
#[cfg(target_arch = "wasm32")]
pub mod render;

pub use secret::SecretCode;
pub use settings::Settings;
pub use tween::CounterTween;

use glam::Vec2;

/// Shared configuration constants
pub mod consts {
    /// Maximum per-tick elapsed time in seconds (tab-resume clamp)
    pub const MAX_FRAME_DT: f32 = 0.033;

    /// Off-screen margin within which entities still count as on-canvas
    /// for edge wrapping (larger than the visible rectangle)
    pub const WRAP_BUFFER: f32 = 60.0;

    /// Graph scene: connection threshold between nodes (px)
    pub const GRAPH_EDGE_DIST: f32 = 150.0;
    /// Graph scene: canvas area per background node (px²)
    pub const GRAPH_AREA_PER_NODE: f32 = 15_000.0;
    /// Flappy backdrop: connection threshold between nodes (px)
    pub const BACKDROP_EDGE_DIST: f32 = 100.0;
    /// Flappy backdrop: canvas area per background node (px²)
    pub const BACKDROP_AREA_PER_NODE: f32 = 20_000.0;

    /// Flappy gravity (px/s²)
    pub const FLAPPY_GRAVITY: f32 = 1400.0;
    /// Flappy flap impulse - replaces vertical velocity outright (px/s)
    pub const FLAPPY_FLAP_VY: f32 = -420.0;
    /// Player radius (px)
    pub const FLAPPY_PLAYER_RADIUS: f32 = 10.0;
    /// Pipe width (px)
    pub const FLAPPY_PIPE_WIDTH: f32 = 60.0;
    /// Seconds between pipe spawns
    pub const FLAPPY_PIPE_INTERVAL: f32 = 1.6;
}

/// Squared distance between two points
#[inline]
pub fn dist_sq(a: Vec2, b: Vec2) -> f32 {
    (a - b).length_squared()
}

/// Distance with a minimum denominator guard - never returns less than 1.0,
/// so callers can divide by it without checking for degenerate geometry
#[inline]
pub fn safe_dist(a: Vec2, b: Vec2) -> f32 {
    (a - b).length().max(1.0)
}

/// Unit vector from `from` toward `to`; zero when the points coincide
#[inline]
pub fn dir_to(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Wrap a coordinate into [-buffer, dim + buffer]
#[inline]
pub fn wrap_coord(v: f32, dim: f32, buffer: f32) -> f32 {
    if v > dim + buffer {
        -buffer
    } else if v < -buffer {
        dim + buffer
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_dist_guards_zero() {
        let p = Vec2::new(5.0, 5.0);
        assert_eq!(safe_dist(p, p), 1.0);
        assert!((safe_dist(Vec2::ZERO, Vec2::new(3.0, 4.0)) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_wrap_coord() {
        assert_eq!(wrap_coord(50.0, 100.0, 60.0), 50.0);
        assert_eq!(wrap_coord(161.0, 100.0, 60.0), -60.0);
        assert_eq!(wrap_coord(-61.0, 100.0, 60.0), 160.0);
        // exactly on the buffer edge stays put
        assert_eq!(wrap_coord(160.0, 100.0, 60.0), 160.0);
    }
}
