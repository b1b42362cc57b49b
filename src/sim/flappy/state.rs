//! Flappy game state
//!
//! One instance per game session; the backdrop is reseeded on resize, the
//! round state on every restart. Best score survives restarts but not the
//! session (by contract it is never persisted).

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::tick::RestartEvent;
use crate::consts::{
    BACKDROP_AREA_PER_NODE, FLAPPY_PIPE_INTERVAL, FLAPPY_PLAYER_RADIUS,
};
use crate::sim::Scheduler;

/// Minimum backdrop population regardless of canvas area
pub const MIN_BACKDROP_NODES: usize = 30;

/// Explosion burst size on death
pub const EXPLOSION_PARTICLES: usize = 42;
/// Seconds the explosion plays before GameOver, even if particles linger
pub const EXPLOSION_DURATION: f32 = 1.0;
/// Downward acceleration on explosion particles (px/s²)
pub const PARTICLE_GRAVITY: f32 = 900.0;
/// Exponential drag rate on explosion particles
pub const PARTICLE_DRAG: f32 = 1.6;
/// Restart input is ignored for this long after entering GameOver
pub const RESTART_DEBOUNCE: f32 = 0.35;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Paused at the start, waiting for the first flap
    Ready,
    /// Active gameplay
    Playing,
    /// Death animation running; gameplay frozen
    Exploding,
    /// Waiting for the restart input
    GameOver,
}

/// The player's node
#[derive(Debug, Clone, Copy)]
pub struct Player {
    pub pos: Vec2,
    pub radius: f32,
    /// Vertical velocity; a flap replaces it outright
    pub vy: f32,
}

/// An obstacle pair: solid above and below a gap
#[derive(Debug, Clone, Copy)]
pub struct Pipe {
    /// Left edge
    pub x: f32,
    pub width: f32,
    /// Top of the gap
    pub gap_y: f32,
    pub gap_h: f32,
    pub speed: f32,
    pub scored: bool,
}

impl Pipe {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Explosion particle
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub age: f32,
    pub lifetime: f32,
    pub size: f32,
}

/// Backdrop node: clamp-and-bounce variant of the background drift
#[derive(Debug, Clone, Copy)]
pub struct BackdropNode {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub cyan: bool,
}

/// Backdrop edge, derived each tick
#[derive(Debug, Clone, Copy)]
pub struct BackdropEdge {
    pub from: Vec2,
    pub to: Vec2,
    pub opacity: f32,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct FlappyState {
    pub width: f32,
    pub height: f32,
    pub phase: GamePhase,
    pub player: Player,
    pub pipes: Vec<Pipe>,
    pub particles: Vec<Particle>,
    pub backdrop: Vec<BackdropNode>,
    pub backdrop_edges: Vec<BackdropEdge>,
    pub pipe_timer: f32,
    pub score: u32,
    /// Session-running maximum; deliberately not persisted
    pub best_score: u32,
    pub explode_timer: f32,
    /// Armed by a scheduled event shortly after entering GameOver
    pub restart_armed: bool,
    pub events: Scheduler<RestartEvent>,
    /// Simulation time, seconds since construction
    pub time: f32,
    pub rng: Pcg32,
}

impl FlappyState {
    pub fn new(seed: u64, width: f32, height: f32) -> Self {
        let mut state = Self {
            width,
            height,
            phase: GamePhase::Ready,
            player: Player {
                pos: Vec2::new(width * 0.25, height * 0.5),
                radius: FLAPPY_PLAYER_RADIUS,
                vy: 0.0,
            },
            pipes: Vec::new(),
            particles: Vec::new(),
            backdrop: Vec::new(),
            backdrop_edges: Vec::new(),
            pipe_timer: FLAPPY_PIPE_INTERVAL,
            score: 0,
            best_score: 0,
            explode_timer: 0.0,
            restart_armed: false,
            events: Scheduler::new(),
            time: 0.0,
            rng: Pcg32::seed_from_u64(seed),
        };
        state.seed_backdrop();
        state
    }

    pub fn target_backdrop_count(&self) -> usize {
        ((self.width * self.height / BACKDROP_AREA_PER_NODE) as usize).max(MIN_BACKDROP_NODES)
    }

    fn seed_backdrop(&mut self) {
        self.backdrop.clear();
        self.backdrop_edges.clear();
        let count = self.target_backdrop_count();
        for _ in 0..count {
            let pos = Vec2::new(
                self.rng.random_range(0.0..self.width),
                self.rng.random_range(0.0..self.height),
            );
            // Backdrop drift: up to 0.2 px/frame per axis at 60 Hz
            let vel = Vec2::new(
                self.rng.random_range(-12.0..12.0),
                self.rng.random_range(-12.0..12.0),
            );
            let size = self.rng.random_range(0.7..2.5);
            let cyan = self.rng.random_bool(0.5);
            self.backdrop.push(BackdropNode {
                pos,
                vel,
                size,
                cyan,
            });
        }
    }

    /// Reset round state: player, pipes, score, timer. Best score and the
    /// backdrop survive.
    pub fn reset_round(&mut self) {
        self.player = Player {
            pos: Vec2::new(self.width * 0.25, self.height * 0.5),
            radius: FLAPPY_PLAYER_RADIUS,
            vy: 0.0,
        };
        self.pipes.clear();
        self.particles.clear();
        self.pipe_timer = FLAPPY_PIPE_INTERVAL;
        self.score = 0;
        self.explode_timer = 0.0;
        self.restart_armed = false;
        self.events.clear();
    }

    /// Resize: reseed the backdrop and restart the round in Ready
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.seed_backdrop();
        self.reset_round();
        self.phase = GamePhase::Ready;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_round_keeps_best_score() {
        let mut state = FlappyState::new(1, 800.0, 480.0);
        state.score = 7;
        state.best_score = 7;
        state.pipes.push(Pipe {
            x: 100.0,
            width: 60.0,
            gap_y: 100.0,
            gap_h: 150.0,
            speed: 220.0,
            scored: true,
        });
        state.reset_round();
        assert_eq!(state.score, 0);
        assert_eq!(state.best_score, 7);
        assert!(state.pipes.is_empty());
        assert_eq!(state.player.vy, 0.0);
    }

    #[test]
    fn test_backdrop_count_floor() {
        let state = FlappyState::new(2, 200.0, 150.0);
        assert_eq!(state.backdrop.len(), MIN_BACKDROP_NODES);
    }

    #[test]
    fn test_resize_returns_to_ready() {
        let mut state = FlappyState::new(3, 800.0, 480.0);
        state.phase = GamePhase::Playing;
        state.resize(1024.0, 600.0);
        assert_eq!(state.phase, GamePhase::Ready);
        assert_eq!(state.player.pos.x, 256.0);
    }
}
