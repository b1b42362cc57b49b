//! Loading-splash spinner scene
//!
//! A pulsing center node with six branches whose lengths chase a sinusoidal
//! target through a spring, tips wobbling on a second harmonic. The spring
//! constants are per-frame values at the reference 60 Hz; the tick scales
//! them by the frame-equivalent of `dt`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::MAX_FRAME_DT;

pub const BRANCH_COUNT: usize = 6;
/// Per-frame spring stiffness and damping at the reference 60 Hz
pub const SPRING_STIFFNESS: f32 = 0.08;
pub const SPRING_DAMPING: f32 = 0.82;

/// One arm of the spinner
#[derive(Debug, Clone)]
pub struct Branch {
    pub angle: f32,
    pub length: f32,
    pub velocity: f32,
    pub target_length: f32,
    pub phase: f32,
    pub phase_speed: f32,
    pub color_phase: f32,
    pub cyan: bool,
    pub tip: Vec2,
    pub tip_radius: f32,
    /// 0.6..1.0, drives the tip color brightness
    pub color_intensity: f32,
}

/// The spinner scene; square canvas, side `size`
#[derive(Debug, Clone)]
pub struct LoaderScene {
    pub size: f32,
    pub center: Vec2,
    pub center_radius: f32,
    pub pulse_phase: f32,
    pub color_phase: f32,
    /// 0.7..1.0, drives the center color brightness
    pub center_intensity: f32,
    pub branches: Vec<Branch>,
    pub running: bool,
    rng: Pcg32,
}

/// One spring step at `frames` frame-equivalents; returns (value, velocity)
pub fn spring_step(
    current: f32,
    target: f32,
    velocity: f32,
    stiffness: f32,
    damping: f32,
    frames: f32,
) -> (f32, f32) {
    let mut velocity = velocity + (target - current) * stiffness * frames;
    velocity *= damping.powf(frames);
    (current + velocity * frames, velocity)
}

impl LoaderScene {
    pub fn new(seed: u64, size: f32) -> Self {
        let mut scene = Self {
            size,
            center: Vec2::splat(size / 2.0),
            center_radius: (size * 0.015).max(8.0),
            pulse_phase: 0.0,
            color_phase: 0.0,
            center_intensity: 1.0,
            branches: Vec::new(),
            running: true,
            rng: Pcg32::seed_from_u64(seed),
        };
        scene.pulse_phase = scene.rng.random_range(0.0..std::f32::consts::TAU);
        scene.color_phase = scene.rng.random_range(0.0..std::f32::consts::TAU);
        scene.seed_branches();
        scene
    }

    fn max_branch_length(&self) -> f32 {
        self.size * 0.2
    }

    fn seed_branches(&mut self) {
        self.branches.clear();
        let step = std::f32::consts::TAU / BRANCH_COUNT as f32;
        for i in 0..BRANCH_COUNT {
            let target_length = self.max_branch_length() * self.rng.random_range(0.85..1.15);
            let phase = self.rng.random_range(0.0..std::f32::consts::TAU);
            let phase_speed = self.rng.random_range(0.012..0.018);
            let color_phase = self.rng.random_range(0.0..std::f32::consts::TAU);
            let tip_radius = (self.size * 0.01).max(5.0) + self.rng.random_range(0.0..2.0);
            self.branches.push(Branch {
                angle: step * i as f32,
                length: 0.0,
                velocity: 0.0,
                target_length,
                phase,
                phase_speed,
                color_phase,
                cyan: i % 2 == 0,
                tip: self.center,
                tip_radius,
                color_intensity: 1.0,
            });
        }
    }

    /// Square canvases only; the host passes min(width, height) * 0.8
    pub fn resize(&mut self, size: f32) {
        self.size = size;
        self.center = Vec2::splat(size / 2.0);
        self.center_radius = (size * 0.015).max(8.0);
        self.seed_branches();
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Advance by `dt` seconds; a stopped scene freezes in place
    pub fn tick(&mut self, dt: f32) {
        if !self.running {
            return;
        }
        let dt = dt.min(MAX_FRAME_DT);
        let frames = dt * 60.0;

        let center = self.center;
        let wobble_amp = self.size * 0.005;
        for branch in &mut self.branches {
            branch.phase += branch.phase_speed * frames;
            branch.color_phase += 0.03 * frames;

            let normalized = (branch.phase.sin() + 1.0) / 2.0;
            let target = normalized * branch.target_length;
            let (length, velocity) = spring_step(
                branch.length,
                target,
                branch.velocity,
                SPRING_STIFFNESS,
                SPRING_DAMPING,
                frames,
            );
            branch.length = length;
            branch.velocity = velocity;

            let wobble = (branch.phase * 2.0).sin() * wobble_amp;
            let reach = branch.length + wobble;
            branch.tip = center + Vec2::new(branch.angle.cos(), branch.angle.sin()) * reach;

            branch.color_intensity = 0.6 + 0.4 * (branch.color_phase.sin() + 1.0) / 2.0;
        }

        self.pulse_phase += 0.04 * frames;
        self.color_phase += 0.025 * frames;
        self.center_intensity = 0.7 + 0.3 * (self.color_phase.sin() + 1.0) / 2.0;
    }

    /// Center radius with the breathing pulse applied
    pub fn pulsed_center_radius(&self) -> f32 {
        self.center_radius * (1.0 + self.pulse_phase.sin() * 0.15)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spring_converges_to_constant_target() {
        let mut value = 0.0;
        let mut velocity = 0.0;
        for _ in 0..600 {
            let (v, vel) = spring_step(value, 100.0, velocity, SPRING_STIFFNESS, SPRING_DAMPING, 1.0);
            value = v;
            velocity = vel;
        }
        assert!((value - 100.0).abs() < 0.5);
        assert!(velocity.abs() < 0.1);
    }

    #[test]
    fn test_branch_lengths_stay_bounded() {
        let mut scene = LoaderScene::new(11, 400.0);
        for _ in 0..1800 {
            scene.tick(1.0 / 60.0);
            for branch in &scene.branches {
                // Spring overshoot never runs away
                assert!(branch.length.abs() < branch.target_length * 2.0 + 1.0);
                assert!(branch.length.is_finite());
            }
        }
    }

    #[test]
    fn test_stop_freezes_the_scene() {
        let mut scene = LoaderScene::new(3, 400.0);
        for _ in 0..60 {
            scene.tick(1.0 / 60.0);
        }
        scene.stop();
        let snapshot: Vec<f32> = scene.branches.iter().map(|b| b.length).collect();
        let pulse = scene.pulse_phase;
        scene.tick(1.0 / 60.0);
        let after: Vec<f32> = scene.branches.iter().map(|b| b.length).collect();
        assert_eq!(snapshot, after);
        assert_eq!(pulse, scene.pulse_phase);
    }

    #[test]
    fn test_branches_evenly_spaced() {
        let scene = LoaderScene::new(5, 400.0);
        assert_eq!(scene.branches.len(), BRANCH_COUNT);
        let step = std::f32::consts::TAU / BRANCH_COUNT as f32;
        for (i, branch) in scene.branches.iter().enumerate() {
            assert!((branch.angle - step * i as f32).abs() < 1e-6);
        }
        assert!(scene.branches.iter().any(|b| b.cyan));
        assert!(scene.branches.iter().any(|b| !b.cyan));
    }
}
