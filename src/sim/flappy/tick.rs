//! Flappy game tick
//!
//! Phase machine: Ready -> Playing -> Exploding -> GameOver -> Playing.
//! Tuning: gravity 1400 px/s², flap impulse -420 px/s, pipes every 1.6 s at
//! 220 px/s plus 5 px/s per score point capped at +200.

use glam::Vec2;
use rand::Rng;

use super::state::{
    BackdropEdge, EXPLOSION_DURATION, EXPLOSION_PARTICLES, FlappyState, GamePhase, PARTICLE_DRAG,
    PARTICLE_GRAVITY, Particle, Pipe, RESTART_DEBOUNCE,
};
use crate::consts::{
    BACKDROP_EDGE_DIST, FLAPPY_FLAP_VY, FLAPPY_GRAVITY, FLAPPY_PIPE_INTERVAL, FLAPPY_PIPE_WIDTH,
    MAX_FRAME_DT,
};

/// One-shot events for this scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartEvent {
    /// GameOver has settled; the restart input is now accepted
    ArmRestart,
}

/// Host inputs for one tick. The exit action is not represented here - it
/// goes straight to the host callback in the app layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlappyInput {
    /// Flap (keyboard or pointer press)
    pub flap: bool,
}

/// Advance the game by `dt` seconds (clamped to the frame maximum)
pub fn tick(state: &mut FlappyState, input: &FlappyInput, dt: f32) {
    let dt = dt.min(MAX_FRAME_DT);
    state.time += dt;

    update_backdrop(state, dt);

    match state.phase {
        GamePhase::Ready => {
            if input.flap {
                // The first flap both starts the round and counts as a flap
                state.phase = GamePhase::Playing;
                state.player.vy = FLAPPY_FLAP_VY;
            }
        }
        GamePhase::Playing => update_playing(state, input, dt),
        GamePhase::Exploding => {
            update_particles(state, dt);
            state.explode_timer -= dt;
            if state.explode_timer <= 0.0 || state.particles.is_empty() {
                state.phase = GamePhase::GameOver;
                state.restart_armed = false;
                state
                    .events
                    .schedule(state.time + RESTART_DEBOUNCE, RestartEvent::ArmRestart);
            }
        }
        GamePhase::GameOver => {
            update_particles(state, dt);
            for event in state.events.due(state.time) {
                match event {
                    RestartEvent::ArmRestart => state.restart_armed = true,
                }
            }
            if input.flap && state.restart_armed {
                state.reset_round();
                state.phase = GamePhase::Playing;
            }
        }
    }
}

fn update_playing(state: &mut FlappyState, input: &FlappyInput, dt: f32) {
    // A flap replaces the vertical velocity outright, never adds to it
    if input.flap {
        state.player.vy = FLAPPY_FLAP_VY;
    }
    state.player.vy += FLAPPY_GRAVITY * dt;
    state.player.pos.y += state.player.vy * dt;

    // Spawner
    state.pipe_timer -= dt;
    if state.pipe_timer <= 0.0 {
        spawn_pipe(state);
        state.pipe_timer = FLAPPY_PIPE_INTERVAL;
    }

    for pipe in &mut state.pipes {
        pipe.x -= pipe.speed * dt;
    }

    // Spawn order equals left-to-right position order; removal below relies
    // on it, so the invariant is stated rather than assumed
    debug_assert!(
        state.pipes.windows(2).all(|w| w[0].x <= w[1].x + 1.0),
        "pipes must stay ordered oldest-first / leftmost-first"
    );

    // Purge fully off-screen pipes, oldest first
    while state
        .pipes
        .first()
        .is_some_and(|p| p.right() < 0.0)
    {
        state.pipes.remove(0);
    }

    // Scoring: once, the first tick the trailing edge passes the player
    let player_x = state.player.pos.x;
    let mut scored = 0;
    for pipe in &mut state.pipes {
        if !pipe.scored && pipe.right() < player_x {
            pipe.scored = true;
            scored += 1;
        }
    }
    state.score += scored;
    state.best_score = state.best_score.max(state.score);

    // Collision. Exact tangency is not a collision: the player dies only on
    // strict overlap past a bound or pipe edge.
    let p = state.player;
    let out_of_bounds = p.pos.y - p.radius < 0.0 || p.pos.y + p.radius > state.height;
    let hit_pipe = state.pipes.iter().any(|pipe| circle_hits_pipe(&p, pipe));
    if out_of_bounds || hit_pipe {
        explode(state);
    }
}

/// Strict-overlap test against one pipe pair
fn circle_hits_pipe(player: &super::state::Player, pipe: &Pipe) -> bool {
    let in_x = player.pos.x + player.radius > pipe.x && player.pos.x - player.radius < pipe.right();
    if !in_x {
        return false;
    }
    // Tangent-inclusive gap: resting exactly on an edge is still safe, the
    // same convention the canvas bounds use
    let in_gap = player.pos.y - player.radius >= pipe.gap_y
        && player.pos.y + player.radius <= pipe.gap_y + pipe.gap_h;
    !in_gap
}

fn spawn_pipe(state: &mut FlappyState) {
    let gap_h = (state.height * 0.25).clamp(120.0, 220.0);
    let min_y = 80.0;
    let max_y = (state.height - 80.0 - gap_h).max(min_y);
    let gap_y = state.rng.random_range(min_y..=max_y);
    let speed = 220.0 + (state.score as f32 * 5.0).min(200.0);
    state.pipes.push(Pipe {
        x: state.width + FLAPPY_PIPE_WIDTH,
        width: FLAPPY_PIPE_WIDTH,
        gap_y,
        gap_h,
        speed,
        scored: false,
    });
}

/// Death: freeze gameplay and burst into particles
fn explode(state: &mut FlappyState) {
    state.phase = GamePhase::Exploding;
    state.explode_timer = EXPLOSION_DURATION;
    let origin = state.player.pos;
    for _ in 0..EXPLOSION_PARTICLES {
        let angle = state.rng.random_range(0.0..std::f32::consts::TAU);
        let speed = state.rng.random_range(60.0..320.0);
        let lifetime = state.rng.random_range(0.5..1.1);
        let size = state.rng.random_range(1.5..3.5);
        state.particles.push(Particle {
            pos: origin,
            vel: Vec2::new(angle.cos(), angle.sin()) * speed,
            age: 0.0,
            lifetime,
            size,
        });
    }
    log::debug!("player down at score {}", state.score);
}

fn update_particles(state: &mut FlappyState, dt: f32) {
    for particle in &mut state.particles {
        particle.vel.y += PARTICLE_GRAVITY * dt;
        particle.vel *= (-PARTICLE_DRAG * dt).exp();
        particle.pos += particle.vel * dt;
        particle.age += dt;
    }
    state.particles.retain(|p| p.age < p.lifetime);
}

/// Backdrop drift: clamp-and-bounce at the canvas edges, then re-derive the
/// proximity edges (symmetric, no self-pairs, no duplicates)
fn update_backdrop(state: &mut FlappyState, dt: f32) {
    let (w, h) = (state.width, state.height);
    for node in &mut state.backdrop {
        node.pos += node.vel * dt;
        if node.pos.x < 0.0 {
            node.pos.x = 0.0;
            node.vel.x = -node.vel.x;
        } else if node.pos.x > w {
            node.pos.x = w;
            node.vel.x = -node.vel.x;
        }
        if node.pos.y < 0.0 {
            node.pos.y = 0.0;
            node.vel.y = -node.vel.y;
        } else if node.pos.y > h {
            node.pos.y = h;
            node.vel.y = -node.vel.y;
        }
    }

    state.backdrop_edges.clear();
    for i in 0..state.backdrop.len() {
        for j in (i + 1)..state.backdrop.len() {
            let a = state.backdrop[i].pos;
            let b = state.backdrop[j].pos;
            let d = a.distance(b);
            if d < BACKDROP_EDGE_DIST {
                state.backdrop_edges.push(BackdropEdge {
                    from: a,
                    to: b,
                    opacity: (BACKDROP_EDGE_DIST - d) / BACKDROP_EDGE_DIST * 0.28,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 120.0;

    fn playing_state() -> FlappyState {
        let mut state = FlappyState::new(7, 800.0, 480.0);
        state.phase = GamePhase::Playing;
        state
    }

    fn run_seconds(state: &mut FlappyState, input: &FlappyInput, seconds: f32) {
        let steps = (seconds / DT).round() as usize;
        for _ in 0..steps {
            tick(state, input, DT);
        }
    }

    #[test]
    fn test_gravity_integration_from_rest() {
        let mut state = playing_state();
        state.pipe_timer = f32::MAX; // no pipes in this test
        let y0 = state.player.pos.y;
        let input = FlappyInput::default();

        let t = 0.25_f32; // short enough not to hit the floor
        run_seconds(&mut state, &input, t);

        let v_expect = FLAPPY_GRAVITY * t;
        let y_expect = y0 + 0.5 * FLAPPY_GRAVITY * t * t;
        assert!((state.player.vy - v_expect).abs() < 1e-2);
        // Semi-implicit Euler overshoots analytic position by at most g*t*dt
        assert!((state.player.pos.y - y_expect).abs() <= FLAPPY_GRAVITY * t * DT + 1e-2);
    }

    #[test]
    fn test_flap_replaces_velocity() {
        let mut state = playing_state();
        state.pipe_timer = f32::MAX;
        state.player.vy = 500.0;
        tick(&mut state, &FlappyInput { flap: true }, DT);
        // Replaced, then one gravity step applied
        assert!((state.player.vy - (FLAPPY_FLAP_VY + FLAPPY_GRAVITY * DT)).abs() < 1e-3);
    }

    #[test]
    fn test_first_flap_starts_round() {
        let mut state = FlappyState::new(1, 800.0, 480.0);
        assert_eq!(state.phase, GamePhase::Ready);
        tick(&mut state, &FlappyInput::default(), DT);
        assert_eq!(state.phase, GamePhase::Ready);
        tick(&mut state, &FlappyInput { flap: true }, DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.player.vy < 0.0, "first flap is consumed as a flap");
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let mut state = playing_state();
        state.pipe_timer = f32::MAX;
        state.pipes.push(Pipe {
            x: state.player.pos.x - 100.0,
            width: FLAPPY_PIPE_WIDTH,
            gap_y: 0.0,
            gap_h: state.height, // whole column is gap: no collision
            speed: 0.0,          // stays put left of the player
            scored: false,
        });
        for _ in 0..50 {
            state.player.vy = 0.0; // hold the player aloft
            state.player.pos.y = state.height / 2.0;
            tick(&mut state, &FlappyInput::default(), DT);
        }
        assert_eq!(state.score, 1, "a pipe scores exactly once");
        assert_eq!(state.best_score, 1);
    }

    #[test]
    fn test_pipes_purged_oldest_first() {
        let mut state = playing_state();
        state.pipe_timer = f32::MAX;
        for i in 0..3 {
            state.pipes.push(Pipe {
                x: -200.0 + i as f32 * 300.0,
                width: FLAPPY_PIPE_WIDTH,
                gap_y: 0.0,
                gap_h: state.height,
                speed: 0.0,
                scored: true,
            });
        }
        state.player.pos.y = state.height / 2.0;
        state.player.vy = 0.0;
        tick(&mut state, &FlappyInput::default(), DT);
        assert_eq!(state.pipes.len(), 2);
        assert!(state.pipes.iter().all(|p| p.right() >= 0.0));
    }

    #[test]
    fn test_tangent_contact_is_not_a_collision() {
        let mut state = playing_state();
        state.pipe_timer = f32::MAX;

        // Exactly radius-tangent to the floor
        state.player.pos.y = state.height - state.player.radius;
        state.player.vy = 0.0;
        let p = state.player;
        assert!(!(p.pos.y + p.radius > state.height));

        // Tangent to a pipe's gap edge
        let pipe = Pipe {
            x: p.pos.x - 10.0,
            width: FLAPPY_PIPE_WIDTH,
            gap_y: p.pos.y - p.radius,
            gap_h: 2.0 * p.radius,
            speed: 0.0,
            scored: false,
        };
        assert!(!circle_hits_pipe(&p, &pipe), "tangency must not kill");

        // One pixel past the edge does
        let mut inside = p;
        inside.pos.y += 1.0;
        assert!(circle_hits_pipe(&inside, &pipe));
    }

    #[test]
    fn test_pipe_gap_always_fits_on_screen() {
        let mut state = playing_state();
        for _ in 0..40 {
            spawn_pipe(&mut state);
        }
        for pipe in &state.pipes {
            assert!(pipe.gap_y >= 80.0 - 1e-3);
            assert!(pipe.gap_y + pipe.gap_h <= state.height - 80.0 + 1e-3);
        }
    }

    #[test]
    fn test_difficulty_ramp_is_capped() {
        let mut state = playing_state();
        state.score = 1000;
        spawn_pipe(&mut state);
        assert!((state.pipes[0].speed - 420.0).abs() < 1e-3);
    }

    #[test]
    fn test_scenario_a_no_input_dies_then_game_over() {
        let mut state = FlappyState::new(9, 640.0, 480.0);
        // Consume one flap to leave Ready, as the scenario intends a live run
        tick(&mut state, &FlappyInput { flap: true }, DT);

        let input = FlappyInput::default();
        let mut death_time = None;
        let mut elapsed = DT;
        while elapsed < 5.0 {
            tick(&mut state, &input, DT);
            elapsed += DT;
            if death_time.is_none() && state.phase == GamePhase::Exploding {
                death_time = Some(elapsed);
            }
        }
        let death_time = death_time.expect("death must fire before 5 seconds");
        assert!(death_time < 5.0);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_explosion_runs_down_then_restart_debounced() {
        let mut state = playing_state();
        state.player.pos.y = -100.0; // force immediate death
        tick(&mut state, &FlappyInput::default(), DT);
        assert_eq!(state.phase, GamePhase::Exploding);
        assert_eq!(state.particles.len(), EXPLOSION_PARTICLES);

        run_seconds(&mut state, &FlappyInput::default(), 2.0);
        assert_eq!(state.phase, GamePhase::GameOver);

        // Immediately after arming begins, a flap is still ignored...
        let mut state2 = playing_state();
        state2.best_score = 3;
        state2.player.pos.y = -100.0;
        tick(&mut state2, &FlappyInput::default(), DT);
        run_seconds(&mut state2, &FlappyInput::default(), 1.2);
        assert_eq!(state2.phase, GamePhase::GameOver);
        tick(&mut state2, &FlappyInput { flap: true }, DT);
        if state2.restart_armed {
            // Already armed: the flap restarted the round
            assert_eq!(state2.phase, GamePhase::Playing);
        } else {
            assert_eq!(state2.phase, GamePhase::GameOver);
            // ...and accepted once the debounce has elapsed
            run_seconds(&mut state2, &FlappyInput::default(), RESTART_DEBOUNCE + 0.1);
            tick(&mut state2, &FlappyInput { flap: true }, DT);
            assert_eq!(state2.phase, GamePhase::Playing);
        }
        assert_eq!(state2.score, 0);
        assert_eq!(state2.best_score, 3, "best score survives restart");
    }

    #[test]
    fn test_backdrop_stays_in_bounds_and_edges_valid() {
        let mut state = FlappyState::new(4, 640.0, 480.0);
        let input = FlappyInput::default();
        for _ in 0..600 {
            tick(&mut state, &input, DT);
        }
        for node in &state.backdrop {
            assert!(node.pos.x >= 0.0 && node.pos.x <= state.width);
            assert!(node.pos.y >= 0.0 && node.pos.y <= state.height);
        }
        for edge in &state.backdrop_edges {
            assert!(edge.from.distance(edge.to) < BACKDROP_EDGE_DIST);
            assert!(edge.opacity > 0.0 && edge.opacity <= 0.28);
        }
    }
}
