//! Graph scene tick
//!
//! Per-tick order: node motion, edge derivation, cluster lifecycle, UFO
//! behavior. Rendering reads the result and mutates nothing.

use glam::Vec2;

use super::state::{
    GraphState, NODE_AMBIENT_SPEED, NODE_SPEED_MAX, NODE_SPEED_MIN, TRANSIENT_DRAG,
};
use super::{cluster, ufo};
use crate::consts::{GRAPH_EDGE_DIST, MAX_FRAME_DT, WRAP_BUFFER};
use crate::{safe_dist, wrap_coord};
use rand::Rng;

/// Host inputs for one tick
#[derive(Debug, Clone, Default)]
pub struct GraphInput {
    /// Pointer position in canvas coordinates, if hovering
    pub pointer: Option<Vec2>,
}

/// Advance the scene by `dt` seconds (clamped to the frame maximum)
pub fn tick(state: &mut GraphState, input: &GraphInput, dt: f32) {
    let dt = dt.min(MAX_FRAME_DT);
    state.time += dt;

    update_nodes(state, input, dt);
    rebuild_edges(state, input);
    cluster::update(state, dt);
    if state.ufo_enabled {
        ufo::update(state, dt);
    }
}

/// Drift, random walk, transient drag, pulse, and edge wrap
fn update_nodes(state: &mut GraphState, input: &GraphInput, dt: f32) {
    let (w, h) = (state.width, state.height);
    let beam_target = state.ufo.beam.as_ref().map(|b| b.target);

    for node in &mut state.nodes {
        let held = beam_target == Some(node.id);

        // Random walk keeps the drift from looking mechanical: up to
        // 0.25 px/frame at the reference 60 Hz, expressed as a velocity kick.
        if !held {
            let kick = 15.0 * dt;
            node.vel.x += state.rng.random_range(-kick..=kick);
            node.vel.y += state.rng.random_range(-kick..=kick);
        }

        match node.transient {
            Some(_) => {
                // Exponential drag until the node settles back to ambient
                node.vel *= (-TRANSIENT_DRAG * dt).exp();
                if node.vel.length() <= NODE_AMBIENT_SPEED {
                    node.transient = None;
                }
            }
            None if !held => {
                let speed = node.vel.length();
                if speed > NODE_SPEED_MAX {
                    node.vel = node.vel.normalize_or_zero() * NODE_SPEED_MAX;
                } else if speed < NODE_SPEED_MIN {
                    // Re-kick stalled nodes in a random direction
                    let angle = state.rng.random_range(0.0..std::f32::consts::TAU);
                    node.vel = Vec2::new(angle.cos(), angle.sin()) * NODE_SPEED_MIN;
                }
            }
            None => {}
        }

        node.pos += node.vel * dt;

        // Pointer repulsion acts on position directly. The held node is
        // exempt - the beam owns its motion.
        if !held && let Some(p) = input.pointer {
            let d = safe_dist(node.pos, p);
            if d < GRAPH_EDGE_DIST {
                let away = (node.pos - p) / d;
                let force = (GRAPH_EDGE_DIST - d) * 1.8 * dt;
                node.pos += away * force;
            }
        }

        node.pos.x = wrap_coord(node.pos.x, w, WRAP_BUFFER);
        node.pos.y = wrap_coord(node.pos.y, h, WRAP_BUFFER);

        node.pulse_phase += node.pulse_speed * dt;
    }
}

/// Derive the proximity edge set and per-node glow.
///
/// Edges are an unordered-pair set: each (i, j) with i < j is considered
/// exactly once, so the result contains no self-pairs and no duplicates.
fn rebuild_edges(state: &mut GraphState, input: &GraphInput) {
    state.edges.clear();

    for node in &mut state.nodes {
        node.glow = 0.0;
    }

    for i in 0..state.nodes.len() {
        for j in (i + 1)..state.nodes.len() {
            let (a, b) = (&state.nodes[i], &state.nodes[j]);
            let d = a.pos.distance(b.pos);
            if d < GRAPH_EDGE_DIST {
                let intensity = 1.0 - d / GRAPH_EDGE_DIST;
                let edge = super::state::Edge {
                    a: a.id,
                    b: b.id,
                    from: a.pos,
                    to: b.pos,
                    intensity,
                };
                state.edges.push(edge);
                state.nodes[i].glow = state.nodes[i].glow.max(intensity);
                state.nodes[j].glow = state.nodes[j].glow.max(intensity);
            }
        }
    }

    // The pointer lights nearby nodes up like another node would
    if let Some(p) = input.pointer {
        for node in &mut state.nodes {
            let d = node.pos.distance(p);
            if d < GRAPH_EDGE_DIST {
                node.glow = node.glow.max(1.0 - d / GRAPH_EDGE_DIST);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::WRAP_BUFFER;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_nodes_stay_within_wrap_bounds() {
        let mut state = GraphState::new(11, 640.0, 480.0);
        let input = GraphInput::default();
        for _ in 0..600 {
            tick(&mut state, &input, DT);
            for node in &state.nodes {
                assert!(node.pos.x >= -WRAP_BUFFER && node.pos.x <= state.width + WRAP_BUFFER);
                assert!(node.pos.y >= -WRAP_BUFFER && node.pos.y <= state.height + WRAP_BUFFER);
                assert!(node.pos.is_finite());
            }
        }
    }

    #[test]
    fn test_wrap_reappears_on_opposite_side() {
        let mut state = GraphState::new(1, 400.0, 300.0);
        state.nodes.truncate(1);
        state.ufo.pos = Vec2::new(1e6, 1e6); // keep the UFO out of the way
        let node = &mut state.nodes[0];
        node.pos = Vec2::new(400.0 + WRAP_BUFFER - 0.5, 150.0);
        node.vel = Vec2::new(NODE_SPEED_MAX * 10.0, 0.0); // force the crossing
        node.transient = Some(super::super::state::TransientState {
            kind: super::super::state::TransientKind::Launched,
        });
        tick(&mut state, &GraphInput::default(), DT);
        assert!((state.nodes[0].pos.x - -WRAP_BUFFER).abs() < 1e-3);
    }

    #[test]
    fn test_edges_symmetric_no_self_no_duplicates() {
        let mut state = GraphState::new(5, 500.0, 400.0);
        tick(&mut state, &GraphInput::default(), DT);

        let mut seen = std::collections::HashSet::new();
        for edge in &state.edges {
            assert_ne!(edge.a, edge.b);
            let key = (edge.a.min(edge.b), edge.a.max(edge.b));
            assert!(seen.insert(key), "duplicate unordered pair {key:?}");
        }

        // Every close pair is present, every far pair absent
        for i in 0..state.nodes.len() {
            for j in (i + 1)..state.nodes.len() {
                let a = &state.nodes[i];
                let b = &state.nodes[j];
                let d = a.pos.distance(b.pos);
                let key = (a.id.min(b.id), a.id.max(b.id));
                assert_eq!(d < GRAPH_EDGE_DIST, seen.contains(&key));
            }
        }
    }

    #[test]
    fn test_edge_intensity_inverse_to_distance() {
        let mut state = GraphState::new(1, 400.0, 300.0);
        state.nodes.truncate(2);
        state.clusters.clear();
        state.nodes[0].pos = Vec2::new(100.0, 100.0);
        state.nodes[1].pos = Vec2::new(130.0, 100.0);
        state.nodes[0].vel = Vec2::ZERO;
        state.nodes[1].vel = Vec2::ZERO;
        rebuild_edges(&mut state, &GraphInput::default());
        assert_eq!(state.edges.len(), 1);
        let want = 1.0 - 30.0 / GRAPH_EDGE_DIST;
        assert!((state.edges[0].intensity - want).abs() < 1e-5);
    }

    #[test]
    fn test_pointer_repels_nearby_node() {
        let mut state = GraphState::new(2, 400.0, 300.0);
        state.nodes.truncate(1);
        state.nodes[0].pos = Vec2::new(200.0, 150.0);
        state.nodes[0].vel = Vec2::ZERO;
        state.ufo.pos = Vec2::new(1e6, 1e6);
        let input = GraphInput {
            pointer: Some(Vec2::new(195.0, 150.0)),
        };
        tick(&mut state, &input, DT);
        assert!(state.nodes[0].pos.x > 200.0 - 1.0);
        assert!(state.nodes[0].glow > 0.9);
    }
}
