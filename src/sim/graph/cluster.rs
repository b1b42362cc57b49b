//! Rainbow cluster lifecycle
//!
//! A cluster replicates members around its parent until it hits capacity,
//! matures for a fixed delay, then ruptures: every node it owned reverts to
//! the ordinary color scheme and is thrown outward with a transient drag
//! state. A cluster whose parent vanishes early is discarded quietly.

use glam::Vec2;
use rand::Rng;

use super::state::{
    CLUSTER_CAPACITY, GraphState, NodeId, RUPTURE_DELAY, RUPTURE_SPEED_MAX, RUPTURE_SPEED_MIN,
    RainbowCluster, RainbowState, REPLICATE_INTERVAL, SPAWN_RING_MAX, SPAWN_RING_MIN,
    TransientKind, TransientState,
};
use crate::dir_to;

/// Start a cluster rooted at an existing rainbow node
pub fn found_cluster(state: &mut GraphState, parent: NodeId) {
    let id = state.next_cluster_id();
    if let Some(node) = state.node_mut(parent) {
        match node.rainbow.as_mut() {
            Some(r) => r.cluster = id,
            None => node.rainbow = Some(RainbowState { cluster: id, hue: 0.0 }),
        }
    } else {
        return;
    }
    state.clusters.push(RainbowCluster {
        id,
        parent,
        members: Vec::new(),
        capacity: CLUSTER_CAPACITY,
        replicate_timer: REPLICATE_INTERVAL,
        rupture_timer: None,
    });
}

/// Advance every cluster by one tick
pub fn update(state: &mut GraphState, dt: f32) {
    let mut idx = 0;
    while idx < state.clusters.len() {
        // Structural revalidation first: stale ids are pruned before any
        // decision is made on them.
        let parent = state.clusters[idx].parent;
        let parent_alive = state.node(parent).is_some();
        {
            let live: Vec<NodeId> = state.clusters[idx]
                .members
                .iter()
                .copied()
                .filter(|&m| state.node(m).is_some())
                .collect();
            state.clusters[idx].members = live;
        }

        if !parent_alive {
            discard_orphan(state, idx);
            continue;
        }

        let at_capacity = state.clusters[idx].members.len() >= state.clusters[idx].capacity;
        if !at_capacity {
            state.clusters[idx].rupture_timer = None;
            state.clusters[idx].replicate_timer -= dt;
            if state.clusters[idx].replicate_timer <= 0.0 {
                state.clusters[idx].replicate_timer = REPLICATE_INTERVAL;
                replicate(state, idx);
            }
            idx += 1;
            continue;
        }

        // Maturing: capacity reached, rupture delay counting down
        let timer = state.clusters[idx]
            .rupture_timer
            .get_or_insert(RUPTURE_DELAY);
        *timer -= dt;
        if *timer <= 0.0 {
            rupture(state, idx);
            // cluster removed; do not advance idx
        } else {
            idx += 1;
        }
    }
}

/// Spawn one member near the parent, inside the spawn annulus, clamped to
/// canvas bounds
fn replicate(state: &mut GraphState, idx: usize) {
    let cluster_id = state.clusters[idx].id;
    let parent = state.clusters[idx].parent;
    let Some(parent_node) = state.node(parent) else {
        return;
    };
    let origin = parent_node.pos;

    let angle = state.rng.random_range(0.0..std::f32::consts::TAU);
    let ring = state.rng.random_range(SPAWN_RING_MIN..SPAWN_RING_MAX);
    let mut pos = origin + Vec2::new(angle.cos(), angle.sin()) * ring;
    pos.x = pos.x.clamp(0.0, state.width);
    pos.y = pos.y.clamp(0.0, state.height);

    let drift = state.rng.random_range(0.0..std::f32::consts::TAU);
    let speed = state.rng.random_range(4.0..12.0);
    let vel = Vec2::new(drift.cos(), drift.sin()) * speed;
    let hue = state.rng.random_range(0.0..1.0);

    let id = state.spawn_node(
        pos,
        vel,
        Some(RainbowState {
            cluster: cluster_id,
            hue,
        }),
        None,
    );
    state.clusters[idx].members.push(id);
}

/// Terminal event: throw parent and members outward as ordinary nodes
fn rupture(state: &mut GraphState, idx: usize) {
    let cluster = state.clusters.remove(idx);
    let origin = state
        .node(cluster.parent)
        .map(|n| n.pos)
        .unwrap_or(Vec2::new(state.width / 2.0, state.height / 2.0));

    let mut burst: Vec<NodeId> = cluster.members;
    burst.push(cluster.parent);

    for id in burst {
        let speed = state.rng.random_range(RUPTURE_SPEED_MIN..RUPTURE_SPEED_MAX);
        let jitter: f32 = state.rng.random_range(-0.4..0.4);
        if let Some(node) = state.node_mut(id) {
            let mut out = dir_to(origin, node.pos);
            if out == Vec2::ZERO {
                // The parent sits at the origin itself; pick any direction
                out = Vec2::new(jitter.cos(), jitter.sin());
            }
            let angle = out.y.atan2(out.x) + jitter;
            node.vel = Vec2::new(angle.cos(), angle.sin()) * speed;
            node.rainbow = None;
            node.transient = Some(TransientState {
                kind: TransientKind::Ruptured,
            });
        }
    }
}

/// Parent abducted before maturity: members revert quietly, no explosion
fn discard_orphan(state: &mut GraphState, idx: usize) {
    let cluster = state.clusters.remove(idx);
    for id in cluster.members {
        if let Some(node) = state.node_mut(id) {
            node.rainbow = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_state() -> GraphState {
        let mut state = GraphState::new(42, 800.0, 600.0);
        state.nodes.clear();
        state.clusters.clear();
        state.ufo.pos = Vec2::new(1e6, 1e6);
        state
    }

    fn seed_parent(state: &mut GraphState) -> NodeId {
        let id = state.spawn_node(
            Vec2::new(400.0, 300.0),
            Vec2::ZERO,
            Some(RainbowState { cluster: 0, hue: 0.0 }),
            None,
        );
        found_cluster(state, id);
        id
    }

    #[test]
    fn test_cluster_replicates_to_capacity_and_never_beyond() {
        let mut state = quiet_state();
        seed_parent(&mut state);

        let dt = 0.1;
        for _ in 0..400 {
            update(&mut state, dt);
            let cluster = state.clusters.first();
            if let Some(c) = cluster {
                assert!(c.members.len() <= c.capacity);
            } else {
                break; // ruptured
            }
        }
    }

    #[test]
    fn test_rupture_fires_exactly_once_and_clears_tags() {
        let mut state = quiet_state();
        let parent = seed_parent(&mut state);

        // Fill to capacity manually
        for _ in 0..CLUSTER_CAPACITY {
            replicate(&mut state, 0);
        }
        assert_eq!(state.clusters[0].members.len(), CLUSTER_CAPACITY);

        // Run out the rupture delay
        let mut ticks_with_cluster = 0;
        for _ in 0..100 {
            if state.clusters.is_empty() {
                break;
            }
            ticks_with_cluster += 1;
            update(&mut state, 0.1);
        }
        assert!(state.clusters.is_empty(), "cluster must rupture");
        assert!(ticks_with_cluster > 1, "rupture waits out the delay");

        // Everything reverted to ordinary, thrown outward with drag pending
        for node in &state.nodes {
            assert!(node.rainbow.is_none());
            assert!(matches!(
                node.transient,
                Some(TransientState {
                    kind: TransientKind::Ruptured
                })
            ));
            assert!(node.vel.length() >= RUPTURE_SPEED_MIN - 1.0);
        }
        assert!(state.node(parent).is_some());
    }

    #[test]
    fn test_orphan_cluster_discarded_without_rupture() {
        let mut state = quiet_state();
        let parent = seed_parent(&mut state);
        replicate(&mut state, 0);
        replicate(&mut state, 0);
        let member_count = state.clusters[0].members.len();
        assert_eq!(member_count, 2);

        state.remove_node(parent);
        update(&mut state, 0.016);

        assert!(state.clusters.is_empty());
        for node in &state.nodes {
            assert!(node.rainbow.is_none());
            assert!(node.transient.is_none(), "orphan cleanup must not explode");
        }
    }

    #[test]
    fn test_members_spawn_within_bounds() {
        let mut state = quiet_state();
        let parent = seed_parent(&mut state);
        if let Some(n) = state.node_mut(parent) {
            n.pos = Vec2::new(2.0, 2.0); // corner parent forces clamping
        }
        for _ in 0..CLUSTER_CAPACITY {
            replicate(&mut state, 0);
        }
        for node in &state.nodes {
            assert!(node.pos.x >= 0.0 && node.pos.x <= state.width);
            assert!(node.pos.y >= 0.0 && node.pos.y <= state.height);
        }
    }

    #[test]
    fn test_vanished_member_is_pruned() {
        let mut state = quiet_state();
        seed_parent(&mut state);
        replicate(&mut state, 0);
        let member = state.clusters[0].members[0];
        state.remove_node(member);
        update(&mut state, 0.016);
        assert!(!state.clusters.is_empty());
        assert!(!state.clusters[0].members.contains(&member));
    }
}
