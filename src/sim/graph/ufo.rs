//! UFO behavior state machine
//!
//! Base states: Patrol (no target) -> Pursuing (target, no beam) ->
//! Extending (beam, not locked) -> Locked (beam pulling the target) -> back
//! to Patrol on success or failure. Warping and Charging overlay the base
//! states, suspend movement and targeting, and are mutually exclusive with
//! beam activity.
//!
//! Fixed per-tick precedence (every guard has exactly one site):
//! 1. structural revalidation of target/beam against the live store
//! 2. warp overlay
//! 3. charge overlay
//! 4. cooldown decay
//! 5. beam update (grace window, lock physics, capture)
//! 6. stalking timeout
//! 7. pursuit patience timeout
//! 8. patrol acquisition, then the idle warp gate
//! 9. movement integration + edge wrap
//! 10. off-screen bookkeeping and the return cooldown

use glam::Vec2;
use rand::Rng;

use super::cluster;
use super::state::*;
use crate::consts::WRAP_BUFFER;
use crate::{dir_to, safe_dist, wrap_coord};

/// Seconds per warp animation phase (out, then in)
const WARP_PHASE_DURATION: f32 = 0.35;

/// Advance the UFO by one tick
pub fn update(state: &mut GraphState, dt: f32) {
    revalidate(state);

    if state.ufo.warp.is_some() {
        update_warp(state, dt);
        return;
    }
    if state.ufo.charge.is_some() {
        update_charge(state, dt);
        return;
    }

    decay_cooldowns(&mut state.ufo, dt);

    if state.ufo.beam.is_some() {
        update_beam(state, dt);
    } else {
        if state.ufo.target.is_none() {
            update_patrol(state, dt);
        }
        if state.ufo.target.is_some() {
            update_pursuit(state, dt);
        }
    }

    if state.ufo.warp.is_none() {
        integrate(state, dt);
    }
    offscreen_bookkeeping(state, dt);

    debug_assert!(
        [
            state.ufo.beam.is_some(),
            state.ufo.warp.is_some(),
            state.ufo.charge.is_some()
        ]
        .iter()
        .filter(|&&x| x)
        .count()
            <= 1,
        "beam/warp/charge must be mutually exclusive"
    );
}

/// Stale references are cleared before anything acts on them
fn revalidate(state: &mut GraphState) {
    if let Some(id) = state.ufo.target
        && state.node(id).is_none()
    {
        state.ufo.target = None;
        state.ufo.beam = None;
        state.ufo.stalk_time = 0.0;
        state.ufo.pursuit_time = 0.0;
    }
    if let Some(beam) = &state.ufo.beam
        && state.node(beam.target).is_none()
    {
        state.ufo.beam = None;
    }
}

fn decay_cooldowns(ufo: &mut Ufo, dt: f32) {
    ufo.capture_cooldown = (ufo.capture_cooldown - dt).max(0.0);
    ufo.warp_cooldown = (ufo.warp_cooldown - dt).max(0.0);
    ufo.return_cooldown = (ufo.return_cooldown - dt).max(0.0);
    ufo.post_warp_hold = (ufo.post_warp_hold - dt).max(0.0);
}

/// Patrol: wander, then try to acquire, then maybe warp out of boredom
fn update_patrol(state: &mut GraphState, dt: f32) {
    let wander = state.rng.random_range(-1.5..1.5) * dt;
    let idle_roll: f32 = state.rng.random_range(0.0..1.0);
    let ufo = &mut state.ufo;

    ufo.idle_time += dt;
    ufo.heading += wander;
    ufo.wobble_phase += 2.0 * dt;

    let mut desired = Vec2::new(ufo.heading.cos(), ufo.heading.sin()) * PATROL_SPEED;
    desired.y += (ufo.wobble_phase * 2.0).sin() * 10.0;
    if ufo.post_warp_hold > 0.0 {
        desired = Vec2::ZERO;
    }
    ufo.vel += (desired - ufo.vel) * (PURSUE_ACCEL * dt).min(1.0);

    // Acquisition: nearest non-rainbow node inside the search band. The
    // minimum-distance guard stops the UFO from flip-flopping on a node it
    // is already on top of. No acquisition while the return cooldown runs.
    if state.ufo.return_cooldown <= 0.0 {
        if let Some(id) = acquire_target(state) {
            let deadline = state
                .rng
                .random_range(PURSUIT_TIMEOUT_MIN..PURSUIT_TIMEOUT_MAX);
            let ufo = &mut state.ufo;
            ufo.target = Some(id);
            ufo.pursuit_time = 0.0;
            ufo.pursuit_deadline = deadline;
            ufo.stalk_time = 0.0;
            ufo.idle_time = 0.0;
            return;
        }
    }

    // Idle warp gate: probabilistic once the minimum idle period is exceeded
    if state.ufo.idle_time > IDLE_WARP_MIN && idle_roll < (IDLE_WARP_RATE * dt).min(1.0) {
        begin_warp(state);
    }
}

fn acquire_target(state: &GraphState) -> Option<NodeId> {
    let pos = state.ufo.pos;
    state
        .nodes
        .iter()
        .filter(|n| !n.is_rainbow())
        .map(|n| (n.id, n.pos.distance(pos)))
        .filter(|&(_, d)| d > MIN_TARGET_DIST && d <= SEARCH_RADIUS)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

/// Pursuing: steer toward the target, start the beam when everything lines
/// up, give up via the stalking or patience timeouts
fn update_pursuit(state: &mut GraphState, dt: f32) {
    let Some(target_id) = state.ufo.target else {
        return;
    };
    let Some(node) = state.node(target_id) else {
        return;
    };
    let (tpos, tvel) = (node.pos, node.vel);

    state.ufo.pursuit_time += dt;
    state.ufo.idle_time = 0.0;
    state.ufo.wobble_phase += 2.0 * dt;

    // Velocity-based steering, never position teleportation. Close in, the
    // target's own velocity is blended in so the pair co-moves smoothly.
    let dist = safe_dist(state.ufo.pos, tpos);
    let mut desired = dir_to(state.ufo.pos, tpos) * PURSUE_SPEED;
    if dist < VEL_MATCH_DIST {
        let t = dist / VEL_MATCH_DIST;
        desired = desired * t + tvel * (1.0 - t);
    }
    let blend = (PURSUE_ACCEL * dt).min(1.0);
    state.ufo.vel += (desired - state.ufo.vel) * blend;

    let anchor = state.ufo.anchor();
    let anchor_dist = anchor.distance(tpos);
    let eligible = anchor_dist < CAPTURE_DIST
        && state.ufo.capture_cooldown <= 0.0
        && state.ufo.return_cooldown <= 0.0
        && in_cone(anchor, tpos)
        && state.in_visible_rect(state.ufo.pos);

    if eligible {
        state.ufo.beam = Some(Beam {
            target: target_id,
            reach: 0.0,
            locked: false,
            align: 0.0,
            grace: BEAM_GRACE,
        });
        state.ufo.stalk_time = 0.0;
        return;
    }

    // Stalking: the target is at hand but the geometry refuses to line up
    if anchor_dist < CAPTURE_DIST * 1.25 {
        state.ufo.stalk_time += dt;
        if state.ufo.stalk_time > STALK_TIMEOUT {
            state.ufo.stalk_time = 0.0;
            if warp_allowed(&state.ufo) {
                begin_warp(state);
            } else {
                drop_target(&mut state.ufo);
            }
            return;
        }
    }

    if state.ufo.pursuit_time > state.ufo.pursuit_deadline {
        drop_target(&mut state.ufo);
    }
}

fn drop_target(ufo: &mut Ufo) {
    ufo.target = None;
    ufo.beam = None;
    ufo.pursuit_time = 0.0;
    ufo.stalk_time = 0.0;
}

/// Beam: extend toward the target, lock, pull, capture
fn update_beam(state: &mut GraphState, dt: f32) {
    let Some(beam) = state.ufo.beam.clone() else {
        return;
    };
    let Some(node) = state.node(beam.target) else {
        return;
    };
    let (tpos, tvel) = (node.pos, node.vel);
    let anchor = state.ufo.anchor();
    let dist = safe_dist(anchor, tpos);

    if !beam.locked {
        // Marginal geometry is tolerated for a short grace window so the
        // beam does not flicker on and off at the cone edge
        let geometry_ok = in_cone(anchor, tpos)
            && dist < CAPTURE_DIST * 1.1
            && state.in_visible_rect(state.ufo.pos);

        let expired = match state.ufo.beam.as_mut() {
            Some(beam_ref) => {
                if geometry_ok {
                    beam_ref.grace = BEAM_GRACE;
                } else {
                    beam_ref.grace -= dt;
                }
                beam_ref.grace <= 0.0
            }
            None => return,
        };
        if expired {
            // Back to Pursuing; the target itself is still valid
            state.ufo.beam = None;
            return;
        }

        // Reach grows proportionally to distance and never exceeds it
        let speed = (dist * BEAM_EXTEND_RATE).max(BEAM_EXTEND_MIN_SPEED);
        if let Some(beam_ref) = state.ufo.beam.as_mut() {
            beam_ref.reach = (beam_ref.reach + speed * dt).min(dist);
            if beam_ref.reach >= dist - LOCK_TOLERANCE {
                beam_ref.locked = true;
            }
        }

        // Keep pace with the target while extending
        let blend = (PURSUE_ACCEL * dt).min(1.0);
        state.ufo.vel += (tvel - state.ufo.vel) * blend;
        return;
    }

    // Locked: the node's velocity is overridden - horizontal spring toward
    // the UFO's x, vertical pull toward the anchor at the extension speed.
    // The UFO itself holds still instead of chasing further.
    let pull_speed = (dist * BEAM_EXTEND_RATE).max(BEAM_EXTEND_MIN_SPEED);
    if let Some(beam_ref) = state.ufo.beam.as_mut() {
        beam_ref.align = (beam_ref.align + dt / ALIGN_TIME).min(1.0);
        beam_ref.reach = beam_ref.reach.min(dist);
    }
    let ufo_x = state.ufo.pos.x;
    if let Some(node) = state.node_mut(beam.target) {
        let spring = -LOCK_SPRING_K * (node.pos.x - ufo_x) - LOCK_SPRING_DAMP * node.vel.x;
        node.vel.x += spring * dt;
        let dy = anchor.y - node.pos.y;
        let step = dy.clamp(-pull_speed * dt, pull_speed * dt);
        node.vel.y = step / dt.max(1e-6);
    }
    state.ufo.vel *= (-LOCK_HOLD_DAMP * dt).exp();

    let node_pos = state.node(beam.target).map(|n| n.pos).unwrap_or(anchor);
    if node_pos.distance(anchor) < CAPTURE_COMPLETE_DIST {
        capture(state, beam.target);
    }
}

/// Capture completion: exactly one node leaves the store, the abduction
/// counter moves by exactly one, and every tenth capture starts a charge
fn capture(state: &mut GraphState, target: NodeId) {
    state.remove_node(target);
    let ufo = &mut state.ufo;
    ufo.abductions += 1;
    ufo.total_abductions += 1;
    ufo.capture_cooldown = CAPTURE_COOLDOWN;
    ufo.beam = None;
    ufo.target = None;
    ufo.pursuit_time = 0.0;
    ufo.stalk_time = 0.0;
    log::debug!("abduction complete (session total {})", ufo.total_abductions);

    if ufo.abductions >= ABDUCTIONS_PER_CHARGE {
        ufo.charge = Some(ChargeState { progress: 0.0 });
    }
}

/// Charging: quadratic intensity ramp with growing jitter, then a fan of
/// rainbow nodes from the anchor
fn update_charge(state: &mut GraphState, dt: f32) {
    let jx = state.rng.random_range(-1.0..1.0);
    let jy = state.rng.random_range(-1.0..1.0);

    let (done, amp) = match state.ufo.charge.as_mut() {
        Some(charge) => {
            charge.progress = (charge.progress + dt / CHARGE_DURATION).min(1.0);
            (charge.progress >= 1.0, CHARGE_JITTER * charge.intensity())
        }
        None => return,
    };

    // Positional jitter grows with the quadratic intensity ramp
    state.ufo.pos += Vec2::new(jx, jy) * amp * dt * 10.0;
    state.ufo.vel = Vec2::ZERO;

    if done {
        discharge(state);
    }
}

/// Spawn the rainbow fan and reset the abduction counter
fn discharge(state: &mut GraphState) {
    let anchor = state.ufo.anchor();
    for i in 0..RAINBOW_SPAWN_COUNT {
        let t = i as f32 / (RAINBOW_SPAWN_COUNT - 1) as f32 - 0.5;
        let angle = std::f32::consts::FRAC_PI_2 + t * RAINBOW_FAN_SPREAD;
        let speed = state
            .rng
            .random_range(RAINBOW_LAUNCH_SPEED_MIN..RAINBOW_LAUNCH_SPEED_MAX);
        let vel = Vec2::new(angle.cos(), angle.sin()) * speed;
        let hue = i as f32 / RAINBOW_SPAWN_COUNT as f32;
        let id = state.spawn_node(
            anchor,
            vel,
            Some(RainbowState { cluster: 0, hue }),
            Some(TransientState {
                kind: TransientKind::Launched,
            }),
        );
        cluster::found_cluster(state, id);
    }
    let ufo = &mut state.ufo;
    ufo.charge = None;
    ufo.abductions = 0;
    ufo.capture_cooldown = CAPTURE_COOLDOWN;
    log::debug!("rainbow discharge ({RAINBOW_SPAWN_COUNT} nodes)");
}

fn warp_allowed(ufo: &Ufo) -> bool {
    !ufo.overlay_active() && ufo.warp_cooldown <= 0.0
}

/// Start a teleport to a center-biased destination. Refused while a beam,
/// charge, or another warp is active, or during the inter-warp cooldown.
fn begin_warp(state: &mut GraphState) {
    if !warp_allowed(&state.ufo) {
        return;
    }
    let center = Vec2::new(state.width / 2.0, state.height / 2.0);
    let dest = center
        + Vec2::new(
            state.rng.random_range(-0.25..0.25) * state.width,
            state.rng.random_range(-0.25..0.25) * state.height,
        );
    let ufo = &mut state.ufo;
    ufo.target = None;
    ufo.pursuit_time = 0.0;
    ufo.stalk_time = 0.0;
    ufo.warp = Some(WarpEffect {
        phase: WarpPhase::Out,
        progress: 0.0,
        from: ufo.pos,
        to: dest,
    });
}

/// Out animation -> instant relocation at the midpoint -> in animation
fn update_warp(state: &mut GraphState, dt: f32) {
    enum Step {
        Running,
        Teleport(Vec2),
        Finished,
    }

    let ufo = &mut state.ufo;
    ufo.vel = Vec2::ZERO;
    let step = {
        let Some(warp) = ufo.warp.as_mut() else {
            return;
        };
        warp.progress += dt / WARP_PHASE_DURATION;
        if warp.progress < 1.0 {
            Step::Running
        } else {
            match warp.phase {
                WarpPhase::Out => {
                    warp.phase = WarpPhase::In;
                    warp.progress = 0.0;
                    Step::Teleport(warp.to)
                }
                WarpPhase::In => Step::Finished,
            }
        }
    };

    match step {
        Step::Running => {}
        Step::Teleport(to) => ufo.pos = to,
        Step::Finished => {
            ufo.warp = None;
            ufo.post_warp_hold = POST_WARP_HOLD;
            ufo.warp_cooldown = WARP_COOLDOWN;
            ufo.idle_time = 0.0;
        }
    }
}

fn integrate(state: &mut GraphState, dt: f32) {
    let ufo = &mut state.ufo;
    ufo.pos += ufo.vel * dt;
    ufo.pos.x = wrap_coord(ufo.pos.x, state.width, WRAP_BUFFER);
    ufo.pos.y = wrap_coord(ufo.pos.y, state.height, WRAP_BUFFER);
}

/// Track time spent outside the visible rectangle; auto-return after the
/// limit, and impose the targeting cooldown on every re-entry
fn offscreen_bookkeeping(state: &mut GraphState, dt: f32) {
    let visible = state.in_visible_rect(state.ufo.pos);
    let center = Vec2::new(state.width / 2.0, state.height / 2.0);
    let ufo = &mut state.ufo;
    if visible {
        if ufo.was_offscreen {
            ufo.return_cooldown = RETURN_COOLDOWN;
        }
        ufo.was_offscreen = false;
        ufo.offscreen_time = 0.0;
    } else {
        ufo.was_offscreen = true;
        ufo.offscreen_time += dt;
        if ufo.offscreen_time > OFFSCREEN_LIMIT {
            ufo.pos = (ufo.pos + center * 3.0) / 4.0;
            ufo.vel = Vec2::ZERO;
            ufo.offscreen_time = 0.0;
            ufo.target = None;
            ufo.beam = None;
        }
    }
}

/// Is the point inside the downward abduction cone at the anchor?
fn in_cone(anchor: Vec2, p: Vec2) -> bool {
    let v = p - anchor;
    if v.y <= 0.0 {
        return false;
    }
    v.x.atan2(v.y).abs() <= CONE_HALF_ANGLE
}
