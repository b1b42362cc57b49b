//! Graph scene state and entity types
//!
//! Plain data records grouped into one store. Entities that gain behavior
//! over their lifetime (rainbow membership, post-rupture drag) carry it as
//! explicit optional components, so the valid field set of a node is always
//! statically known.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::{GRAPH_AREA_PER_NODE, WRAP_BUFFER};

pub type NodeId = u32;
pub type ClusterId = u32;

/// Ambient drift speed band for background nodes (px/s)
pub const NODE_SPEED_MIN: f32 = 4.0;
pub const NODE_SPEED_MAX: f32 = 18.0;
/// Reference "settled" speed a transient node decays toward (px/s)
pub const NODE_AMBIENT_SPEED: f32 = 14.0;
/// Minimum node population regardless of canvas area
pub const MIN_NODE_COUNT: usize = 24;

/// UFO sprite half-width; the capture radius and a few render metrics hang
/// off this scale
pub const UFO_SCALE: f32 = 22.0;
/// Beam anchor: fixed row below the sprite center the beam originates from
pub const BEAM_ANCHOR_DY: f32 = 10.0;
/// Node is captured once within this distance of the anchor
pub const CAPTURE_COMPLETE_DIST: f32 = 0.6 * UFO_SCALE;

/// Target acquisition search radius (px)
pub const SEARCH_RADIUS: f32 = 260.0;
/// Anti-oscillation guard: targets closer than this are not acquired
pub const MIN_TARGET_DIST: f32 = 40.0;
/// Beam may start once the target is within this distance of the anchor
pub const CAPTURE_DIST: f32 = 170.0;
/// Abduction cone half-angle, measured from straight down at the anchor
pub const CONE_HALF_ANGLE: f32 = 0.9;

pub const CAPTURE_COOLDOWN: f32 = 2.5;
pub const RETURN_COOLDOWN: f32 = 1.5;
pub const WARP_COOLDOWN: f32 = 9.0;
pub const POST_WARP_HOLD: f32 = 0.8;

/// Pursuit patience window, seconds (randomized per pursuit)
pub const PURSUIT_TIMEOUT_MIN: f32 = 5.0;
pub const PURSUIT_TIMEOUT_MAX: f32 = 8.0;
/// Target known but not capturable for this long -> warp away or drop it
pub const STALK_TIMEOUT: f32 = 3.5;
/// Patrol idle time before the probabilistic warp gate opens
pub const IDLE_WARP_MIN: f32 = 6.0;
/// Probability per second of warping once the idle gate is open
pub const IDLE_WARP_RATE: f32 = 0.25;
/// Sustained off-screen time before the auto-return teleport
pub const OFFSCREEN_LIMIT: f32 = 4.0;

/// Beam reach grows at `distance * BEAM_EXTEND_RATE` px/s, floored
pub const BEAM_EXTEND_RATE: f32 = 2.0;
pub const BEAM_EXTEND_MIN_SPEED: f32 = 60.0;
/// Reach within this of the full distance counts as locked
pub const LOCK_TOLERANCE: f32 = 2.0;
/// Cone/distance violations tolerated for this long while extending
pub const BEAM_GRACE: f32 = 0.3;
/// Seconds for the post-lock alignment ease-in
pub const ALIGN_TIME: f32 = 0.6;

/// Horizontal spring pulling a locked node under the UFO
pub const LOCK_SPRING_K: f32 = 14.0;
pub const LOCK_SPRING_DAMP: f32 = 4.0;
/// Exponential damping rate of the UFO's own velocity while locked
pub const LOCK_HOLD_DAMP: f32 = 6.0;

pub const PATROL_SPEED: f32 = 40.0;
pub const PURSUE_SPEED: f32 = 90.0;
/// Steering blend rate toward the desired velocity (1/s)
pub const PURSUE_ACCEL: f32 = 3.0;
/// Within this distance the target's own velocity is blended in
pub const VEL_MATCH_DIST: f32 = 60.0;

pub const CHARGE_DURATION: f32 = 2.2;
/// Peak positional jitter at full charge intensity (px)
pub const CHARGE_JITTER: f32 = 6.0;
/// Rainbow nodes spawned by one discharge
pub const RAINBOW_SPAWN_COUNT: usize = 5;
/// Fan spread of the discharge, radians, centered straight down
pub const RAINBOW_FAN_SPREAD: f32 = 1.6;
pub const RAINBOW_LAUNCH_SPEED_MIN: f32 = 120.0;
pub const RAINBOW_LAUNCH_SPEED_MAX: f32 = 180.0;
/// Captures per charging cycle
pub const ABDUCTIONS_PER_CHARGE: u32 = 10;

/// Members a cluster replicates up to (parent not counted)
pub const CLUSTER_CAPACITY: usize = 5;
pub const REPLICATE_INTERVAL: f32 = 1.4;
pub const RUPTURE_DELAY: f32 = 2.0;
/// Replicated members spawn inside this annulus around the parent (px)
pub const SPAWN_RING_MIN: f32 = 18.0;
pub const SPAWN_RING_MAX: f32 = 46.0;
pub const RUPTURE_SPEED_MIN: f32 = 260.0;
pub const RUPTURE_SPEED_MAX: f32 = 420.0;
/// Exponential drag rate applied to transient nodes until they settle
pub const TRANSIENT_DRAG: f32 = 3.5;

/// Two-color scheme of ordinary nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTag {
    Cyan,
    Magenta,
}

/// Rainbow membership component
#[derive(Debug, Clone, Copy)]
pub struct RainbowState {
    pub cluster: ClusterId,
    /// Hue offset so cluster members shimmer out of phase
    pub hue: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientKind {
    /// Launched by a charge discharge
    Launched,
    /// Thrown by a cluster rupture
    Ruptured,
}

/// High-velocity component: exponential drag applies until the node decays
/// back to ambient speed, then the component is removed
#[derive(Debug, Clone, Copy)]
pub struct TransientState {
    pub kind: TransientKind,
}

/// A background node
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub color: ColorTag,
    pub pulse_phase: f32,
    pub pulse_speed: f32,
    /// Proximity glow, recomputed every tick from the edge pass
    pub glow: f32,
    pub rainbow: Option<RainbowState>,
    pub transient: Option<TransientState>,
}

impl Node {
    pub fn is_rainbow(&self) -> bool {
        self.rainbow.is_some()
    }
}

/// A proximity edge, derived fresh each tick and never stored across frames
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub a: NodeId,
    pub b: NodeId,
    pub from: Vec2,
    pub to: Vec2,
    /// 1 when touching, 0 at the threshold distance
    pub intensity: f32,
}

/// Abduction beam, owned by the UFO while active
#[derive(Debug, Clone)]
pub struct Beam {
    pub target: NodeId,
    /// Current reach toward the target (px); never exceeds the live distance
    pub reach: f32,
    pub locked: bool,
    /// Post-lock alignment ease, 0..1
    pub align: f32,
    /// Remaining tolerance for cone/distance violations while extending
    pub grace: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarpPhase {
    Out,
    In,
}

/// Teleport effect: out animation, instant relocation at the midpoint,
/// in animation
#[derive(Debug, Clone)]
pub struct WarpEffect {
    pub phase: WarpPhase,
    /// Progress through the current phase, 0..1
    pub progress: f32,
    pub from: Vec2,
    pub to: Vec2,
}

/// Rainbow discharge ramp
#[derive(Debug, Clone)]
pub struct ChargeState {
    /// 0..1; visual intensity is progress squared
    pub progress: f32,
}

impl ChargeState {
    pub fn intensity(&self) -> f32 {
        self.progress * self.progress
    }
}

/// A replicating rainbow cluster
#[derive(Debug, Clone)]
pub struct RainbowCluster {
    pub id: ClusterId,
    pub parent: NodeId,
    pub members: Vec<NodeId>,
    pub capacity: usize,
    pub replicate_timer: f32,
    /// Countdown to rupture once at capacity; None while replicating
    pub rupture_timer: Option<f32>,
}

/// The scene's singleton actor
#[derive(Debug, Clone)]
pub struct Ufo {
    pub pos: Vec2,
    pub vel: Vec2,
    pub target: Option<NodeId>,
    pub beam: Option<Beam>,
    pub warp: Option<WarpEffect>,
    pub charge: Option<ChargeState>,

    pub capture_cooldown: f32,
    pub warp_cooldown: f32,
    pub return_cooldown: f32,
    pub post_warp_hold: f32,

    pub idle_time: f32,
    pub pursuit_time: f32,
    pub pursuit_deadline: f32,
    pub stalk_time: f32,
    pub offscreen_time: f32,
    pub was_offscreen: bool,

    /// Captures since the last discharge (wraps at ABDUCTIONS_PER_CHARGE)
    pub abductions: u32,
    /// Session total, for the curious host
    pub total_abductions: u64,

    /// Patrol wander heading (radians)
    pub heading: f32,
    /// Phase of the patrol bob
    pub wobble_phase: f32,
}

impl Ufo {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            target: None,
            beam: None,
            warp: None,
            charge: None,
            capture_cooldown: 0.0,
            warp_cooldown: 0.0,
            return_cooldown: 0.0,
            post_warp_hold: 0.0,
            idle_time: 0.0,
            pursuit_time: 0.0,
            pursuit_deadline: PURSUIT_TIMEOUT_MIN,
            stalk_time: 0.0,
            offscreen_time: 0.0,
            was_offscreen: false,
            abductions: 0,
            total_abductions: 0,
            heading: 0.0,
            wobble_phase: 0.0,
        }
    }

    /// The beam's origin: a fixed row within the sprite, not the centroid
    pub fn anchor(&self) -> Vec2 {
        self.pos + Vec2::new(0.0, BEAM_ANCHOR_DY)
    }

    /// True while any of the mutually exclusive overlays is running
    pub fn overlay_active(&self) -> bool {
        self.beam.is_some() || self.warp.is_some() || self.charge.is_some()
    }
}

/// Complete graph scene state
#[derive(Debug, Clone)]
pub struct GraphState {
    pub width: f32,
    pub height: f32,
    /// Canvas area per node; the density preset scales it
    pub area_per_node: f32,
    /// The UFO can be switched off entirely by preference
    pub ufo_enabled: bool,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub clusters: Vec<RainbowCluster>,
    pub ufo: Ufo,
    pub rng: Pcg32,
    /// Simulation time, seconds since (re)seed
    pub time: f32,
    next_node_id: NodeId,
    next_cluster_id: ClusterId,
}

impl GraphState {
    /// Create and seed a scene for the given canvas size
    pub fn new(seed: u64, width: f32, height: f32) -> Self {
        Self::with_density(seed, width, height, GRAPH_AREA_PER_NODE)
    }

    /// Same, with an explicit area-per-node divisor
    pub fn with_density(seed: u64, width: f32, height: f32, area_per_node: f32) -> Self {
        let mut state = Self {
            width,
            height,
            area_per_node: area_per_node.max(1.0),
            ufo_enabled: true,
            nodes: Vec::new(),
            edges: Vec::new(),
            clusters: Vec::new(),
            ufo: Ufo::new(Vec2::new(width / 2.0, height / 3.0)),
            rng: Pcg32::seed_from_u64(seed),
            time: 0.0,
            next_node_id: 1,
            next_cluster_id: 1,
        };
        state.seed_nodes();
        state
    }

    /// Node population proportional to canvas area
    pub fn target_node_count(&self) -> usize {
        ((self.width * self.height / self.area_per_node) as usize).max(MIN_NODE_COUNT)
    }

    fn seed_nodes(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.clusters.clear();
        let count = self.target_node_count();
        for _ in 0..count {
            let pos = Vec2::new(
                self.rng.random_range(0.0..self.width),
                self.rng.random_range(0.0..self.height),
            );
            let speed = self.rng.random_range(NODE_SPEED_MIN..NODE_SPEED_MAX);
            let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
            let vel = Vec2::new(angle.cos(), angle.sin()) * speed;
            self.spawn_node(pos, vel, None, None);
        }
    }

    /// Re-derive the store for a new canvas size; the UFO resets with it
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.ufo = Ufo::new(Vec2::new(width / 2.0, height / 3.0));
        self.seed_nodes();
    }

    pub fn next_node_id(&mut self) -> NodeId {
        let id = self.next_node_id;
        self.next_node_id += 1;
        id
    }

    pub fn next_cluster_id(&mut self) -> ClusterId {
        let id = self.next_cluster_id;
        self.next_cluster_id += 1;
        id
    }

    /// Spawn a node; size, color, and pulse parameters are drawn from the RNG
    pub fn spawn_node(
        &mut self,
        pos: Vec2,
        vel: Vec2,
        rainbow: Option<RainbowState>,
        transient: Option<TransientState>,
    ) -> NodeId {
        let id = self.next_node_id();
        let size = self.rng.random_range(1.0..3.0);
        let color = if self.rng.random_bool(0.5) {
            ColorTag::Cyan
        } else {
            ColorTag::Magenta
        };
        let pulse_phase = self.rng.random_range(0.0..std::f32::consts::TAU);
        let pulse_speed = self.rng.random_range(0.6..1.8);
        self.nodes.push(Node {
            id,
            pos,
            vel,
            size,
            color,
            pulse_phase,
            pulse_speed,
            glow: 0.0,
            rainbow,
            transient,
        });
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Remove a node from the store; returns whether it existed
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        self.nodes.len() != before
    }

    /// The strictly visible rectangle, used for beam eligibility - distinct
    /// from the wrap rectangle extended by `WRAP_BUFFER`
    pub fn in_visible_rect(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }

    pub fn in_wrap_rect(&self, p: Vec2) -> bool {
        p.x >= -WRAP_BUFFER
            && p.x <= self.width + WRAP_BUFFER
            && p.y >= -WRAP_BUFFER
            && p.y <= self.height + WRAP_BUFFER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_count_scales_with_area() {
        let small = GraphState::new(1, 300.0, 200.0);
        let large = GraphState::new(1, 1600.0, 900.0);
        assert_eq!(small.nodes.len(), MIN_NODE_COUNT);
        assert_eq!(large.nodes.len(), (1600.0_f32 * 900.0 / 15_000.0) as usize);
        assert!(large.nodes.len() > small.nodes.len());
    }

    #[test]
    fn test_node_ids_are_unique() {
        let state = GraphState::new(7, 800.0, 600.0);
        let mut ids: Vec<_> = state.nodes.iter().map(|n| n.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), state.nodes.len());
    }

    #[test]
    fn test_resize_reseeds_and_resets_ufo() {
        let mut state = GraphState::new(3, 800.0, 600.0);
        state.ufo.abductions = 4;
        state.ufo.target = Some(1);
        state.resize(1200.0, 900.0);
        assert_eq!(state.ufo.abductions, 0);
        assert!(state.ufo.target.is_none());
        assert_eq!(state.nodes.len(), state.target_node_count());
    }

    #[test]
    fn test_visible_vs_wrap_rect() {
        let state = GraphState::new(1, 100.0, 100.0);
        let edge = Vec2::new(-10.0, 50.0);
        assert!(!state.in_visible_rect(edge));
        assert!(state.in_wrap_rect(edge));
        assert!(!state.in_wrap_rect(Vec2::new(-100.0, 50.0)));
    }

    #[test]
    fn test_remove_node() {
        let mut state = GraphState::new(1, 400.0, 400.0);
        let id = state.nodes[0].id;
        assert!(state.remove_node(id));
        assert!(!state.remove_node(id));
        assert!(state.node(id).is_none());
    }
}
