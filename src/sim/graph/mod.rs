//! Node-graph background scene
//!
//! Drifting neon nodes connected by proximity edges, haunted by a single
//! UFO that abducts nodes, warps around the canvas, and periodically
//! discharges replicating rainbow clusters.

pub mod cluster;
pub mod state;
pub mod tick;
pub mod ufo;

pub use state::{
    Beam, ChargeState, ColorTag, Edge, GraphState, Node, NodeId, RainbowCluster, RainbowState,
    TransientKind, TransientState, Ufo, WarpEffect, WarpPhase,
};
pub use tick::{GraphInput, tick};
