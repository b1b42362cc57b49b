//! Deterministic simulation module
//!
//! All per-frame logic lives here. This module must stay pure and
//! deterministic:
//! - Seeded RNG only (stored inside each scene state)
//! - Variable timestep, clamped by the caller to `consts::MAX_FRAME_DT`
//! - No rendering or platform dependencies
//!
//! Three scenes share the same shape: a state struct holding the entity
//! store, and a `tick(state, input, dt)` entry point that mutates it.

pub mod events;
pub mod flappy;
pub mod graph;
pub mod loader;

pub use events::Scheduler;
pub use flappy::{FlappyInput, FlappyState, GamePhase};
pub use graph::{GraphInput, GraphState};
pub use loader::LoaderScene;
