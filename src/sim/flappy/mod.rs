//! Flappy Node - the neon arcade game behind the secret code
//!
//! Gravity integration, a pipe spawner with a mild difficulty ramp,
//! circle/gap collision, scoring, and a particle explosion on death, over
//! the same neon node backdrop the rest of the site uses.

pub mod state;
pub mod tick;

pub use state::{BackdropNode, FlappyState, GamePhase, Particle, Pipe, Player};
pub use tick::{FlappyInput, tick};
