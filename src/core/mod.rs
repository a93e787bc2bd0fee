//! Core simulation plumbing shared by every gameplay module.
pub mod plugin;
pub mod rng;

pub use plugin::{CorePlugin, SimulationClock};
pub use rng::SimRng;
