//! Rescue Grid Simulation Harness
//!
//! Drives the `rescue_core` engine: loads (or generates) a binary map,
//! builds the world and its agents, and runs the synchronous tick loop
//! until every target is rescued, a tick cap is hit, or a cooperative stop
//! is requested.
//!
//! One tick = one render frame, then one move per agent in stable order,
//! then the termination check. The ordering never varies between ticks, so
//! a run is fully reproducible from its seed and map.

mod driver;
mod generator;
mod loader;
mod render;

pub use driver::{KnowledgeMode, SimConfig, SimOutcome, SimulationDriver};
pub use generator::{generate, GenError, GenParams};
pub use loader::{MapError, MapFile};
pub use render::{NullRenderer, Renderer, TextRenderer};
