//! Rescue Grid Core - exploration and coordination engine.
//!
//! This crate contains the algorithmic heart of the rescue simulation:
//! a ground-truth grid world, per-agent partial-knowledge maps, frontier
//! breadth-first search, and the per-tick agent decision state machine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 SimulationDriver (rescue_sim)        │
//! │                                                      │
//! │  ┌───────────┐        ┌───────────┐                  │
//! │  │  Agent #1 │  ...   │  Agent #N │  one move/tick   │
//! │  └─────┬─────┘        └─────┬─────┘                  │
//! │        │ sense / rescue     │                        │
//! │  ┌─────▼─────────────────────▼─────┐                 │
//! │  │        GridWorld (ground truth)  │                 │
//! │  └──────────────────────────────────┘                 │
//! │        ▲                                             │
//! │  ┌─────┴─────┐                                       │
//! │  │ KnownMap  │  shared or per-agent                  │
//! │  └───────────┘                                       │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Agents perceive only their occupied cell and its 4-neighborhood. What
//! they have seen accumulates in a [`KnownMap`]; unexplored territory is
//! reached by BFS to the nearest still-unknown cell ([`frontier_path`]).

mod agent;
mod error;
mod grid;
mod known;
mod search;

pub use agent::{Agent, AgentAction};
pub use error::GridError;
pub use grid::{CellState, GridWorld, Pos};
pub use known::{KnownMap, SharedKnownMap};
pub use search::frontier_path;
