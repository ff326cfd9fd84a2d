//! The rescue agent and its per-tick movement decision state machine.

use crate::error::GridError;
use crate::grid::{CellState, GridWorld, Pos};
use crate::known::SharedKnownMap;
use crate::search::frontier_path;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// What an agent did with its tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentAction {
    /// Stepped to an adjacent cell (exploration, plan-following, or retreat)
    Moved,

    /// Stepped onto a target cell and cleared it
    Rescued(Pos),

    /// No valid action this tick; the agent stayed put. Never an error.
    Waited,
}

/// A single exploring agent.
///
/// Owns its position, an optional queued plan toward a frontier, and a
/// handle to its knowledge map (private or shared with the whole team -
/// the agent's logic is identical either way). Decision tie-breaking uses
/// an agent-local seeded RNG so runs reproduce exactly for a given seed.
pub struct Agent {
    id: usize,
    pos: Pos,
    path: VecDeque<Pos>,
    known: SharedKnownMap,
    rng: ChaCha8Rng,
}

impl Agent {
    /// Creates an agent at `start` and runs its initial sensing pass.
    ///
    /// `rng_seed` should already be derived per-agent from the master seed
    /// (see the driver), so agents do not share or interleave randomness.
    pub fn new(
        id: usize,
        start: Pos,
        known: SharedKnownMap,
        rng_seed: u64,
        world: &GridWorld,
    ) -> Result<Self, GridError> {
        let mut agent = Self {
            id,
            pos: start,
            path: VecDeque::new(),
            known,
            rng: ChaCha8Rng::seed_from_u64(rng_seed),
        };
        agent.sense(world)?;
        Ok(agent)
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    /// Number of queued plan steps (empty when no plan is active).
    pub fn planned_steps(&self) -> usize {
        self.path.len()
    }

    /// The agent's knowledge map handle.
    pub fn known(&self) -> &SharedKnownMap {
        &self.known
    }

    /// Sensing pass: mark the occupied cell traversed, then reveal each
    /// still-unknown 4-neighbor from ground truth. This is the whole
    /// sensing model - one hop ahead, every tick the agent moves.
    pub fn sense(&mut self, world: &GridWorld) -> Result<(), GridError> {
        let mut known = self.known.lock().unwrap();
        known.mark_traversed(self.pos);
        for neighbor in world.neighbors4(self.pos) {
            if known.state_at(neighbor) == CellState::Unknown {
                known.reveal(neighbor, world.cell_at(neighbor)?);
            }
        }
        Ok(())
    }

    /// Takes the agent's one action for this tick.
    ///
    /// Plan-following first; if the plan has gone stale, the agent falls
    /// through to the decision ladder on the same tick. Frontier adoption
    /// (priority 3) executes its first step immediately via an explicit
    /// second phase rather than recursion, so control flow stays bounded.
    pub fn step(&mut self, world: &mut GridWorld) -> Result<AgentAction, GridError> {
        if let Some(next) = self.path.pop_front() {
            if self.follow(next, world)? {
                return Ok(AgentAction::Moved);
            }
        }
        self.decide(world)
    }

    /// Executes one queued plan step. Returns `false` (plan discarded) if
    /// the step is now known to be blocked.
    fn follow(&mut self, next: Pos, world: &GridWorld) -> Result<bool, GridError> {
        let next_state = self.known.lock().unwrap().state_at(next);
        if matches!(next_state, CellState::Obstacle | CellState::Target) {
            self.path.clear();
            return Ok(false);
        }

        self.advance(next, world)?;

        // Lookahead: the upcoming step may have been revealed blocked by the
        // move we just made. Drop it so next tick decides afresh instead of
        // walking into a disallowed cell. Only one step is re-validated.
        if let Some(&upcoming) = self.path.front() {
            let state = self.known.lock().unwrap().state_at(upcoming);
            if matches!(state, CellState::Obstacle | CellState::Target) {
                self.path.pop_front();
            }
        }

        Ok(true)
    }

    /// The four-priority decision ladder.
    fn decide(&mut self, world: &mut GridWorld) -> Result<AgentAction, GridError> {
        let mut options = world.neighbors4(self.pos);
        options.shuffle(&mut self.rng);

        // Priority 1: rescue an adjacent target (ground truth, so a target
        // is never missed just because it has not been revealed yet).
        for &next in &options {
            if world.cell_at(next)? == CellState::Target {
                world.clear_target(next)?;
                self.advance(next, world)?;
                return Ok(AgentAction::Rescued(next));
            }
        }

        // Priority 2: an adjacent cell already revealed free but not yet
        // visited by this agent's map.
        for &next in &options {
            if world.cell_at(next)? == CellState::Free
                && self.known.lock().unwrap().state_at(next) == CellState::Free
            {
                self.advance(next, world)?;
                return Ok(AgentAction::Moved);
            }
        }

        // Priority 3: plan a route to the nearest frontier and take its
        // first step within this same tick. A fresh plan is non-empty, so
        // this is exactly one extra pass through `follow`.
        let plan = {
            let known = self.known.lock().unwrap();
            frontier_path(&known, self.pos)
        };
        if let Some(path) = plan {
            if path.len() > 1 {
                self.path = path.into_iter().skip(1).collect();
                if let Some(next) = self.path.pop_front() {
                    if self.follow(next, world)? {
                        return Ok(AgentAction::Moved);
                    }
                }
            }
        }

        // Priority 4: nothing better to do - retreat to a visited neighbor.
        for &next in &options {
            if self.known.lock().unwrap().state_at(next) == CellState::Traversed {
                self.advance(next, world)?;
                return Ok(AgentAction::Moved);
            }
        }

        Ok(AgentAction::Waited)
    }

    /// Moves to `next` and senses from the new position.
    fn advance(&mut self, next: Pos, world: &GridWorld) -> Result<(), GridError> {
        self.pos = next;
        self.sense(world)
    }
}
