//! Simulation driver: setup, tick loop, termination, outcome reporting.

use crate::render::Renderer;
use rescue_core::{Agent, AgentAction, GridError, GridWorld, KnownMap, Pos};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How agents pool what they learn about the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KnowledgeMode {
    /// One knowledge map referenced by every agent; any discovery is
    /// instantly visible to the whole team.
    Shared,

    /// Each agent builds a private map from its own sensing only.
    Independent,
}

impl KnowledgeMode {
    pub fn name(&self) -> &'static str {
        match self {
            KnowledgeMode::Shared => "shared",
            KnowledgeMode::Independent => "independent",
        }
    }
}

impl fmt::Display for KnowledgeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for KnowledgeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "shared" | "coop" => Ok(KnowledgeMode::Shared),
            "independent" | "single" => Ok(KnowledgeMode::Independent),
            other => Err(format!("unknown knowledge mode: {other}")),
        }
    }
}

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Master seed; all agent randomness derives from it
    pub seed: u64,

    /// Safety cap so adversarial maps (a walled-off target) terminate
    /// with a report instead of looping forever
    pub max_ticks: u64,

    /// Knowledge-sharing mode
    pub knowledge: KnowledgeMode,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_ticks: 10_000,
            knowledge: KnowledgeMode::Shared,
        }
    }
}

/// Result of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct SimOutcome {
    /// Ticks elapsed when the run ended
    pub ticks: u64,

    /// Targets cleared during the run
    pub rescued: usize,

    /// Targets still on the grid (unreachable, or the run was cut short)
    pub unrescued: Vec<Pos>,

    /// True when every target was cleared
    pub completed: bool,
}

/// Owns the world, the agents, and the tick loop.
pub struct SimulationDriver {
    config: SimConfig,
    world: GridWorld,
    agents: Vec<Agent>,
    ticks: u64,
    rescued: usize,
}

impl SimulationDriver {
    /// Builds the driver from a decoded map.
    ///
    /// Derives one knowledge map (shared mode) or one per agent
    /// (independent mode), then spawns an agent per start position. Agent
    /// RNG seeds are derived from the master seed and agent index so the
    /// run is reproducible and agents do not share a random stream.
    pub fn new(
        world: GridWorld,
        starts: Vec<Pos>,
        config: SimConfig,
    ) -> Result<Self, GridError> {
        let team_map = match config.knowledge {
            KnowledgeMode::Shared => Some(KnownMap::shared(world.rows(), world.cols())),
            KnowledgeMode::Independent => None,
        };

        let mut agents = Vec::with_capacity(starts.len());
        for (id, start) in starts.into_iter().enumerate() {
            let known = match &team_map {
                Some(shared) => Arc::clone(shared),
                None => KnownMap::shared(world.rows(), world.cols()),
            };
            let rng_seed =
                config.seed.wrapping_mul(0x9e3779b97f4a7c15) ^ (id as u64);
            agents.push(Agent::new(id, start, known, rng_seed, &world)?);
        }

        info!(
            agents = agents.len(),
            targets = world.targets_remaining(),
            mode = %config.knowledge,
            "simulation ready"
        );

        Ok(Self {
            config,
            world,
            agents,
            ticks: 0,
            rescued: 0,
        })
    }

    pub fn world(&self) -> &GridWorld {
        &self.world
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advances one tick: render frame, then one move per agent in stable
    /// index order. The ordering is fixed for reproducibility.
    pub fn tick(&mut self, renderer: &mut dyn Renderer) -> Result<(), GridError> {
        renderer.frame(&self.world, &self.agents, self.ticks);

        for agent in &mut self.agents {
            match agent.step(&mut self.world)? {
                AgentAction::Rescued(pos) => {
                    self.rescued += 1;
                    info!(agent = agent.id(), %pos, tick = self.ticks, "target rescued");
                }
                AgentAction::Moved => {}
                AgentAction::Waited => {
                    debug!(agent = agent.id(), tick = self.ticks, "no move available");
                }
            }
        }

        self.ticks += 1;
        Ok(())
    }

    /// Runs until the target registry empties, the tick cap is reached, or
    /// the cooperative stop flag is raised (checked once per tick).
    pub fn run(
        &mut self,
        renderer: &mut dyn Renderer,
        stop: &AtomicBool,
    ) -> Result<SimOutcome, GridError> {
        loop {
            if self.world.targets_remaining() == 0 {
                info!(ticks = self.ticks, "all targets rescued");
                break;
            }
            if self.ticks >= self.config.max_ticks {
                warn!(
                    ticks = self.ticks,
                    unrescued = self.world.targets_remaining(),
                    "tick cap reached with targets remaining"
                );
                break;
            }
            if stop.load(Ordering::Relaxed) {
                info!(ticks = self.ticks, "stop requested");
                break;
            }
            self.tick(renderer)?;
        }

        let unrescued = self.world.target_positions();
        Ok(SimOutcome {
            ticks: self.ticks,
            rescued: self.rescued,
            completed: unrescued.is_empty(),
            unrescued,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::NullRenderer;
    use proptest::prelude::*;
    use rescue_core::CellState;

    fn world_with(rows: usize, cols: usize, targets: &[Pos], walls: &[Pos]) -> GridWorld {
        let mut cells = vec![CellState::Free; rows * cols];
        for t in targets {
            cells[t.row * cols + t.col] = CellState::Target;
        }
        for w in walls {
            cells[w.row * cols + w.col] = CellState::Obstacle;
        }
        GridWorld::from_cells(rows, cols, cells).unwrap()
    }

    fn run_driver(mut driver: SimulationDriver) -> SimOutcome {
        driver
            .run(&mut NullRenderer, &AtomicBool::new(false))
            .unwrap()
    }

    #[test]
    fn test_open_grid_single_agent_rescues_lone_target() {
        let world = world_with(5, 5, &[Pos::new(4, 4)], &[]);
        let config = SimConfig {
            max_ticks: 2000,
            ..Default::default()
        };
        let driver =
            SimulationDriver::new(world, vec![Pos::new(0, 0)], config).unwrap();

        let outcome = run_driver(driver);

        assert!(outcome.completed);
        assert!(outcome.unrescued.is_empty());
        assert_eq!(outcome.rescued, 1);
        // Manhattan lower bound: the rescue move itself is the 8th step
        assert!(outcome.ticks >= 8, "finished in {} ticks", outcome.ticks);
    }

    #[test]
    fn test_enclosed_target_reports_unrescued() {
        // Target at (2,2) walled off on all four sides
        let world = world_with(
            5,
            5,
            &[Pos::new(2, 2)],
            &[
                Pos::new(1, 2),
                Pos::new(3, 2),
                Pos::new(2, 1),
                Pos::new(2, 3),
            ],
        );
        let config = SimConfig {
            max_ticks: 300,
            ..Default::default()
        };
        let driver =
            SimulationDriver::new(world, vec![Pos::new(0, 0)], config).unwrap();

        let outcome = run_driver(driver);

        assert!(!outcome.completed);
        assert_eq!(outcome.unrescued, vec![Pos::new(2, 2)]);
        assert_eq!(outcome.ticks, 300, "run must stop at the cap, not hang");
    }

    #[test]
    fn test_shared_mode_uses_one_map() {
        let world = world_with(4, 4, &[], &[]);
        let driver = SimulationDriver::new(
            world,
            vec![Pos::new(0, 0), Pos::new(3, 3)],
            SimConfig::default(),
        )
        .unwrap();

        let [a, b] = driver.agents() else { panic!() };
        assert!(Arc::ptr_eq(a.known(), b.known()));
    }

    #[test]
    fn test_independent_mode_uses_private_maps() {
        let world = world_with(4, 4, &[], &[]);
        let config = SimConfig {
            knowledge: KnowledgeMode::Independent,
            ..Default::default()
        };
        let driver = SimulationDriver::new(
            world,
            vec![Pos::new(0, 0), Pos::new(3, 3)],
            config,
        )
        .unwrap();

        let [a, b] = driver.agents() else { panic!() };
        assert!(!Arc::ptr_eq(a.known(), b.known()));
    }

    #[test]
    fn test_shared_discovery_visible_to_teammate() {
        // Agent 0 spawns next to the target and reveals it at setup; agent 1
        // has never been near it but reads it from the shared map.
        let world = world_with(5, 5, &[Pos::new(0, 1)], &[]);
        let driver = SimulationDriver::new(
            world,
            vec![Pos::new(0, 0), Pos::new(4, 4)],
            SimConfig::default(),
        )
        .unwrap();

        let teammate = &driver.agents()[1];
        assert_eq!(
            teammate.known().lock().unwrap().state_at(Pos::new(0, 1)),
            CellState::Target
        );
    }

    #[test]
    fn test_no_targets_terminates_immediately() {
        let world = world_with(3, 3, &[], &[]);
        let driver =
            SimulationDriver::new(world, vec![Pos::new(1, 1)], SimConfig::default())
                .unwrap();

        let outcome = run_driver(driver);

        assert!(outcome.completed);
        assert_eq!(outcome.ticks, 0);
    }

    #[test]
    fn test_stop_flag_halts_run() {
        let world = world_with(5, 5, &[Pos::new(4, 4)], &[]);
        let mut driver =
            SimulationDriver::new(world, vec![Pos::new(0, 0)], SimConfig::default())
                .unwrap();

        let stop = AtomicBool::new(true);
        let outcome = driver.run(&mut NullRenderer, &stop).unwrap();

        assert!(!outcome.completed);
        assert_eq!(outcome.ticks, 0);
        assert_eq!(outcome.unrescued, vec![Pos::new(4, 4)]);
    }

    #[test]
    fn test_identical_seed_identical_run() {
        let run = |seed: u64| {
            let world = world_with(6, 6, &[Pos::new(5, 5), Pos::new(0, 5)], &[]);
            let config = SimConfig {
                seed,
                max_ticks: 1000,
                ..Default::default()
            };
            let mut driver = SimulationDriver::new(
                world,
                vec![Pos::new(0, 0), Pos::new(5, 0)],
                config,
            )
            .unwrap();
            let outcome = driver
                .run(&mut NullRenderer, &AtomicBool::new(false))
                .unwrap();
            let positions: Vec<Pos> = driver.agents().iter().map(|a| a.pos()).collect();
            (outcome.ticks, positions)
        };

        assert_eq!(run(42), run(42));
    }

    #[test]
    fn test_generated_map_pipeline() {
        // generate -> decode -> run: must always terminate with a report,
        // whether or not the random layout left every target reachable.
        let map = crate::generate(&crate::GenParams {
            rows: 10,
            cols: 10,
            obstacles: 20,
            targets: 5,
            robots: 2,
            seed: 42,
        })
        .unwrap();
        let (world, starts) = map.into_world().unwrap();

        let config = SimConfig {
            max_ticks: 5000,
            ..Default::default()
        };
        let driver = SimulationDriver::new(world, starts, config).unwrap();
        let outcome = run_driver(driver);

        assert_eq!(outcome.rescued + outcome.unrescued.len(), 5);
        assert!(outcome.ticks <= 5000);
    }

    proptest! {
        /// Any open map with a reachable layout terminates within the cap
        /// and knowledge only ever grows.
        #[test]
        fn prop_run_terminates_with_monotone_knowledge(
            rows in 3usize..8,
            cols in 3usize..8,
            seed in 0u64..1000,
        ) {
            // Open grid, one target in the far corner, agent in the near one
            let target = Pos::new(rows - 1, cols - 1);
            let world = world_with(rows, cols, &[target], &[]);
            let config = SimConfig { seed, max_ticks: 20_000, ..Default::default() };
            let mut driver =
                SimulationDriver::new(world, vec![Pos::new(0, 0)], config).unwrap();

            let mut last_unknown = usize::MAX;
            let mut renderer = NullRenderer;
            while driver.world().targets_remaining() > 0
                && driver.ticks() < driver.config.max_ticks
            {
                driver.tick(&mut renderer).unwrap();
                let unknown = driver.agents()[0]
                    .known()
                    .lock()
                    .unwrap()
                    .unknown_remaining();
                prop_assert!(unknown <= last_unknown, "knowledge regressed");
                last_unknown = unknown;
            }

            prop_assert_eq!(driver.world().targets_remaining(), 0);
        }
    }
}
