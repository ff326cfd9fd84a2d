//! Frame rendering.
//!
//! Renderers receive shared references only - a frame must never mutate
//! core state.

use rescue_core::{Agent, CellState, GridWorld};
use std::io::{self, Write};
use tracing::warn;

/// Per-tick view of the simulation. Invoked once per tick by the driver.
pub trait Renderer {
    fn frame(&mut self, world: &GridWorld, agents: &[Agent], tick: u64);
}

/// Renderer for headless runs and tests.
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn frame(&mut self, _world: &GridWorld, _agents: &[Agent], _tick: u64) {}
}

/// ASCII frame writer.
///
/// Ground truth draws obstacles (`#`) and uncleared targets (`*`); the
/// first agent's knowledge map overlays what the team has seen so far:
/// visited cells (`o`), revealed free ground (`.`), unexplored (`?`).
/// Agents draw as `R` on top of everything.
pub struct TextRenderer<W: Write> {
    out: W,
}

impl TextRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn write_frame(
        &mut self,
        world: &GridWorld,
        agents: &[Agent],
        tick: u64,
    ) -> io::Result<()> {
        writeln!(self.out, "tick {tick} | targets left {}", world.targets_remaining())?;

        let known = agents.first().map(|a| a.known().lock().unwrap().clone());

        for row in 0..world.rows() {
            for col in 0..world.cols() {
                let pos = rescue_core::Pos::new(row, col);
                let glyph = if agents.iter().any(|a| a.pos() == pos) {
                    'R'
                } else {
                    match world.cell_at(pos) {
                        Ok(CellState::Obstacle) => '#',
                        Ok(CellState::Target) => '*',
                        _ => match known.as_ref().map(|k| k.state_at(pos)) {
                            Some(CellState::Traversed) => 'o',
                            Some(CellState::Free) => '.',
                            _ => '?',
                        },
                    }
                };
                write!(self.out, "{glyph}")?;
            }
            writeln!(self.out)?;
        }
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn frame(&mut self, world: &GridWorld, agents: &[Agent], tick: u64) {
        if let Err(e) = self.write_frame(world, agents, tick) {
            warn!("frame write failed: {e}");
        }
    }
}
