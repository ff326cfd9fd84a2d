//! Partial-knowledge map built up by agent sensing.

use crate::grid::{neighbors4, CellState, Pos};
use std::sync::{Arc, Mutex};

/// Handle to a knowledge map.
///
/// Under shared-knowledge mode every agent holds a clone of the same
/// handle, so any agent's discovery is instantly visible to all; under
/// independent mode each agent gets its own instance. The `Mutex` keeps
/// the shared case safe should the driver ever move agents off-thread.
pub type SharedKnownMap = Arc<Mutex<KnownMap>>;

/// What an agent (or a team of agents) has learned about the grid.
///
/// Every cell starts `Unknown`. Cells are revealed by copying ground truth
/// when adjacent to a visited cell, and become `Traversed` when occupied.
/// Knowledge is monotone: once a cell leaves `Unknown` it never reverts.
#[derive(Debug, Clone)]
pub struct KnownMap {
    rows: usize,
    cols: usize,
    cells: Vec<CellState>,
}

impl KnownMap {
    /// Creates an all-`Unknown` map of the given dimensions.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![CellState::Unknown; rows * cols],
        }
    }

    /// Creates an Arc-wrapped map for sharing between agents.
    pub fn shared(rows: usize, cols: usize) -> SharedKnownMap {
        Arc::new(Mutex::new(Self::new(rows, cols)))
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn index(&self, pos: Pos) -> usize {
        debug_assert!(
            pos.row < self.rows && pos.col < self.cols,
            "known-map access at {pos} outside {}x{}",
            self.rows,
            self.cols
        );
        pos.row * self.cols + pos.col
    }

    /// Returns the known state of `pos`.
    pub fn state_at(&self, pos: Pos) -> CellState {
        self.cells[self.index(pos)]
    }

    /// Records the ground-truth state of a newly sighted cell.
    ///
    /// Writes only if the cell is still `Unknown`; a second reveal is a
    /// no-op, not an error.
    pub fn reveal(&mut self, pos: Pos, true_state: CellState) {
        let idx = self.index(pos);
        if self.cells[idx] == CellState::Unknown {
            self.cells[idx] = true_state;
        }
    }

    /// Marks `pos` as visited. Traversal dominates any prior reveal.
    pub fn mark_traversed(&mut self, pos: Pos) {
        let idx = self.index(pos);
        self.cells[idx] = CellState::Traversed;
    }

    /// In-bounds 4-neighbors of `pos` (Up, Down, Left, Right order).
    pub fn neighbors4(&self, pos: Pos) -> Vec<Pos> {
        neighbors4(pos, self.rows, self.cols)
    }

    /// Number of cells still `Unknown`. Coverage metric for reporting.
    pub fn unknown_remaining(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| **c == CellState::Unknown)
            .count()
    }
}
