//! Ground-truth grid world.
//!
//! The [`GridWorld`] is the authoritative view of the map: occupancy,
//! obstacles, and the registry of uncleared targets. Agents only ever see
//! it through their one-hop sensing window (see [`crate::Agent`]).

use crate::error::GridError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// State of a single grid cell.
///
/// `GridWorld` cells are always `Free | Obstacle | Target`. `Unknown` and
/// `Traversed` exist only inside a [`crate::KnownMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// Not yet revealed to the owning agent
    Unknown,

    /// Visited by the owning agent
    Traversed,

    /// Open floor
    Free,

    /// Impassable wall, immutable for the simulation's lifetime
    Obstacle,

    /// An uncleared rescue target
    Target,
}

/// A `(row, col)` grid coordinate, row-major, 0-indexed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The 4-neighborhood of `pos` in fixed Up, Down, Left, Right order,
/// filtered to the `rows x cols` bounds.
///
/// Every neighbor scan in the engine goes through this function so that
/// expansion order is identical everywhere it matters (BFS tie-breaking).
pub(crate) fn neighbors4(pos: Pos, rows: usize, cols: usize) -> Vec<Pos> {
    let mut out = Vec::with_capacity(4);
    if pos.row > 0 {
        out.push(Pos::new(pos.row - 1, pos.col));
    }
    if pos.row + 1 < rows {
        out.push(Pos::new(pos.row + 1, pos.col));
    }
    if pos.col > 0 {
        out.push(Pos::new(pos.row, pos.col - 1));
    }
    if pos.col + 1 < cols {
        out.push(Pos::new(pos.row, pos.col + 1));
    }
    out
}

/// Authoritative grid state plus the registry of uncleared targets.
#[derive(Debug, Clone)]
pub struct GridWorld {
    rows: usize,
    cols: usize,
    cells: Vec<CellState>,
    targets: BTreeSet<Pos>,
}

impl GridWorld {
    /// Builds a world from a row-major cell array.
    ///
    /// Rejects dimension/length mismatches and any cell carrying a
    /// knowledge-only state (`Unknown`/`Traversed`). The target registry is
    /// derived from the `Target` cells.
    pub fn from_cells(
        rows: usize,
        cols: usize,
        cells: Vec<CellState>,
    ) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 || cells.len() != rows * cols {
            return Err(GridError::InvalidOperation(format!(
                "cell array of length {} does not fill a {}x{} grid",
                cells.len(),
                rows,
                cols
            )));
        }

        let mut targets = BTreeSet::new();
        for (i, cell) in cells.iter().enumerate() {
            let pos = Pos::new(i / cols, i % cols);
            match cell {
                CellState::Target => {
                    targets.insert(pos);
                }
                CellState::Free | CellState::Obstacle => {}
                CellState::Unknown | CellState::Traversed => {
                    return Err(GridError::InvalidOperation(format!(
                        "ground-truth cell {pos} holds knowledge-only state {cell:?}"
                    )));
                }
            }
        }

        Ok(Self {
            rows,
            cols,
            cells,
            targets,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    fn index(&self, pos: Pos) -> Result<usize, GridError> {
        if self.in_bounds(pos) {
            Ok(pos.row * self.cols + pos.col)
        } else {
            Err(GridError::OutOfBounds {
                pos,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// Returns the ground-truth state of the cell at `pos`.
    pub fn cell_at(&self, pos: Pos) -> Result<CellState, GridError> {
        Ok(self.cells[self.index(pos)?])
    }

    /// Clears the target at `pos`: the cell becomes `Free` and the position
    /// leaves the registry. The only mutation permitted after construction.
    pub fn clear_target(&mut self, pos: Pos) -> Result<(), GridError> {
        let idx = self.index(pos)?;
        if self.cells[idx] != CellState::Target {
            return Err(GridError::InvalidOperation(format!(
                "cell {pos} holds no target to clear"
            )));
        }
        self.cells[idx] = CellState::Free;
        self.targets.remove(&pos);
        Ok(())
    }

    /// Number of uncleared targets.
    pub fn targets_remaining(&self) -> usize {
        self.targets.len()
    }

    /// Positions of all uncleared targets, in row-major order.
    pub fn target_positions(&self) -> Vec<Pos> {
        self.targets.iter().copied().collect()
    }

    /// In-bounds 4-neighbors of `pos` (Up, Down, Left, Right order).
    pub fn neighbors4(&self, pos: Pos) -> Vec<Pos> {
        neighbors4(pos, self.rows, self.cols)
    }
}
