//! Error types for the core engine.

use crate::grid::Pos;
use thiserror::Error;

/// Errors raised by grid and agent operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// Coordinate outside the grid. All coordinate generation in the core
    /// is bounds-checked before use, so hitting this indicates a logic
    /// defect in the caller.
    #[error("position {pos} outside {rows}x{cols} grid")]
    OutOfBounds { pos: Pos, rows: usize, cols: usize },

    /// An operation applied to a cell in the wrong state, e.g. clearing a
    /// target on a non-target cell. Fails loudly rather than being ignored.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}
