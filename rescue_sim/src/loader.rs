//! Binary map file format.
//!
//! Layout: byte 0 = rows, byte 1 = cols (each 1..=255), followed by exactly
//! `rows * cols` row-major cell codes as signed bytes:
//! `0 = free, 1 = obstacle, 2 = target, 3 = robot start`.

use rescue_core::{CellState, GridError, GridWorld, Pos};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

pub const CODE_FREE: i8 = 0;
pub const CODE_OBSTACLE: i8 = 1;
pub const CODE_TARGET: i8 = 2;
pub const CODE_ROBOT_START: i8 = 3;

/// Errors surfaced before simulation setup begins. The core never
/// partially initialises from bad data.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("map I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("map header missing (file shorter than 2 bytes)")]
    MissingHeader,

    #[error("map dimensions {rows}x{cols} contain a zero")]
    ZeroDimension { rows: u8, cols: u8 },

    #[error("map body holds {found} cells, expected {expected}")]
    CellCount { expected: usize, found: usize },

    #[error("invalid cell code {code} at {pos}")]
    InvalidCode { code: i8, pos: Pos },

    #[error("grid construction failed: {0}")]
    Grid(#[from] GridError),
}

/// A decoded map file: dimensions plus raw cell codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapFile {
    pub rows: u8,
    pub cols: u8,
    pub codes: Vec<i8>,
}

impl MapFile {
    /// Reads and validates a map file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let bytes = fs::read(path.as_ref())?;
        if bytes.len() < 2 {
            return Err(MapError::MissingHeader);
        }

        let rows = bytes[0];
        let cols = bytes[1];
        if rows == 0 || cols == 0 {
            return Err(MapError::ZeroDimension { rows, cols });
        }

        let expected = rows as usize * cols as usize;
        let body = &bytes[2..];
        if body.len() != expected {
            return Err(MapError::CellCount {
                expected,
                found: body.len(),
            });
        }

        let codes: Vec<i8> = body.iter().map(|&b| b as i8).collect();
        for (i, &code) in codes.iter().enumerate() {
            if !(CODE_FREE..=CODE_ROBOT_START).contains(&code) {
                return Err(MapError::InvalidCode {
                    code,
                    pos: Pos::new(i / cols as usize, i % cols as usize),
                });
            }
        }

        info!(rows, cols, "loaded map");
        Ok(Self { rows, cols, codes })
    }

    /// Writes the binary format.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), MapError> {
        let mut bytes = Vec::with_capacity(2 + self.codes.len());
        bytes.push(self.rows);
        bytes.push(self.cols);
        bytes.extend(self.codes.iter().map(|&c| c as u8));
        fs::write(path.as_ref(), bytes)?;
        Ok(())
    }

    /// Decodes into a ground-truth world plus agent start positions.
    ///
    /// Robot-start markers exist only in the file: those cells enter the
    /// world as `Free`, with their positions returned separately.
    pub fn into_world(self) -> Result<(GridWorld, Vec<Pos>), MapError> {
        let cols = self.cols as usize;
        let mut starts = Vec::new();
        let mut cells = Vec::with_capacity(self.codes.len());

        for (i, &code) in self.codes.iter().enumerate() {
            let pos = Pos::new(i / cols, i % cols);
            let state = match code {
                CODE_FREE => CellState::Free,
                CODE_OBSTACLE => CellState::Obstacle,
                CODE_TARGET => CellState::Target,
                CODE_ROBOT_START => {
                    starts.push(pos);
                    CellState::Free
                }
                other => return Err(MapError::InvalidCode { code: other, pos }),
            };
            cells.push(state);
        }

        let world = GridWorld::from_cells(self.rows as usize, cols, cells)?;
        Ok((world, starts))
    }
}
