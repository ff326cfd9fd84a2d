//! Random map generation.
//!
//! Places obstacles, targets, and robot starts on an initially free grid by
//! uniform rejection sampling: draw a cell, keep it if still free, repeat.

use crate::loader::{MapFile, CODE_FREE, CODE_OBSTACLE, CODE_ROBOT_START, CODE_TARGET};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Errors from invalid generation parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenError {
    #[error("dimensions {rows}x{cols} outside 1..=255")]
    BadDimensions { rows: usize, cols: usize },

    #[error("{requested} placements requested but the grid has {cells} cells")]
    TooMany { requested: usize, cells: usize },
}

/// Parameters for a generated map.
#[derive(Debug, Clone)]
pub struct GenParams {
    pub rows: usize,
    pub cols: usize,
    pub obstacles: usize,
    pub targets: usize,
    pub robots: usize,
    pub seed: u64,
}

/// Generates a map satisfying `obstacles + targets + robots <= rows * cols`.
pub fn generate(params: &GenParams) -> Result<MapFile, GenError> {
    if !(1..=255).contains(&params.rows) || !(1..=255).contains(&params.cols) {
        return Err(GenError::BadDimensions {
            rows: params.rows,
            cols: params.cols,
        });
    }

    let cells = params.rows * params.cols;
    let requested = params.obstacles + params.targets + params.robots;
    if requested > cells {
        return Err(GenError::TooMany { requested, cells });
    }

    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    let mut codes = vec![CODE_FREE; cells];

    place(&mut codes, &mut rng, params, CODE_OBSTACLE, params.obstacles);
    place(&mut codes, &mut rng, params, CODE_TARGET, params.targets);
    place(&mut codes, &mut rng, params, CODE_ROBOT_START, params.robots);

    Ok(MapFile {
        rows: params.rows as u8,
        cols: params.cols as u8,
        codes,
    })
}

/// Drops `count` markers of `code` onto still-free cells.
fn place(codes: &mut [i8], rng: &mut ChaCha8Rng, params: &GenParams, code: i8, count: usize) {
    let mut placed = 0;
    while placed < count {
        let r = rng.gen_range(0..params.rows);
        let c = rng.gen_range(0..params.cols);
        let idx = r * params.cols + c;
        if codes[idx] == CODE_FREE {
            codes[idx] = code;
            placed += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(codes: &[i8], code: i8) -> usize {
        codes.iter().filter(|&&c| c == code).count()
    }

    #[test]
    fn test_generate_places_exact_counts() {
        let map = generate(&GenParams {
            rows: 10,
            cols: 8,
            obstacles: 15,
            targets: 4,
            robots: 3,
            seed: 42,
        })
        .unwrap();

        assert_eq!(map.codes.len(), 80);
        assert_eq!(count(&map.codes, CODE_OBSTACLE), 15);
        assert_eq!(count(&map.codes, CODE_TARGET), 4);
        assert_eq!(count(&map.codes, CODE_ROBOT_START), 3);
        assert_eq!(count(&map.codes, CODE_FREE), 80 - 22);
    }

    #[test]
    fn test_generate_is_deterministic_per_seed() {
        let params = GenParams {
            rows: 12,
            cols: 12,
            obstacles: 30,
            targets: 5,
            robots: 2,
            seed: 7,
        };

        assert_eq!(generate(&params).unwrap(), generate(&params).unwrap());

        let other = generate(&GenParams { seed: 8, ..params }).unwrap();
        assert_ne!(generate(&params).unwrap(), other);
    }

    #[test]
    fn test_generate_rejects_overfull_grid() {
        let err = generate(&GenParams {
            rows: 3,
            cols: 3,
            obstacles: 8,
            targets: 1,
            robots: 1,
            seed: 0,
        })
        .unwrap_err();

        assert_eq!(
            err,
            GenError::TooMany {
                requested: 10,
                cells: 9
            }
        );
    }

    #[test]
    fn test_generate_rejects_oversized_dimensions() {
        let err = generate(&GenParams {
            rows: 256,
            cols: 10,
            obstacles: 0,
            targets: 0,
            robots: 0,
            seed: 0,
        })
        .unwrap_err();

        assert!(matches!(err, GenError::BadDimensions { .. }));
    }

    #[test]
    fn test_generate_can_fill_grid_exactly() {
        let map = generate(&GenParams {
            rows: 2,
            cols: 2,
            obstacles: 2,
            targets: 1,
            robots: 1,
            seed: 3,
        })
        .unwrap();

        assert_eq!(count(&map.codes, CODE_FREE), 0);
    }

    #[test]
    fn test_generated_map_decodes_to_world() {
        let map = generate(&GenParams {
            rows: 6,
            cols: 6,
            obstacles: 10,
            targets: 3,
            robots: 2,
            seed: 11,
        })
        .unwrap();

        let (world, starts) = map.into_world().unwrap();
        assert_eq!(world.targets_remaining(), 3);
        assert_eq!(starts.len(), 2);
    }
}
