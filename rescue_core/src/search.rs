//! Frontier search: BFS to the nearest unexplored cell.

use crate::grid::{CellState, Pos};
use crate::known::KnownMap;
use std::collections::{HashMap, HashSet, VecDeque};

/// Finds the shortest path from `start` to the nearest `Unknown` cell.
///
/// Breadth-first search over the 4-connected grid, traversing only cells
/// whose known state is neither `Obstacle` nor `Target` (targets are
/// approached via the rescue priority, never transited). Expansion order is
/// the fixed Up, Down, Left, Right of [`KnownMap::neighbors4`], so
/// equidistant frontiers tie-break deterministically on first discovery.
///
/// Returns the path from `start` (inclusive) to the frontier cell, or
/// `None` if no unknown cell is reachable. Each reachable cell is visited
/// at most once: O(rows * cols).
pub fn frontier_path(known: &KnownMap, start: Pos) -> Option<Vec<Pos>> {
    let mut prev: HashMap<Pos, Pos> = HashMap::new();
    let mut visited: HashSet<Pos> = HashSet::new();
    let mut queue = VecDeque::new();

    visited.insert(start);
    queue.push_back(start);

    while let Some(pos) = queue.pop_front() {
        if known.state_at(pos) == CellState::Unknown {
            return Some(reconstruct(&prev, start, pos));
        }

        for next in known.neighbors4(pos) {
            if visited.contains(&next) {
                continue;
            }
            match known.state_at(next) {
                CellState::Obstacle | CellState::Target => continue,
                _ => {}
            }
            visited.insert(next);
            prev.insert(next, pos);
            queue.push_back(next);
        }
    }

    None
}

/// Walks the parent chain back from `goal` to `start`.
fn reconstruct(prev: &HashMap<Pos, Pos>, start: Pos, goal: Pos) -> Vec<Pos> {
    let mut path = vec![goal];
    let mut cur = goal;
    while cur != start {
        cur = prev[&cur];
        path.push(cur);
    }
    path.reverse();
    path
}
