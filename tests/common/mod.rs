#![allow(dead_code)]

use maze_solver::search::{self, PathResult};
use maze_solver::{layout, Annotation, Grid, Position};
use std::collections::{HashSet, VecDeque};

/// Parse a layout fixture and refresh its adjacency
pub fn fixture(text: &str) -> Grid {
    let mut grid = layout::parse(text).expect("fixture should parse");
    grid.refresh_adjacency();
    grid
}

/// Run a search with a hook that only counts steps
pub fn run_counting(grid: &mut Grid, start: Position, goal: Position) -> (PathResult, usize) {
    let mut steps = 0;
    let result = search::run(grid, start, goal, &mut |_: &Grid| steps += 1);
    (result, steps)
}

pub fn run_quiet(grid: &mut Grid, start: Position, goal: Position) -> PathResult {
    search::run(grid, start, goal, &mut |_: &Grid| {})
}

/// Shortest path length in steps, computed by plain BFS on barrier flags
pub fn bfs_distance(grid: &Grid, start: Position, goal: Position) -> Option<usize> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();
    seen.insert(start);
    queue.push_back((start, 0));

    while let Some((pos, dist)) = queue.pop_front() {
        if pos == goal {
            return Some(dist);
        }
        for (dr, dc) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let next = Position::new(pos.row + dr, pos.col + dc);
            if !grid.is_barrier(next) && seen.insert(next) {
                queue.push_back((next, dist + 1));
            }
        }
    }
    None
}

/// Consecutive cells 4-adjacent, no repeats, no barriers, correct endpoints
pub fn assert_valid_path(grid: &Grid, path: &[Position], start: Position, goal: Position) {
    assert_eq!(path.first(), Some(&start), "path must begin at start");
    assert_eq!(path.last(), Some(&goal), "path must end at goal");

    for pair in path.windows(2) {
        assert!(pair[0].is_adjacent(&pair[1]), "{} and {} are not adjacent", pair[0], pair[1]);
    }

    let unique: HashSet<&Position> = path.iter().collect();
    assert_eq!(unique.len(), path.len(), "path repeats a cell");

    for pos in path {
        assert!(!grid.is_barrier(*pos), "path crosses barrier at {}", pos);
    }
}

pub fn cells_with(grid: &Grid, annotation: Annotation) -> Vec<Position> {
    grid.cells()
        .filter(|cell| cell.annotation() == annotation)
        .map(|cell| cell.position())
        .collect()
}
