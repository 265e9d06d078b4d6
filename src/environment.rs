//! Random environment generation and obstacle injection

use crate::cell::Position;
use crate::error::Result;
use crate::grid::Grid;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, trace};

/// Build a grid where each cell is a barrier with probability `density`.
///
/// Start is the top-left corner and goal the bottom-right; both are kept open.
pub fn generate_environment<R: Rng>(
    size: i32,
    density: f64,
    rng: &mut R,
) -> Result<(Grid, Position, Position)> {
    let start = Position::new(0, 0);
    let goal = Position::new(size - 1, size - 1);

    let mut barriers = Vec::new();
    for row in 0..size {
        for col in 0..size {
            let pos = Position::new(row, col);
            if rng.gen::<f64>() < density && pos != start && pos != goal {
                barriers.push(pos);
            }
        }
    }

    let mut grid = Grid::with_barriers(size, &barriers);
    grid.set_endpoints(start, goal)?;
    info!(size, barriers = barriers.len(), "generated environment");
    Ok((grid, start, goal))
}

/// Drops a barrier on a random cell with a fixed chance per tick
pub struct ObstacleInjector {
    spawn_probability: f64,
    rng: StdRng,
}

impl ObstacleInjector {
    /// Seeded injectors replay the same obstacle sequence
    pub fn new(spawn_probability: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        ObstacleInjector {
            spawn_probability,
            rng,
        }
    }

    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Maybe place one new barrier. Only active once start and goal exist.
    ///
    /// Returns the cell that became a barrier, if any.
    pub fn tick(&mut self, grid: &mut Grid) -> Option<Position> {
        if grid.start().is_none() || grid.goal().is_none() || grid.size() == 0 {
            return None;
        }
        if self.rng.gen::<f64>() >= self.spawn_probability {
            return None;
        }

        let row = self.rng.gen_range(0..grid.size());
        let col = self.rng.gen_range(0..grid.size());
        // Start/goal are rejected by the grid; those ticks are skipped
        match grid.set_barrier(row, col) {
            Ok(true) => {
                let pos = Position::new(row, col);
                trace!(%pos, "obstacle injected");
                Some(pos)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_endpoints_are_open() {
        let mut rng = StdRng::seed_from_u64(1);
        let (grid, start, goal) = generate_environment(10, 1.0, &mut rng).unwrap();
        assert_eq!(start, Position::new(0, 0));
        assert_eq!(goal, Position::new(9, 9));
        assert!(!grid.is_barrier(start));
        assert!(!grid.is_barrier(goal));
        assert_eq!(grid.cells().filter(|c| c.is_barrier()).count(), 98);
    }

    #[test]
    fn test_zero_density_is_open() {
        let mut rng = StdRng::seed_from_u64(1);
        let (grid, _, _) = generate_environment(6, 0.0, &mut rng).unwrap();
        assert!(grid.cells().all(|c| !c.is_barrier()));
    }

    #[test]
    fn test_injector_waits_for_endpoints() {
        let mut grid = Grid::build(5);
        let mut injector = ObstacleInjector::new(1.0, Some(3));
        for _ in 0..20 {
            assert_eq!(injector.tick(&mut grid), None);
        }
    }

    #[test]
    fn test_injector_never_blocks_endpoints() {
        let mut grid = Grid::build(2);
        grid.set_endpoints(Position::new(0, 0), Position::new(1, 1)).unwrap();
        let mut injector = ObstacleInjector::new(1.0, Some(11));
        for _ in 0..200 {
            injector.tick(&mut grid);
        }
        assert!(!grid.is_barrier(Position::new(0, 0)));
        assert!(!grid.is_barrier(Position::new(1, 1)));
        assert!(grid.is_barrier(Position::new(0, 1)));
        assert!(grid.is_barrier(Position::new(1, 0)));
    }

    #[test]
    fn test_zero_probability_never_injects() {
        let mut grid = Grid::build(5);
        grid.set_endpoints(Position::new(0, 0), Position::new(4, 4)).unwrap();
        let mut injector = ObstacleInjector::new(0.0, Some(5));
        assert!((0..100).all(|_| injector.tick(&mut grid).is_none()));
    }
}
