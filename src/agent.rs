use crate::cell::Position;
use crate::error::{GridError, Result};
use crate::grid::Grid;
use crate::search::{self, format_path, PathResult, StepHook};
use rand::Rng;
use tracing::{debug, info};

/// Default probability that a cell is observed by `perceive`
pub const DEFAULT_VISIBILITY: f64 = 0.9;

/// Agent owns the grid and the start/goal pair and runs planning over them.
///
/// It never re-plans on its own: callers decide when a changed grid warrants
/// another `act` (see `Session` for the built-in policies).
#[derive(Clone, Debug)]
pub struct Agent {
    grid: Grid,
    start: Position,
    goal: Position,
    /// Whether the most recent `act` found a path
    path_found: bool,
    last_path: Option<Vec<Position>>,
    visibility: f64,
}

impl Agent {
    /// Create an agent, marking start and goal on the grid
    pub fn new(mut grid: Grid, start: Position, goal: Position) -> Result<Self> {
        grid.set_endpoints(start, goal)?;
        Ok(Agent {
            grid,
            start,
            goal,
            path_found: false,
            last_path: None,
            visibility: DEFAULT_VISIBILITY,
        })
    }

    /// Set the observation probability used by `perceive` (clamped to [0, 1])
    pub fn with_visibility(mut self, visibility: f64) -> Self {
        self.visibility = visibility.clamp(0.0, 1.0);
        self
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable access for barrier edits between plans
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn goal(&self) -> Position {
        self.goal
    }

    pub fn path_found(&self) -> bool {
        self.path_found
    }

    pub fn last_path(&self) -> Option<&[Position]> {
        self.last_path.as_deref()
    }

    /// Replace the goal. The new goal must differ from start and be open.
    pub fn set_goal(&mut self, goal: Position) -> Result<()> {
        if goal == self.start {
            return Err(GridError::InvalidCellState(format!(
                "goal {} equals start",
                goal
            )));
        }
        self.grid.set_endpoints(self.start, goal)?;
        self.goal = goal;
        self.forget_path();
        Ok(())
    }

    /// Swap in a whole new grid, carrying start and goal over to it.
    ///
    /// On error the previous grid is kept.
    pub fn update_environment(&mut self, mut grid: Grid) -> Result<()> {
        grid.set_endpoints(self.start, self.goal)?;
        info!(size = grid.size(), "environment replaced");
        self.grid = grid;
        self.forget_path();
        Ok(())
    }

    fn forget_path(&mut self) {
        self.path_found = false;
        self.last_path = None;
    }

    /// Sample the cells the agent can currently see.
    ///
    /// Each cell is included independently with the configured visibility.
    /// Planning always uses the full grid; this is an observation surface only.
    pub fn perceive<R: Rng>(&self, rng: &mut R) -> Vec<Position> {
        self.grid
            .cells()
            .filter(|_| rng.gen::<f64>() < self.visibility)
            .map(|cell| cell.position())
            .collect()
    }

    /// Partial-observability planning entry point. Currently does nothing.
    // TODO: replan over `visible` only, treating unseen cells as open
    pub fn plan<H: StepHook + ?Sized>(&mut self, _hook: &mut H, visible: &[Position]) {
        debug!(visible = visible.len(), "plan called with partial observation; ignored");
    }

    /// Refresh adjacency and run A* from start to goal on the full grid
    pub fn act<H: StepHook + ?Sized>(&mut self, hook: &mut H) -> Result<PathResult> {
        self.grid.set_endpoints(self.start, self.goal)?;
        self.grid.clear_annotations();
        self.grid.refresh_adjacency();

        let result = search::run(&mut self.grid, self.start, self.goal, hook);

        self.path_found = result.is_found();
        self.last_path = result.path().map(|path| path.to_vec());

        match &result {
            PathResult::Found(path) => {
                info!(length = path.len(), "agent found a path");
                debug!(path = %format_path(path));
            }
            PathResult::NotFound => info!("agent failed to find a path"),
            PathResult::Cancelled => info!("agent planning cancelled"),
        }

        Ok(result)
    }

    /// True if a barrier now sits on the last found path
    pub fn path_invalidated(&self) -> bool {
        match &self.last_path {
            Some(path) => path.iter().any(|&pos| self.grid.is_barrier(pos)),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_new_rejects_equal_endpoints() {
        let grid = Grid::build(3);
        let p = Position::new(1, 1);
        assert!(matches!(Agent::new(grid, p, p), Err(GridError::InvalidCellState(_))));
    }

    #[test]
    fn test_new_rejects_barrier_endpoint() {
        let grid = Grid::with_barriers(3, &[Position::new(2, 2)]);
        let result = Agent::new(grid, Position::new(0, 0), Position::new(2, 2));
        assert!(matches!(result, Err(GridError::InvalidCellState(_))));
    }

    #[test]
    fn test_set_goal_rejects_start() {
        let mut agent = Agent::new(Grid::build(3), Position::new(0, 0), Position::new(2, 2)).unwrap();
        assert!(agent.set_goal(Position::new(0, 0)).is_err());
        assert_eq!(agent.goal(), Position::new(2, 2));

        agent.set_goal(Position::new(0, 2)).unwrap();
        assert_eq!(agent.grid().goal(), Some(Position::new(0, 2)));
    }

    #[test]
    fn test_act_records_outcome() {
        let mut agent = Agent::new(Grid::build(4), Position::new(0, 0), Position::new(3, 3)).unwrap();
        let result = agent.act(&mut |_: &Grid| {}).unwrap();
        assert!(result.is_found());
        assert!(agent.path_found());
        assert_eq!(agent.last_path().map(|p| p.len()), Some(7));
    }

    #[test]
    fn test_path_invalidated_by_new_barrier() {
        let mut agent = Agent::new(Grid::build(4), Position::new(0, 0), Position::new(3, 3)).unwrap();
        agent.act(&mut |_: &Grid| {}).unwrap();
        assert!(!agent.path_invalidated());

        let on_path = agent.last_path().unwrap()[2];
        agent.grid_mut().set_barrier(on_path.row, on_path.col).unwrap();
        assert!(agent.path_invalidated());
    }

    #[test]
    fn test_update_environment_keeps_old_grid_on_error() {
        let mut agent = Agent::new(Grid::build(4), Position::new(0, 0), Position::new(3, 3)).unwrap();
        let blocked = Grid::with_barriers(4, &[Position::new(3, 3)]);
        assert!(agent.update_environment(blocked).is_err());
        assert!(!agent.grid().is_barrier(Position::new(3, 3)));

        agent.update_environment(Grid::build(4)).unwrap();
        assert_eq!(agent.grid().start(), Some(Position::new(0, 0)));
    }

    #[test]
    fn test_perceive_respects_visibility() {
        let mut rng = StdRng::seed_from_u64(7);
        let agent = Agent::new(Grid::build(5), Position::new(0, 0), Position::new(4, 4)).unwrap();
        assert_eq!(agent.clone().with_visibility(1.0).perceive(&mut rng).len(), 25);
        assert!(agent.clone().with_visibility(0.0).perceive(&mut rng).is_empty());

        let seen = agent.perceive(&mut rng);
        assert!(seen.len() <= 25);
    }
}
