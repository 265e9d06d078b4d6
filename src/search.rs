use crate::cell::{Annotation, Position};
use crate::grid::Grid;
use crate::heuristic::estimate;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Outcome of one search run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathResult {
    /// Cells from start to goal inclusive
    Found(Vec<Position>),
    NotFound,
    Cancelled,
}

impl PathResult {
    pub fn is_found(&self) -> bool {
        matches!(self, PathResult::Found(_))
    }

    pub fn path(&self) -> Option<&[Position]> {
        match self {
            PathResult::Found(path) => Some(path),
            _ => None,
        }
    }
}

/// Observer invoked while a search runs.
///
/// `on_step` gets a shared borrow of the grid so it can draw or record the
/// current annotations; it has no way to mutate the grid or search state.
pub trait StepHook {
    fn on_step(&mut self, grid: &Grid);

    /// Polled at the top of every expansion
    fn cancel_requested(&self) -> bool {
        false
    }
}

impl<F: FnMut(&Grid)> StepHook for F {
    fn on_step(&mut self, grid: &Grid) {
        self(grid)
    }
}

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, AtomicOrdering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(AtomicOrdering::SeqCst)
    }

    pub fn reset(&self) {
        self.flag.store(false, AtomicOrdering::SeqCst);
    }
}

/// Wraps a hook so a token can stop the search
pub struct Cancellable<H> {
    pub hook: H,
    token: CancelToken,
}

impl<H: StepHook> Cancellable<H> {
    pub fn new(hook: H, token: CancelToken) -> Self {
        Cancellable { hook, token }
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }
}

impl<H: StepHook> StepHook for Cancellable<H> {
    fn on_step(&mut self, grid: &Grid) {
        self.hook.on_step(grid);
    }

    fn cancel_requested(&self) -> bool {
        self.token.is_cancelled() || self.hook.cancel_requested()
    }
}

/// Cancels the search once `limit` steps have been observed
pub struct StepBudget<H> {
    pub hook: H,
    limit: usize,
    taken: usize,
}

impl<H: StepHook> StepBudget<H> {
    pub fn new(hook: H, limit: usize) -> Self {
        StepBudget {
            hook,
            limit,
            taken: 0,
        }
    }

    pub fn taken(&self) -> usize {
        self.taken
    }
}

impl<H: StepHook> StepHook for StepBudget<H> {
    fn on_step(&mut self, grid: &Grid) {
        self.taken += 1;
        self.hook.on_step(grid);
    }

    fn cancel_requested(&self) -> bool {
        self.taken >= self.limit || self.hook.cancel_requested()
    }
}

/// Snapshots every cell annotation (row-major) at each step so a
/// frame-driven host can replay the search afterwards
#[derive(Debug, Default)]
pub struct StepRecorder {
    pub frames: Vec<Vec<Annotation>>,
}

impl StepRecorder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StepHook for StepRecorder {
    fn on_step(&mut self, grid: &Grid) {
        self.frames
            .push(grid.cells().map(|cell| cell.annotation()).collect());
    }
}

/// A frontier entry ordered by (f-score, insertion sequence)
#[derive(Debug, Clone, PartialEq, Eq)]
struct FrontierEntry {
    f_score: u32,
    sequence: u64,
    position: Position,
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other
            .f_score
            .cmp(&self.f_score)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Mark a cell unless it is one of the endpoints
fn mark(grid: &mut Grid, pos: Position, annotation: Annotation, start: Position, goal: Position) {
    if pos != start && pos != goal {
        grid.annotate(pos, annotation);
    }
}

/// Run A* from `start` to `goal` over the grid's current adjacency.
///
/// Adjacency must have been refreshed since the last barrier change. The
/// search only writes visualization annotations to the grid. Ties on
/// f-score are broken by insertion order, so repeated runs on the same grid
/// produce identical paths.
pub fn run<H: StepHook + ?Sized>(
    grid: &mut Grid,
    start: Position,
    goal: Position,
    hook: &mut H,
) -> PathResult {
    debug!(%start, %goal, size = grid.size(), "search started");

    let mut sequence: u64 = 0;
    let mut frontier = BinaryHeap::new();
    let mut in_frontier: HashSet<Position> = HashSet::new();
    let mut g_score: HashMap<Position, u32> = HashMap::new();
    let mut f_score: HashMap<Position, u32> = HashMap::new();
    let mut came_from: HashMap<Position, Position> = HashMap::new();

    g_score.insert(start, 0);
    f_score.insert(start, estimate(start, goal));
    frontier.push(FrontierEntry {
        f_score: f_score[&start],
        sequence,
        position: start,
    });
    in_frontier.insert(start);

    let mut iterations = 0usize;
    while !frontier.is_empty() {
        if hook.cancel_requested() {
            debug!(iterations, "search cancelled");
            return PathResult::Cancelled;
        }

        let Some(entry) = frontier.pop() else {
            break;
        };
        let current = entry.position;
        in_frontier.remove(&current);
        iterations += 1;

        trace!(%current, f = entry.f_score, seq = entry.sequence, "expanding");

        if current == goal {
            let path = reconstruct_path(grid, &came_from, start, goal, hook);
            debug!(iterations, pushes = sequence, length = path.len(), "path found");
            return PathResult::Found(path);
        }

        let current_g = g_score[&current];
        let neighbors = grid.neighbors_of(current).to_vec();
        for neighbor in neighbors {
            let tentative_g = current_g + 1;
            let known_g = g_score.get(&neighbor).copied().unwrap_or(u32::MAX);
            if tentative_g < known_g {
                came_from.insert(neighbor, current);
                g_score.insert(neighbor, tentative_g);
                let f = tentative_g + estimate(neighbor, goal);
                f_score.insert(neighbor, f);

                if in_frontier.insert(neighbor) {
                    sequence += 1;
                    frontier.push(FrontierEntry {
                        f_score: f,
                        sequence,
                        position: neighbor,
                    });
                    mark(grid, neighbor, Annotation::Frontier, start, goal);
                }
            }
        }

        hook.on_step(grid);

        if current != start {
            mark(grid, current, Annotation::Visited, start, goal);
        }
    }

    debug!(iterations, pushes = sequence, "frontier exhausted, no path");
    PathResult::NotFound
}

/// Walk came-from links back from the goal, marking intermediate cells
fn reconstruct_path<H: StepHook + ?Sized>(
    grid: &mut Grid,
    came_from: &HashMap<Position, Position>,
    start: Position,
    goal: Position,
    hook: &mut H,
) -> Vec<Position> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&previous) = came_from.get(&current) {
        current = previous;
        mark(grid, current, Annotation::OnPath, start, goal);
        hook.on_step(grid);
        path.push(current);
    }
    path.reverse();
    path
}

/// Format path for display
pub fn format_path(path: &[Position]) -> String {
    if path.is_empty() {
        return "No path".to_string();
    }

    path.iter()
        .map(|pos| pos.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
