use crate::cell::{Annotation, Cell, Position};
use crate::error::{GridError, Result};

/// Square grid of cells with precomputed 4-connected adjacency
#[derive(Clone, Debug)]
pub struct Grid {
    size: i32,
    cells: Vec<Cell>,
    /// Open in-bounds neighbors per cell id, valid as of `adjacency_revision`
    neighbors: Vec<Vec<Position>>,
    start: Option<Position>,
    goal: Option<Position>,
    /// Revision number - incremented whenever barrier state changes
    revision: u64,
    adjacency_revision: Option<u64>,
}

impl Grid {
    /// Allocate an n x n grid with every cell open and no start/goal
    pub fn build(size: i32) -> Self {
        let size = size.max(0);
        let mut cells = Vec::with_capacity((size * size) as usize);
        for row in 0..size {
            for col in 0..size {
                cells.push(Cell::new(row, col));
            }
        }

        Grid {
            size,
            neighbors: vec![Vec::new(); cells.len()],
            cells,
            start: None,
            goal: None,
            revision: 0,
            adjacency_revision: None,
        }
    }

    /// Build a grid with specific barrier cells. Out-of-bounds entries are ignored.
    pub fn with_barriers(size: i32, barriers: &[Position]) -> Self {
        let mut grid = Self::build(size);
        for &pos in barriers {
            if grid.in_bounds(pos) {
                let id = grid.get_id(pos);
                grid.cells[id].set_barrier(true);
            }
        }
        grid.revision += 1;
        grid
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row >= 0 && pos.row < self.size && pos.col >= 0 && pos.col < self.size
    }

    fn check_bounds(&self, pos: Position) -> Result<()> {
        if self.in_bounds(pos) {
            Ok(())
        } else {
            Err(GridError::OutOfBounds {
                row: pos.row,
                col: pos.col,
                size: self.size,
            })
        }
    }

    /// Convert a position to its cell id (row-major)
    pub fn get_id(&self, pos: Position) -> usize {
        (pos.col + pos.row * self.size) as usize
    }

    /// Convert a cell id back to its position
    pub fn get_coords(&self, id: usize) -> Position {
        let id = id as i32;
        Position::new(id / self.size, id % self.size)
    }

    pub fn cell(&self, pos: Position) -> Result<&Cell> {
        self.check_bounds(pos)?;
        Ok(&self.cells[self.get_id(pos)])
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Out of bounds is considered a barrier
    pub fn is_barrier(&self, pos: Position) -> bool {
        if !self.in_bounds(pos) {
            return true;
        }
        self.cells[self.get_id(pos)].is_barrier()
    }

    pub fn annotation(&self, pos: Position) -> Option<Annotation> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some(self.cells[self.get_id(pos)].annotation())
    }

    pub(crate) fn annotate(&mut self, pos: Position, annotation: Annotation) {
        if self.in_bounds(pos) {
            let id = self.get_id(pos);
            self.cells[id].annotate(annotation);
        }
    }

    /// Mark a cell as a barrier. Returns whether the cell changed.
    pub fn set_barrier(&mut self, row: i32, col: i32) -> Result<bool> {
        let pos = Position::new(row, col);
        self.check_bounds(pos)?;
        if self.start == Some(pos) || self.goal == Some(pos) {
            return Err(GridError::InvalidCellState(format!(
                "cannot place a barrier on the start or goal cell {}",
                pos
            )));
        }
        Ok(self.update_barrier(pos, true))
    }

    /// Reopen a barrier cell. Returns whether the cell changed.
    pub fn clear_barrier(&mut self, row: i32, col: i32) -> Result<bool> {
        let pos = Position::new(row, col);
        self.check_bounds(pos)?;
        Ok(self.update_barrier(pos, false))
    }

    fn update_barrier(&mut self, pos: Position, barrier: bool) -> bool {
        let id = self.get_id(pos);
        let changed = self.cells[id].set_barrier(barrier);
        if changed {
            self.cells[id].annotate(Annotation::Unvisited);
            self.revision += 1;
        }
        changed
    }

    pub fn set_start(&mut self, row: i32, col: i32) -> Result<()> {
        let pos = self.check_endpoint(row, col, self.goal, "goal")?;
        if let Some(old) = self.start.replace(pos) {
            self.annotate(old, Annotation::Unvisited);
        }
        self.annotate(pos, Annotation::Start);
        Ok(())
    }

    pub fn set_goal(&mut self, row: i32, col: i32) -> Result<()> {
        let pos = self.check_endpoint(row, col, self.start, "start")?;
        if let Some(old) = self.goal.replace(pos) {
            self.annotate(old, Annotation::Unvisited);
        }
        self.annotate(pos, Annotation::Goal);
        Ok(())
    }

    /// Assign start and goal together, validating both before either changes
    pub fn set_endpoints(&mut self, start: Position, goal: Position) -> Result<()> {
        if self.start == Some(start) && self.goal == Some(goal) {
            return Ok(());
        }
        if start == goal {
            return Err(GridError::InvalidCellState(format!(
                "start and goal are both {}",
                start
            )));
        }
        self.check_endpoint(start.row, start.col, None, "goal")?;
        self.check_endpoint(goal.row, goal.col, None, "start")?;

        for old in [self.start.take(), self.goal.take()].into_iter().flatten() {
            self.annotate(old, Annotation::Unvisited);
        }
        self.start = Some(start);
        self.goal = Some(goal);
        self.annotate(start, Annotation::Start);
        self.annotate(goal, Annotation::Goal);
        Ok(())
    }

    fn check_endpoint(
        &self,
        row: i32,
        col: i32,
        other: Option<Position>,
        other_name: &str,
    ) -> Result<Position> {
        let pos = Position::new(row, col);
        self.check_bounds(pos)?;
        if self.is_barrier(pos) {
            return Err(GridError::InvalidCellState(format!(
                "{} is a barrier",
                pos
            )));
        }
        if other == Some(pos) {
            return Err(GridError::InvalidCellState(format!(
                "{} is already the {}",
                pos, other_name
            )));
        }
        Ok(pos)
    }

    pub fn start(&self) -> Option<Position> {
        self.start
    }

    pub fn goal(&self) -> Option<Position> {
        self.goal
    }

    /// Recompute every cell's neighbor list from the current barrier state
    pub fn refresh_adjacency(&mut self) {
        let size = self.size;
        for id in 0..self.cells.len() {
            let pos = self.get_coords(id);
            let mut list = Vec::with_capacity(4);
            // Order matters: it fixes frontier insertion order during search
            let candidates = [
                Position::new(pos.row + 1, pos.col),
                Position::new(pos.row - 1, pos.col),
                Position::new(pos.row, pos.col + 1),
                Position::new(pos.row, pos.col - 1),
            ];
            for next in candidates {
                if next.row < 0 || next.row >= size || next.col < 0 || next.col >= size {
                    continue;
                }
                if !self.cells[self.get_id(next)].is_barrier() {
                    list.push(next);
                }
            }
            self.neighbors[id] = list;
        }
        self.adjacency_revision = Some(self.revision);
    }

    /// Precomputed open neighbors of a cell; empty if none or out of bounds
    pub fn neighbors_of(&self, pos: Position) -> &[Position] {
        if !self.in_bounds(pos) {
            return &[];
        }
        &self.neighbors[self.get_id(pos)]
    }

    /// True if no barrier changed since the last refresh
    pub fn adjacency_is_current(&self) -> bool {
        self.adjacency_revision == Some(self.revision)
    }

    /// Reset frontier/visited/path annotations, keeping start and goal
    pub fn clear_annotations(&mut self) {
        for cell in &mut self.cells {
            match cell.annotation() {
                Annotation::Start | Annotation::Goal => {}
                _ => cell.annotate(Annotation::Unvisited),
            }
        }
    }

    /// Get current grid revision number
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
