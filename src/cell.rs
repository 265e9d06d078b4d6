/// A position on the grid (0-indexed row and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Position { row, col }
    }

    /// True if the two positions share an edge
    pub fn is_adjacent(&self, other: &Position) -> bool {
        (self.row - other.row).abs() + (self.col - other.col).abs() == 1
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// Visualization state of a cell.
///
/// Only the host and the search write it; passability never depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Annotation {
    #[default]
    Unvisited,
    Frontier,
    Visited,
    OnPath,
    Start,
    Goal,
}

/// A single grid location
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    row: i32,
    col: i32,
    barrier: bool,
    annotation: Annotation,
}

impl Cell {
    /// Create an open, unvisited cell
    pub fn new(row: i32, col: i32) -> Self {
        Cell {
            row,
            col,
            barrier: false,
            annotation: Annotation::Unvisited,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.row, self.col)
    }

    pub fn row(&self) -> i32 {
        self.row
    }

    pub fn col(&self) -> i32 {
        self.col
    }

    pub fn is_barrier(&self) -> bool {
        self.barrier
    }

    pub fn annotation(&self) -> Annotation {
        self.annotation
    }

    pub(crate) fn annotate(&mut self, annotation: Annotation) {
        self.annotation = annotation;
    }

    /// Set the passability flag. Returns true if the flag changed.
    pub(crate) fn set_barrier(&mut self, barrier: bool) -> bool {
        let changed = self.barrier != barrier;
        self.barrier = barrier;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_cell_is_open() {
        let cell = Cell::new(3, 4);
        assert_eq!(cell.position(), Position::new(3, 4));
        assert!(!cell.is_barrier());
        assert_eq!(cell.annotation(), Annotation::Unvisited);
    }

    #[test]
    fn test_set_barrier_reports_change() {
        let mut cell = Cell::new(0, 0);
        assert!(cell.set_barrier(true));
        assert!(!cell.set_barrier(true));
        assert!(cell.set_barrier(false));
    }

    #[test]
    fn test_adjacency_is_four_connected() {
        let p = Position::new(2, 2);
        assert!(p.is_adjacent(&Position::new(1, 2)));
        assert!(p.is_adjacent(&Position::new(2, 3)));
        assert!(!p.is_adjacent(&Position::new(3, 3)));
        assert!(!p.is_adjacent(&p));
    }
}
