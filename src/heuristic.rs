use crate::cell::Position;

/// Manhattan distance between two grid positions.
///
/// Admissible and consistent for 4-connected unit-cost movement, which is
/// what makes the first expansion of the goal optimal.
pub fn estimate(a: Position, b: Position) -> u32 {
    (a.row - b.row).unsigned_abs() + (a.col - b.col).unsigned_abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manhattan() {
        assert_eq!(estimate(Position::new(0, 0), Position::new(0, 0)), 0);
        assert_eq!(estimate(Position::new(0, 0), Position::new(4, 4)), 8);
        assert_eq!(estimate(Position::new(3, 1), Position::new(1, 4)), 5);
    }

    #[test]
    fn test_symmetric() {
        let a = Position::new(7, 2);
        let b = Position::new(1, 9);
        assert_eq!(estimate(a, b), estimate(b, a));
    }
}
