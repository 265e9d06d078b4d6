//! Text layout of a grid, one character per cell:
//! - s: start
//! - g: goal
//! - ■: barrier
//! - □: open, unvisited
//! - o: frontier
//! - x: visited
//! - *: on the path

use crate::cell::{Annotation, Position};
use crate::error::{GridError, Result};
use crate::grid::Grid;

fn symbol(annotation: Annotation, barrier: bool) -> char {
    if barrier {
        return '■';
    }
    match annotation {
        Annotation::Start => 's',
        Annotation::Goal => 'g',
        Annotation::Unvisited => '□',
        Annotation::Frontier => 'o',
        Annotation::Visited => 'x',
        Annotation::OnPath => '*',
    }
}

/// Render the grid with its current annotations
pub fn render(grid: &Grid) -> String {
    let mut result = String::new();
    for row in 0..grid.size() {
        for col in 0..grid.size() {
            let pos = Position::new(row, col);
            let annotation = grid.annotation(pos).unwrap_or_default();
            result.push(symbol(annotation, grid.is_barrier(pos)));
        }
        result.push('\n');
    }
    result
}

/// Parse a square layout. Blank lines are skipped.
///
/// Barriers, start and goal are restored; frontier/visited/path markers are
/// restored as annotations on open cells.
pub fn parse(text: &str) -> Result<Grid> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let size = lines.len() as i32;
    let mut barriers = Vec::new();
    let mut marks = Vec::new();
    let mut start = None;
    let mut goal = None;

    for (row, line) in lines.iter().enumerate() {
        let width = line.chars().count() as i32;
        if width != size {
            return Err(GridError::Layout(format!(
                "row {} has {} cells, expected {}",
                row, width, size
            )));
        }
        for (col, ch) in line.chars().enumerate() {
            let pos = Position::new(row as i32, col as i32);
            match ch {
                '■' => barriers.push(pos),
                's' => start = Some(pos),
                'g' => goal = Some(pos),
                'o' => marks.push((pos, Annotation::Frontier)),
                'x' => marks.push((pos, Annotation::Visited)),
                '*' => marks.push((pos, Annotation::OnPath)),
                '□' => {}
                other => {
                    return Err(GridError::Layout(format!(
                        "unknown symbol '{}' at {}",
                        other, pos
                    )))
                }
            }
        }
    }

    let mut grid = Grid::with_barriers(size, &barriers);
    match (start, goal) {
        (Some(start), Some(goal)) => grid.set_endpoints(start, goal)?,
        (Some(start), None) => grid.set_start(start.row, start.col)?,
        (None, Some(goal)) => grid.set_goal(goal.row, goal.col)?,
        (None, None) => {}
    }
    for (pos, annotation) in marks {
        grid.annotate(pos, annotation);
    }
    Ok(grid)
}
