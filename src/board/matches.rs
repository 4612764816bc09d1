//! Run detection.

use std::collections::BTreeSet;

use super::grid::{COLS, Coord, Grid, ROWS};

/// Cells belonging to at least one run in a single detection pass.
pub type MatchSet = BTreeSet<Coord>;

const RUN: usize = 3;

/// Every cell that is part of a horizontal or vertical run of three or more.
///
/// Each cell is checked as the start of a 3-window to the right and downward.
/// Longer runs fall out as the union of their overlapping windows, and the
/// set removes cells shared by crossing runs.
pub fn detect(grid: &Grid) -> MatchSet {
    let mut found = MatchSet::new();
    for row in 0..ROWS {
        for col in 0..COLS {
            let start = Coord::new(row as u8, col as u8);
            let Some(jewel) = grid.get(start) else {
                continue;
            };
            if col + RUN <= COLS {
                let window: Vec<Coord> = (0..RUN)
                    .map(|i| Coord::new(row as u8, (col + i) as u8))
                    .collect();
                if window.iter().all(|&c| grid.get(c) == Some(jewel)) {
                    found.extend(window);
                }
            }
            if row + RUN <= ROWS {
                let window: Vec<Coord> = (0..RUN)
                    .map(|i| Coord::new((row + i) as u8, col as u8))
                    .collect();
                if window.iter().all(|&c| grid.get(c) == Some(jewel)) {
                    found.extend(window);
                }
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::grid::Jewel;

    fn row_of(jewels: &[Jewel]) -> Grid {
        let mut grid = Grid::empty();
        for (col, j) in jewels.iter().enumerate() {
            grid.set(Coord::new(0, col as u8), Some(*j));
        }
        grid
    }

    #[test]
    fn two_adjacent_runs_of_three() {
        use crate::board::grid::Jewel::{Amber as Y, Ruby as X};
        let found = detect(&row_of(&[X, X, X, Y, Y, Y]));
        let expected: MatchSet = (0..6).map(|c| Coord::new(0, c)).collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn isolated_pair_is_not_a_match() {
        let found = detect(&row_of(&[Jewel::Ruby, Jewel::Ruby]));
        assert!(found.is_empty());
    }

    #[test]
    fn run_of_five_is_fully_captured() {
        let found = detect(&row_of(&[Jewel::Emerald; 5]));
        assert_eq!(found.len(), 5);
    }

    #[test]
    fn crossing_runs_share_the_corner_once() {
        let mut grid = Grid::empty();
        for i in 0..3 {
            grid.set(Coord::new(2, i), Some(Jewel::Sapphire));
            grid.set(Coord::new(i, 0), Some(Jewel::Sapphire));
        }
        let found = detect(&grid);
        assert_eq!(found.len(), 5);
        assert!(found.contains(&Coord::new(2, 0)));
    }

    #[test]
    fn empty_cells_never_match() {
        assert!(detect(&Grid::empty()).is_empty());
    }

    #[test]
    fn vertical_run_at_bottom_edge() {
        let mut grid = Grid::empty();
        for row in 5..8 {
            grid.set(Coord::new(row, 7), Some(Jewel::Amethyst));
        }
        let found = detect(&grid);
        let expected: MatchSet = (5..8).map(|r| Coord::new(r, 7)).collect();
        assert_eq!(found, expected);
    }
}
