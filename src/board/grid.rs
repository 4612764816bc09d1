//! Fixed 8x8 jewel grid and its mutation primitives.
//!
//! Row 0 is the top of the board; gravity pulls toward `ROWS - 1`. Cells are
//! stored row-major in a flat array.

use std::fmt;
use std::str::FromStr;

use rand::Rng;

pub const ROWS: usize = 8;
pub const COLS: usize = 8;
pub const CELL_COUNT: usize = ROWS * COLS;

/// Jewel colors. The palette is fixed at five.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Jewel {
    Ruby,
    Amber,
    Emerald,
    Sapphire,
    Amethyst,
}

impl Jewel {
    pub const ALL: [Jewel; 5] = [
        Jewel::Ruby,
        Jewel::Amber,
        Jewel::Emerald,
        Jewel::Sapphire,
        Jewel::Amethyst,
    ];

    /// Uniform draw from the palette.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Stylesheet class used by the page (`color-1` .. `color-5`).
    pub fn css_class(self) -> &'static str {
        match self {
            Jewel::Ruby => "color-1",
            Jewel::Amber => "color-2",
            Jewel::Emerald => "color-3",
            Jewel::Sapphire => "color-4",
            Jewel::Amethyst => "color-5",
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Jewel::Ruby => 'R',
            Jewel::Amber => 'A',
            Jewel::Emerald => 'E',
            Jewel::Sapphire => 'S',
            Jewel::Amethyst => 'M',
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|j| j.symbol() == c)
    }
}

/// Board coordinate, `(row, col)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    pub row: u8,
    pub col: u8,
}

impl Coord {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    pub fn in_bounds(self) -> bool {
        (self.row as usize) < ROWS && (self.col as usize) < COLS
    }

    /// Neighbor at `(dr, dc)`, or `None` if it falls off the board.
    pub fn offset(self, dr: i8, dc: i8) -> Option<Coord> {
        let r = self.row as i16 + dr as i16;
        let c = self.col as i16 + dc as i16;
        if r < 0 || c < 0 || r >= ROWS as i16 || c >= COLS as i16 {
            return None;
        }
        Some(Coord::new(r as u8, c as u8))
    }

    fn delta(self, other: Coord) -> (u8, u8) {
        (self.row.abs_diff(other.row), self.col.abs_diff(other.col))
    }

    /// Manhattan distance 1.
    pub fn is_adjacent(self, other: Coord) -> bool {
        matches!(self.delta(other), (0, 1) | (1, 0))
    }

    /// Chess knight relation: |d| = (2,1) or (1,2).
    pub fn is_knight_move(self, other: Coord) -> bool {
        matches!(self.delta(other), (2, 1) | (1, 2))
    }

    fn index(self) -> usize {
        self.row as usize * COLS + self.col as usize
    }

    fn from_index(idx: usize) -> Self {
        Coord::new((idx / COLS) as u8, (idx % COLS) as u8)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    cells: [Option<Jewel>; CELL_COUNT],
}

impl Default for Grid {
    fn default() -> Self {
        Self::empty()
    }
}

impl Grid {
    pub fn empty() -> Self {
        Self {
            cells: [None; CELL_COUNT],
        }
    }

    /// Fill every cell so that no run of three exists anywhere.
    ///
    /// Cells are drawn row-major; a candidate is redrawn while it would extend
    /// the two cells to its left or the two cells above it into a run. Five
    /// colors against at most two forbidden ones keeps the retry loop short.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut grid = Self::empty();
        for idx in 0..CELL_COUNT {
            let at = Coord::from_index(idx);
            let jewel = loop {
                let candidate = Jewel::random(rng);
                if !grid.completes_run(at, candidate) {
                    break candidate;
                }
            };
            grid.cells[idx] = Some(jewel);
        }
        grid
    }

    fn completes_run(&self, at: Coord, jewel: Jewel) -> bool {
        let same = |dr: i8, dc: i8| {
            at.offset(dr, dc)
                .is_some_and(|c| self.get(c) == Some(jewel))
        };
        (same(0, -1) && same(0, -2)) || (same(-1, 0) && same(-2, 0))
    }

    /// Build a grid cell by cell. Handy for fixed layouts.
    pub fn from_fn(mut f: impl FnMut(Coord) -> Option<Jewel>) -> Self {
        let mut grid = Self::empty();
        for idx in 0..CELL_COUNT {
            grid.cells[idx] = f(Coord::from_index(idx));
        }
        grid
    }

    pub fn get(&self, at: Coord) -> Option<Jewel> {
        if !at.in_bounds() {
            return None;
        }
        self.cells[at.index()]
    }

    pub fn set(&mut self, at: Coord, jewel: Option<Jewel>) {
        if at.in_bounds() {
            self.cells[at.index()] = jewel;
        }
    }

    /// Exchange two cells. No adjacency check here; callers validate moves.
    pub fn swap(&mut self, a: Coord, b: Coord) {
        if a.in_bounds() && b.in_bounds() {
            self.cells.swap(a.index(), b.index());
        }
    }

    pub fn clear<I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = Coord>,
    {
        for at in cells {
            self.set(at, None);
        }
    }

    /// Gravity: per column, jewels fall to the bottom keeping their order.
    pub fn compact(&mut self) {
        for col in 0..COLS {
            let mut write = ROWS;
            for row in (0..ROWS).rev() {
                let idx = row * COLS + col;
                if let Some(jewel) = self.cells[idx] {
                    write -= 1;
                    if write != row {
                        self.cells[write * COLS + col] = Some(jewel);
                        self.cells[idx] = None;
                    }
                }
            }
        }
    }

    /// Give every empty cell a fresh random jewel. Returns how many were filled.
    pub fn refill<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let mut filled = 0;
        for cell in self.cells.iter_mut().filter(|c| c.is_none()) {
            *cell = Some(Jewel::random(rng));
            filled += 1;
        }
        filled
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Row-major iteration over every cell.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, Option<Jewel>)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(idx, cell)| (Coord::from_index(idx), *cell))
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..ROWS {
            for col in 0..COLS {
                let symbol = self.cells[row * COLS + col].map_or('.', Jewel::symbol);
                write!(f, "{symbol}")?;
            }
            if row + 1 < ROWS {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseGridError {
    RowCount(usize),
    RowWidth { row: usize, width: usize },
    Symbol { row: usize, col: usize, symbol: char },
}

impl fmt::Display for ParseGridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseGridError::RowCount(n) => write!(f, "expected {ROWS} rows, got {n}"),
            ParseGridError::RowWidth { row, width } => {
                write!(f, "row {row}: expected {COLS} cells, got {width}")
            }
            ParseGridError::Symbol { row, col, symbol } => {
                write!(f, "unknown jewel symbol '{symbol}' at ({row},{col})")
            }
        }
    }
}

impl std::error::Error for ParseGridError {}

/// Parses the `Display` form: `ROWS` lines of `COLS` symbols, `.` for empty.
/// Surrounding whitespace on each line is ignored.
impl FromStr for Grid {
    type Err = ParseGridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        if lines.len() != ROWS {
            return Err(ParseGridError::RowCount(lines.len()));
        }
        let mut grid = Grid::empty();
        for (row, line) in lines.iter().enumerate() {
            let width = line.chars().count();
            if width != COLS {
                return Err(ParseGridError::RowWidth { row, width });
            }
            for (col, symbol) in line.chars().enumerate() {
                let cell = match symbol {
                    '.' => None,
                    other => Some(
                        Jewel::from_symbol(other)
                            .ok_or(ParseGridError::Symbol { row, col, symbol })?,
                    ),
                };
                grid.cells[row * COLS + col] = cell;
            }
        }
        Ok(grid)
    }
}
