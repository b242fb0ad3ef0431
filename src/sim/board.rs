//! Board model - the grid of tile colors
//!
//! Coordinates are (row, col) with row 0 at the top. Tiles are plain values;
//! a cell has no identity beyond its position.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{BOARD_SIZE, PALETTE_SIZE};

/// A single cell's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tile {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    /// Transient hole left by a clear, filled again by gravity
    Empty,
}

/// Colors a tile can be dealt as (never `Empty`)
pub const PALETTE: [Tile; PALETTE_SIZE] = [
    Tile::Red,
    Tile::Blue,
    Tile::Green,
    Tile::Yellow,
    Tile::Purple,
];

impl Tile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tile::Red => "red",
            Tile::Blue => "blue",
            Tile::Green => "green",
            Tile::Yellow => "yellow",
            Tile::Purple => "purple",
            Tile::Empty => "empty",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "red" => Some(Tile::Red),
            "blue" => Some(Tile::Blue),
            "green" => Some(Tile::Green),
            "yellow" => Some(Tile::Yellow),
            "purple" => Some(Tile::Purple),
            "empty" => Some(Tile::Empty),
            _ => None,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        *self == Tile::Empty
    }

    /// Position in `PALETTE`, `None` for `Empty`
    pub fn palette_index(&self) -> Option<usize> {
        PALETTE.iter().position(|t| t == self)
    }

    /// Uniform draw over the palette
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        PALETTE[rng.random_range(0..PALETTE_SIZE)]
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn in_bounds(&self) -> bool {
        self.row < BOARD_SIZE && self.col < BOARD_SIZE
    }

    /// Orthogonal neighbour check
    pub fn is_adjacent(&self, other: Cell) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The N x N grid. Every cell always holds a `Tile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: [[Tile; BOARD_SIZE]; BOARD_SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Self::filled(Tile::Empty)
    }
}

impl Board {
    /// Board with every cell set to `tile`
    pub fn filled(tile: Tile) -> Self {
        Self {
            cells: [[tile; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Board from explicit rows (top to bottom)
    pub fn from_rows(rows: [[Tile; BOARD_SIZE]; BOARD_SIZE]) -> Self {
        Self { cells: rows }
    }

    /// Fully random board; may contain matches
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut board = Self::default();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                board.cells[row][col] = Tile::random(rng);
            }
        }
        board
    }

    /// Random board with no run of three anywhere.
    ///
    /// Each cell is dealt left-to-right, top-to-bottom, rejecting a color that
    /// would complete a run with the two cells to its left or the two above.
    /// With five colors at most two are ever excluded, so this always succeeds.
    pub fn random_stable<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut board = Self::default();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let left = (col >= 2 && board.cells[row][col - 1] == board.cells[row][col - 2])
                    .then(|| board.cells[row][col - 1]);
                let up = (row >= 2 && board.cells[row - 1][col] == board.cells[row - 2][col])
                    .then(|| board.cells[row - 1][col]);
                let allowed: Vec<Tile> = PALETTE
                    .iter()
                    .copied()
                    .filter(|t| Some(*t) != left && Some(*t) != up)
                    .collect();
                board.cells[row][col] = allowed[rng.random_range(0..allowed.len())];
            }
        }
        board
    }

    #[inline]
    fn check(cell: Cell) {
        assert!(
            cell.in_bounds(),
            "cell {cell} out of range for {BOARD_SIZE}x{BOARD_SIZE} board"
        );
    }

    /// Tile at `cell`. Panics if out of range.
    pub fn get(&self, cell: Cell) -> Tile {
        Self::check(cell);
        self.cells[cell.row][cell.col]
    }

    /// Overwrite the tile at `cell`. Panics if out of range.
    pub fn set(&mut self, cell: Cell, tile: Tile) {
        Self::check(cell);
        self.cells[cell.row][cell.col] = tile;
    }

    /// Exchange two cells' values in place
    pub fn swap(&mut self, a: Cell, b: Cell) {
        let ta = self.get(a);
        let tb = self.get(b);
        self.set(a, tb);
        self.set(b, ta);
    }

    /// Column top-to-bottom
    pub fn column(&self, col: usize) -> [Tile; BOARD_SIZE] {
        Self::check(Cell::new(0, col));
        std::array::from_fn(|row| self.cells[row][col])
    }

    pub fn count_empty(&self) -> usize {
        self.cells.iter().flatten().filter(|t| t.is_empty()).count()
    }

    /// Iterate every (cell, tile) in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (Cell, Tile)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, tiles)| {
            tiles
                .iter()
                .enumerate()
                .map(move |(col, tile)| (Cell::new(row, col), *tile))
        })
    }
}

impl fmt::Display for Board {
    /// One letter per tile, `.` for empty
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            for tile in row {
                let c = match tile {
                    Tile::Red => 'R',
                    Tile::Blue => 'B',
                    Tile::Green => 'G',
                    Tile::Yellow => 'Y',
                    Tile::Purple => 'P',
                    Tile::Empty => '.',
                };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
