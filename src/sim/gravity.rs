//! Gravity and refill
//!
//! Columns are handled independently: surviving tiles slide down keeping their
//! order, then the holes left at the top are dealt fresh random colors. The
//! whole thing is one synchronous pass; any falling animation is the renderer's
//! business.

use rand::Rng;

use super::board::{Board, Cell, Tile};
use crate::consts::BOARD_SIZE;

/// Compact one column downward. Returns the number of empty cells left at the top.
pub fn collapse_column(board: &mut Board, col: usize) -> usize {
    // Write pointer walks up from the bottom
    let mut write = BOARD_SIZE;
    for row in (0..BOARD_SIZE).rev() {
        let tile = board.get(Cell::new(row, col));
        if tile.is_empty() {
            continue;
        }
        write -= 1;
        if write != row {
            board.set(Cell::new(write, col), tile);
            board.set(Cell::new(row, col), Tile::Empty);
        }
    }
    write
}

/// Compact every column without refilling
pub fn collapse(board: &mut Board) -> usize {
    (0..BOARD_SIZE).map(|col| collapse_column(board, col)).sum()
}

/// Deal a random color into every empty cell. Returns the number filled.
pub fn refill<R: Rng + ?Sized>(board: &mut Board, rng: &mut R) -> usize {
    let mut filled = 0;
    // Column-major so each column's new tiles are drawn together
    for col in 0..BOARD_SIZE {
        for row in 0..BOARD_SIZE {
            let cell = Cell::new(row, col);
            if board.get(cell).is_empty() {
                board.set(cell, Tile::random(rng));
                filled += 1;
            }
        }
    }
    filled
}

/// Collapse then refill. Afterwards the board holds no empty cells.
pub fn apply_gravity<R: Rng + ?Sized>(board: &mut Board, rng: &mut R) -> usize {
    let holes = collapse(board);
    let filled = refill(board, rng);
    debug_assert_eq!(holes, filled);
    filled
}
