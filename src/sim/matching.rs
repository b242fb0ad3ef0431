//! Match detection
//!
//! A match is a run of at least `MIN_MATCH` identical non-empty tiles in a row
//! or column. Detection slides a 3-wide window over every row and column; a run
//! of four or more is covered by several overlapping windows, and collecting the
//! cells into a set counts each of them once.

use std::collections::BTreeSet;

use super::board::{Board, Cell, Tile};
use crate::consts::{BOARD_SIZE, MIN_MATCH};

/// Distinct cells taking part in at least one match, in row-major order
pub type MatchSet = BTreeSet<Cell>;

/// True if the three tiles form a window of the same color
#[inline]
fn is_window(a: Tile, b: Tile, c: Tile) -> bool {
    !a.is_empty() && a == b && a == c
}

/// Every cell that belongs to a horizontal or vertical run of 3+.
///
/// Pure query; the board is not modified.
pub fn find_matches(board: &Board) -> MatchSet {
    let mut matched = MatchSet::new();

    // Horizontal windows
    for row in 0..BOARD_SIZE {
        for col in 0..=BOARD_SIZE - MIN_MATCH {
            let cells = [
                Cell::new(row, col),
                Cell::new(row, col + 1),
                Cell::new(row, col + 2),
            ];
            if is_window(board.get(cells[0]), board.get(cells[1]), board.get(cells[2])) {
                matched.extend(cells);
            }
        }
    }

    // Vertical windows
    for col in 0..BOARD_SIZE {
        for row in 0..=BOARD_SIZE - MIN_MATCH {
            let cells = [
                Cell::new(row, col),
                Cell::new(row + 1, col),
                Cell::new(row + 2, col),
            ];
            if is_window(board.get(cells[0]), board.get(cells[1]), board.get(cells[2])) {
                matched.extend(cells);
            }
        }
    }

    matched
}

/// Whether the board currently holds any match
pub fn has_matches(board: &Board) -> bool {
    !find_matches(board).is_empty()
}

/// First swap of two orthogonal neighbours that would produce a match.
///
/// Scans row-major, trying the right neighbour before the one below.
pub fn find_hint(board: &Board) -> Option<(Cell, Cell)> {
    let mut scratch = board.clone();
    for row in 0..BOARD_SIZE {
        for col in 0..BOARD_SIZE {
            let a = Cell::new(row, col);
            let neighbours = [
                (col + 1 < BOARD_SIZE).then(|| Cell::new(row, col + 1)),
                (row + 1 < BOARD_SIZE).then(|| Cell::new(row + 1, col)),
            ];
            for b in neighbours.into_iter().flatten() {
                if board.get(a) == board.get(b) {
                    continue;
                }
                scratch.swap(a, b);
                let found = has_matches(&scratch);
                scratch.swap(a, b);
                if found {
                    return Some((a, b));
                }
            }
        }
    }
    None
}
