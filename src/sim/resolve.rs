//! Cascade resolution
//!
//! Runs SCAN -> CLEAR -> GRAVITY until a scan comes back empty. Each CLEAR
//! phase is reported as a `ClearEvent` before the cells are emptied, so
//! consumers still see the colors that were removed.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::board::{Board, Cell, Tile};
use super::gravity::apply_gravity;
use super::matching::{MatchSet, find_matches};
use crate::consts::PALETTE_SIZE;

/// Resolution loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolvePhase {
    /// Look for matches
    Scan,
    /// Empty the matched cells
    Clear,
    /// Collapse and refill
    Gravity,
    /// Board is stable
    Done,
}

/// One CLEAR phase: the distinct cells removed and their colors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearEvent {
    /// 0 for the swap's own match, 1+ for cascades
    pub cascade: u32,
    /// Cleared cells with the color they held, row-major
    pub tiles: Vec<(Cell, Tile)>,
}

impl ClearEvent {
    fn capture(board: &Board, cells: &MatchSet, cascade: u32) -> Self {
        Self {
            cascade,
            tiles: cells.iter().map(|&c| (c, board.get(c))).collect(),
        }
    }

    /// Number of distinct cells cleared
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Cleared cells of one color
    pub fn count_of(&self, color: Tile) -> usize {
        self.tiles.iter().filter(|(_, t)| *t == color).count()
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.tiles.iter().map(|(c, _)| *c)
    }
}

/// Totals for a full resolution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveSummary {
    /// CLEAR phases executed
    pub clears: u32,
    /// Distinct cells cleared across all phases
    pub total_matched_cells: usize,
    /// Per-color totals, indexed like `PALETTE`
    pub matched_by_color: [usize; PALETTE_SIZE],
}

impl ResolveSummary {
    fn absorb(&mut self, event: &ClearEvent) {
        self.clears += 1;
        self.total_matched_cells += event.len();
        for (_, tile) in &event.tiles {
            if let Some(i) = tile.palette_index() {
                self.matched_by_color[i] += 1;
            }
        }
    }

    /// Cells of `color` cleared across all phases
    pub fn matched_of(&self, color: Tile) -> usize {
        color
            .palette_index()
            .map(|i| self.matched_by_color[i])
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Refills kept producing matches past the cap; indicates a broken refill
    #[error("board still unstable after {limit} clear phases")]
    CascadeLimit { limit: u32 },
}

/// Step-wise resolution driver.
///
/// `step` advances exactly one phase so a presenter can pace cascades;
/// `run` drives it to `Done`.
#[derive(Debug, Clone)]
pub struct Resolver {
    phase: ResolvePhase,
    pending: MatchSet,
    summary: ResolveSummary,
    max_clears: u32,
}

impl Resolver {
    pub fn new(max_clears: u32) -> Self {
        Self {
            phase: ResolvePhase::Scan,
            pending: MatchSet::new(),
            summary: ResolveSummary::default(),
            max_clears,
        }
    }

    pub fn phase(&self) -> ResolvePhase {
        self.phase
    }

    pub fn summary(&self) -> &ResolveSummary {
        &self.summary
    }

    /// Advance one phase. Returns the clear event when the phase was CLEAR.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        board: &mut Board,
        rng: &mut R,
    ) -> Result<Option<ClearEvent>, ResolveError> {
        match self.phase {
            ResolvePhase::Scan => {
                self.pending = find_matches(board);
                if self.pending.is_empty() {
                    self.phase = ResolvePhase::Done;
                } else if self.summary.clears >= self.max_clears {
                    return Err(ResolveError::CascadeLimit {
                        limit: self.max_clears,
                    });
                } else {
                    self.phase = ResolvePhase::Clear;
                }
                Ok(None)
            }
            ResolvePhase::Clear => {
                let event = ClearEvent::capture(board, &self.pending, self.summary.clears);
                for cell in std::mem::take(&mut self.pending) {
                    board.set(cell, Tile::Empty);
                }
                self.summary.absorb(&event);
                log::debug!(
                    "cascade {}: cleared {} cells",
                    event.cascade,
                    event.len()
                );
                self.phase = ResolvePhase::Gravity;
                Ok(Some(event))
            }
            ResolvePhase::Gravity => {
                apply_gravity(board, rng);
                self.phase = ResolvePhase::Scan;
                Ok(None)
            }
            ResolvePhase::Done => Ok(None),
        }
    }

    /// Run to `Done`, handing every clear to `on_clear`
    pub fn run<R, F>(
        mut self,
        board: &mut Board,
        rng: &mut R,
        mut on_clear: F,
    ) -> Result<ResolveSummary, ResolveError>
    where
        R: Rng + ?Sized,
        F: FnMut(&ClearEvent),
    {
        while self.phase != ResolvePhase::Done {
            if let Some(event) = self.step(board, rng)? {
                on_clear(&event);
            }
        }
        Ok(self.summary)
    }
}

/// Resolve `board` to a stable state
pub fn resolve<R, F>(
    board: &mut Board,
    rng: &mut R,
    max_clears: u32,
    on_clear: F,
) -> Result<ResolveSummary, ResolveError>
where
    R: Rng + ?Sized,
    F: FnMut(&ClearEvent),
{
    Resolver::new(max_clears).run(board, rng, on_clear)
}
