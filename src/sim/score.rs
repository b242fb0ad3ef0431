//! Score and objective tracking

use serde::{Deserialize, Serialize};

use super::board::Tile;
use super::resolve::ClearEvent;

/// Per-session goal: clear `target` tiles of `color`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub color: Tile,
    pub target: u32,
    pub progress: u32,
}

impl Objective {
    pub fn new(color: Tile, target: u32) -> Self {
        Self {
            color,
            target,
            progress: 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= self.target
    }

    /// HUD text, e.g. "Objective: Match 10 red tiles (3/10)"
    pub fn describe(&self) -> String {
        format!(
            "Objective: Match {} {} tiles ({}/{})",
            self.target, self.color, self.progress, self.target
        )
    }
}

/// What a single clear contributed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    pub points: u64,
    pub objective_gained: u32,
    /// Objective reached (or already reached) after this clear
    pub objective_complete: bool,
}

/// Consumes clear events into score and objective progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreTracker {
    score: u64,
    points_per_tile: u64,
    objective: Objective,
}

impl ScoreTracker {
    pub fn new(objective: Objective, points_per_tile: u64) -> Self {
        Self {
            score: 0,
            points_per_tile,
            objective,
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    /// Apply one CLEAR phase. Every distinct cell is worth `points_per_tile`;
    /// only cells of the objective color advance the objective.
    pub fn on_match(&mut self, clear: &ClearEvent) -> MatchOutcome {
        let points = clear.len() as u64 * self.points_per_tile;
        let gained = clear.count_of(self.objective.color) as u32;

        self.score += points;
        self.objective.progress += gained;

        MatchOutcome {
            points,
            objective_gained: gained,
            objective_complete: self.objective.is_complete(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::POINTS_PER_TILE;
    use crate::sim::board::Cell;

    fn clear_of(tiles: &[(usize, usize, Tile)]) -> ClearEvent {
        ClearEvent {
            cascade: 0,
            tiles: tiles
                .iter()
                .map(|&(r, c, t)| (Cell::new(r, c), t))
                .collect(),
        }
    }

    #[test]
    fn test_three_cells_score_thirty() {
        let mut tracker = ScoreTracker::new(Objective::new(Tile::Red, 10), POINTS_PER_TILE);
        let outcome = tracker.on_match(&clear_of(&[
            (0, 0, Tile::Blue),
            (0, 1, Tile::Blue),
            (0, 2, Tile::Blue),
        ]));
        assert_eq!(outcome.points, 30);
        assert_eq!(tracker.score(), 30);
        assert_eq!(tracker.objective().progress, 0);
    }

    #[test]
    fn test_objective_counts_only_target_color() {
        let mut tracker = ScoreTracker::new(Objective::new(Tile::Red, 10), POINTS_PER_TILE);
        let outcome = tracker.on_match(&clear_of(&[
            (0, 0, Tile::Red),
            (0, 1, Tile::Red),
            (0, 2, Tile::Red),
            (5, 0, Tile::Blue),
            (6, 0, Tile::Blue),
            (7, 0, Tile::Blue),
        ]));
        assert_eq!(outcome.objective_gained, 3);
        assert_eq!(tracker.objective().progress, 3);
        assert_eq!(tracker.score(), 60);
        assert!(!outcome.objective_complete);
    }

    #[test]
    fn test_objective_completion_signalled() {
        let mut tracker = ScoreTracker::new(Objective::new(Tile::Green, 3), POINTS_PER_TILE);
        let outcome = tracker.on_match(&clear_of(&[
            (1, 1, Tile::Green),
            (2, 1, Tile::Green),
            (3, 1, Tile::Green),
        ]));
        assert!(outcome.objective_complete);
    }

    #[test]
    fn test_describe() {
        let mut objective = Objective::new(Tile::Red, 10);
        objective.progress = 3;
        assert_eq!(objective.describe(), "Objective: Match 10 red tiles (3/10)");
    }
}
