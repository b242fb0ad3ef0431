//! Data-driven game rules
//!
//! Board dimensions and palette size are compile-time constants (see
//! `consts`); everything a level designer might want to vary lives here.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::Tile;

/// Rules for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Swaps allowed per session
    pub starting_moves: i32,
    /// Session length in clock ticks (seconds)
    pub starting_seconds: i32,
    /// Color the objective asks for
    pub objective_color: Tile,
    /// Tiles of `objective_color` needed to win
    pub objective_target: u32,
    /// Score per distinct cleared cell
    pub points_per_tile: u64,
    /// CLEAR phases allowed per resolution before it is treated as a fault
    pub max_cascades: u32,
    /// Leaderboard rows exposed in snapshots
    pub leaderboard_display: usize,
    /// Deal boards that start without any match
    pub deal_without_matches: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_moves: STARTING_MOVES,
            starting_seconds: STARTING_SECONDS,
            objective_color: Tile::Red,
            objective_target: OBJECTIVE_TARGET,
            points_per_tile: POINTS_PER_TILE,
            max_cascades: MAX_CASCADES,
            leaderboard_display: LEADERBOARD_DISPLAY,
            deal_without_matches: true,
        }
    }
}

impl GameConfig {
    /// Parse from JSON, falling back to defaults for missing fields
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
