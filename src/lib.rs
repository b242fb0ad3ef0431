//! Tile Match - A swap-and-match puzzle game
//!
//! Core modules:
//! - `sim`: Board model, match/gravity/cascade engine, session state machine
//! - `highscores`: Persisted leaderboard
//! - `persistence`: Key-value storage backends (LocalStorage, files, memory)
//! - `platform`: Browser/native platform abstraction (clock handles)
//! - `tuning`: Data-driven game rules
//! - `settings`: Player preferences
//! - `audio`: Sound effects

pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::{KvLeaderboardStore, Leaderboard, LeaderboardEntry, LeaderboardStore};
pub use settings::Settings;
pub use tuning::GameConfig;

/// Game configuration constants
pub mod consts {
    /// Board is BOARD_SIZE x BOARD_SIZE cells
    pub const BOARD_SIZE: usize = 8;
    /// Number of distinct tile colors
    pub const PALETTE_SIZE: usize = 5;
    /// Shortest run that counts as a match
    pub const MIN_MATCH: usize = 3;

    /// Session defaults
    pub const STARTING_MOVES: i32 = 20;
    pub const STARTING_SECONDS: i32 = 60;
    pub const OBJECTIVE_TARGET: u32 = 10;
    pub const POINTS_PER_TILE: u64 = 10;

    /// Upper bound on CLEAR phases per resolution
    pub const MAX_CASCADES: u32 = 50;

    /// Leaderboard rows shown to the player
    pub const LEADERBOARD_DISPLAY: usize = 5;

    /// Clock period (1 Hz)
    pub const CLOCK_PERIOD_MS: i32 = 1000;
}
