//! Session phases, events and read-only snapshots

use serde::{Deserialize, Serialize};

use super::board::{Board, Cell};
use super::resolve::ClearEvent;
use super::score::Objective;
use crate::audio::SoundEffect;
use crate::highscores::LeaderboardEntry;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No game running yet
    Ready,
    /// Accepting clicks and clock ticks
    Playing,
    /// Clicks and ticks ignored until resumed
    Paused,
    /// Session finished. Stands in for READY until `start` so the result stays visible
    Ended,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    ObjectiveComplete,
    OutOfMoves,
    TimeUp,
}

impl EndReason {
    /// Player-facing message
    pub fn message(&self) -> &'static str {
        match self {
            EndReason::ObjectiveComplete => "Objective Complete!",
            EndReason::OutOfMoves => "Out of moves!",
            EndReason::TimeUp => "Time's up!",
        }
    }

    pub fn is_win(&self) -> bool {
        matches!(self, EndReason::ObjectiveComplete)
    }
}

/// Things the presentation layer should react to, in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Started,
    Selected(Cell),
    Swapped(Cell, Cell),
    Cleared { clear: ClearEvent, points: u64 },
    Paused,
    Resumed,
    Tick { seconds_left: i32 },
    GameOver { reason: EndReason, score: u64, rank: usize },
}

impl GameEvent {
    /// Sound cue for this event, if any
    pub fn sound(&self) -> Option<SoundEffect> {
        match self {
            GameEvent::Swapped(..) => Some(SoundEffect::Swap),
            GameEvent::Cleared { clear, .. } if clear.cascade > 0 => Some(SoundEffect::Cascade),
            GameEvent::Cleared { .. } => Some(SoundEffect::Match),
            GameEvent::GameOver { reason, .. } if reason.is_win() => {
                Some(SoundEffect::ObjectiveComplete)
            }
            GameEvent::GameOver { .. } => Some(SoundEffect::GameOver),
            _ => None,
        }
    }
}

/// Everything a renderer needs, detached from the live session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub board: Board,
    pub phase: GamePhase,
    pub score: u64,
    pub moves_left: i32,
    pub seconds_left: i32,
    pub objective: Objective,
    pub objective_text: String,
    pub selected: Option<Cell>,
    pub busy: bool,
    pub end_reason: Option<EndReason>,
    pub leaderboard: Vec<LeaderboardEntry>,
}
