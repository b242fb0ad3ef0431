//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (row-major)
//! - No rendering or platform dependencies

pub mod board;
pub mod gravity;
pub mod matching;
pub mod resolve;
pub mod score;
pub mod session;
pub mod state;

pub use board::{Board, Cell, PALETTE, Tile};
pub use gravity::{apply_gravity, collapse, refill};
pub use matching::{MatchSet, find_hint, find_matches, has_matches};
pub use resolve::{ClearEvent, ResolveError, ResolvePhase, ResolveSummary, Resolver, resolve};
pub use score::{MatchOutcome, Objective, ScoreTracker};
pub use session::{ClickOutcome, GameSession, SwapReport};
pub use state::{EndReason, GameEvent, GamePhase, SessionSnapshot};
