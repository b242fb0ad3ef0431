//! Game session state machine
//!
//! Ready -> Playing <-> Paused -> Ended -> (start) -> Playing
//!
//! Every input (cell click, clock tick, button) is processed to completion
//! before the next one; a swap's whole cascade resolves synchronously inside
//! `request_swap`. Presentation code reads `snapshot()` and drains
//! `take_events()` after each input.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::board::{Board, Cell};
use super::resolve::{ResolveError, ResolveSummary, resolve};
use super::score::{Objective, ScoreTracker};
use super::state::{EndReason, GameEvent, GamePhase, SessionSnapshot};
use crate::highscores::{Leaderboard, LeaderboardStore};
use crate::platform::ClockHandle;
use crate::tuning::GameConfig;

/// Result of a completed swap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapReport {
    pub summary: ResolveSummary,
    /// Set when this swap ended the session
    pub ended: Option<EndReason>,
}

/// What a cell click did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Not playing, or a cascade is still settling
    Ignored,
    /// First click of a pair
    Selected(Cell),
    /// Second click: tiles swapped and resolved
    Swapped(SwapReport),
}

/// One player's game, from deal to leaderboard entry
pub struct GameSession<S: LeaderboardStore> {
    config: GameConfig,
    rng: Pcg32,
    board: Board,
    tracker: ScoreTracker,
    moves_left: i32,
    seconds_left: i32,
    phase: GamePhase,
    selected: Option<Cell>,
    busy: bool,
    end_reason: Option<EndReason>,
    leaderboard: Leaderboard,
    store: S,
    clock: Option<Box<dyn ClockHandle>>,
    events: Vec<GameEvent>,
}

impl<S: LeaderboardStore> GameSession<S> {
    /// Create a session in `Ready`, loading the leaderboard from `store`
    pub fn new(config: GameConfig, seed: u64, store: S) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let board = Self::deal(&config, &mut rng);
        let leaderboard = Leaderboard::from_entries(store.load());
        let tracker = ScoreTracker::new(
            Objective::new(config.objective_color, config.objective_target),
            config.points_per_tile,
        );
        Self {
            moves_left: config.starting_moves,
            seconds_left: config.starting_seconds,
            config,
            rng,
            board,
            tracker,
            phase: GamePhase::Ready,
            selected: None,
            busy: false,
            end_reason: None,
            leaderboard,
            store,
            clock: None,
            events: Vec::new(),
        }
    }

    fn deal(config: &GameConfig, rng: &mut Pcg32) -> Board {
        if config.deal_without_matches {
            Board::random_stable(rng)
        } else {
            Board::random(rng)
        }
    }

    /// Begin a new game from `Ready` or `Ended`. Returns false if a game is running.
    pub fn start(&mut self) -> bool {
        if !matches!(self.phase, GamePhase::Ready | GamePhase::Ended) {
            return false;
        }
        let board = Self::deal(&self.config, &mut self.rng);
        self.begin(board);
        true
    }

    /// Begin a new game on a prepared board (puzzles, replays, tests)
    pub fn start_with_board(&mut self, board: Board) -> bool {
        if !matches!(self.phase, GamePhase::Ready | GamePhase::Ended) {
            return false;
        }
        self.begin(board);
        true
    }

    /// Abandon whatever is running and start fresh. Abandoned games are not recorded.
    pub fn reset(&mut self) {
        if matches!(self.phase, GamePhase::Playing | GamePhase::Paused) {
            log::info!("Abandoning game at score {}", self.tracker.score());
        }
        let board = Self::deal(&self.config, &mut self.rng);
        self.begin(board);
    }

    fn begin(&mut self, board: Board) {
        self.cancel_clock();
        self.clock = None;
        self.board = board;
        self.tracker = ScoreTracker::new(
            Objective::new(self.config.objective_color, self.config.objective_target),
            self.config.points_per_tile,
        );
        self.moves_left = self.config.starting_moves;
        self.seconds_left = self.config.starting_seconds;
        self.selected = None;
        self.busy = false;
        self.end_reason = None;
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::Started);
        log::info!(
            "Game started: {} moves, {}s, {}",
            self.moves_left,
            self.seconds_left,
            self.tracker.objective().describe()
        );
    }

    /// Hand the session its running clock; any previous clock is cancelled
    pub fn attach_clock(&mut self, clock: Box<dyn ClockHandle>) {
        self.cancel_clock();
        self.clock = Some(clock);
    }

    fn cancel_clock(&mut self) {
        if let Some(clock) = self.clock.as_mut() {
            clock.cancel();
        }
    }

    pub fn clock_active(&self) -> bool {
        self.clock.as_ref().is_some_and(|c| c.is_active())
    }

    /// Cell click: the first click selects, the second swaps with the selection
    pub fn click(&mut self, cell: Cell) -> Result<ClickOutcome, ResolveError> {
        if !self.accepts_swaps() {
            return Ok(ClickOutcome::Ignored);
        }
        match self.selected {
            None => {
                assert!(cell.in_bounds(), "clicked cell {cell} is off the board");
                self.selected = Some(cell);
                self.events.push(GameEvent::Selected(cell));
                Ok(ClickOutcome::Selected(cell))
            }
            Some(first) => Ok(match self.request_swap(first, cell)? {
                Some(report) => ClickOutcome::Swapped(report),
                None => ClickOutcome::Ignored,
            }),
        }
    }

    /// Swap two cells, resolve cascades, spend a move and check end conditions.
    ///
    /// Returns `Ok(None)` when the session is not accepting swaps. A cascade
    /// limit error is returned after end conditions have still been applied.
    pub fn request_swap(
        &mut self,
        a: Cell,
        b: Cell,
    ) -> Result<Option<SwapReport>, ResolveError> {
        if !self.accepts_swaps() {
            return Ok(None);
        }
        self.selected = None;
        self.board.swap(a, b);
        self.events.push(GameEvent::Swapped(a, b));
        self.moves_left -= 1;

        let tracker = &mut self.tracker;
        let events = &mut self.events;
        let resolved = resolve(
            &mut self.board,
            &mut self.rng,
            self.config.max_cascades,
            |clear| {
                let outcome = tracker.on_match(clear);
                events.push(GameEvent::Cleared {
                    clear: clear.clone(),
                    points: outcome.points,
                });
            },
        );

        let ended = self.check_end();
        match resolved {
            Ok(summary) => Ok(Some(SwapReport { summary, ended })),
            Err(e) => {
                log::error!("Swap {} <-> {} failed to settle: {}", a, b, e);
                Err(e)
            }
        }
    }

    fn accepts_swaps(&self) -> bool {
        self.phase == GamePhase::Playing && !self.busy
    }

    /// One 1 Hz clock tick. Only counts down while playing.
    pub fn tick(&mut self) -> Option<EndReason> {
        if self.phase != GamePhase::Playing {
            return None;
        }
        self.seconds_left -= 1;
        self.events.push(GameEvent::Tick {
            seconds_left: self.seconds_left,
        });
        self.check_end()
    }

    pub fn pause(&mut self) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        self.phase = GamePhase::Paused;
        self.events.push(GameEvent::Paused);
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.phase != GamePhase::Paused {
            return false;
        }
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::Resumed);
        true
    }

    /// Pause button
    pub fn toggle_pause(&mut self) -> bool {
        self.pause() || self.resume()
    }

    /// Presentation flags a cascade animation in progress; swaps are ignored meanwhile
    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    fn check_end(&mut self) -> Option<EndReason> {
        if self.phase != GamePhase::Playing {
            return None;
        }
        let reason = if self.tracker.objective().is_complete() {
            EndReason::ObjectiveComplete
        } else if self.moves_left <= 0 {
            EndReason::OutOfMoves
        } else if self.seconds_left <= 0 {
            EndReason::TimeUp
        } else {
            return None;
        };
        self.finish(reason);
        Some(reason)
    }

    fn finish(&mut self, reason: EndReason) {
        self.cancel_clock();
        self.phase = GamePhase::Ended;
        self.end_reason = Some(reason);
        self.selected = None;

        let score = self.tracker.score();
        let rank = self.leaderboard.record(score);
        self.store.save(self.leaderboard.entries());
        log::info!(
            "Game over ({:?}): score {} ranked #{}",
            reason,
            score,
            rank
        );
        self.events.push(GameEvent::GameOver {
            reason,
            score,
            rank,
        });
    }

    /// Drain events raised since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Detached view for rendering
    pub fn snapshot(&self) -> SessionSnapshot {
        let objective = *self.tracker.objective();
        SessionSnapshot {
            board: self.board.clone(),
            phase: self.phase,
            score: self.tracker.score(),
            moves_left: self.moves_left,
            seconds_left: self.seconds_left,
            objective_text: objective.describe(),
            objective,
            selected: self.selected,
            busy: self.busy,
            end_reason: self.end_reason,
            leaderboard: self
                .leaderboard
                .top(self.config.leaderboard_display)
                .to_vec(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn score(&self) -> u64 {
        self.tracker.score()
    }

    pub fn moves_left(&self) -> i32 {
        self.moves_left
    }

    pub fn seconds_left(&self) -> i32 {
        self.seconds_left
    }

    pub fn objective(&self) -> &Objective {
        self.tracker.objective()
    }

    pub fn selected(&self) -> Option<Cell> {
        self.selected
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: LeaderboardStore> Drop for GameSession<S> {
    fn drop(&mut self) {
        self.cancel_clock();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::BOARD_SIZE;
    use crate::highscores::KvLeaderboardStore;
    use crate::persistence::MemoryStore;
    use crate::platform::ManualClock;
    use crate::sim::board::{PALETTE, Tile};

    type TestSession = GameSession<KvLeaderboardStore<MemoryStore>>;

    fn session(config: GameConfig) -> TestSession {
        GameSession::new(config, 1234, KvLeaderboardStore::new(MemoryStore::new()))
    }

    /// No two orthogonal neighbours share a color
    fn quiet_board() -> Board {
        let mut board = Board::default();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                board.set(Cell::new(row, col), PALETTE[(row * 2 + col) % PALETTE.len()]);
            }
        }
        board
    }

    #[test]
    fn test_new_session_is_ready() {
        let s = session(GameConfig::default());
        assert_eq!(s.phase(), GamePhase::Ready);
        assert_eq!(s.moves_left(), 20);
        assert_eq!(s.seconds_left(), 60);
        assert_eq!(s.board().count_empty(), 0);
    }

    #[test]
    fn test_clicks_ignored_before_start() {
        let mut s = session(GameConfig::default());
        assert_eq!(s.click(Cell::new(0, 0)).unwrap(), ClickOutcome::Ignored);
        assert_eq!(s.selected(), None);
    }

    #[test]
    fn test_first_click_selects_second_swaps() {
        let mut s = session(GameConfig::default());
        s.start_with_board(quiet_board());
        let a = Cell::new(0, 0);
        let b = Cell::new(0, 5); // same color as (0, 0)
        assert_eq!(s.click(a).unwrap(), ClickOutcome::Selected(a));
        assert_eq!(s.selected(), Some(a));

        match s.click(b).unwrap() {
            ClickOutcome::Swapped(report) => {
                assert_eq!(report.summary.clears, 0);
                assert_eq!(report.ended, None);
            }
            other => panic!("expected swap, got {other:?}"),
        }
        assert_eq!(s.selected(), None);
        assert_eq!(s.moves_left(), 19);
        assert_eq!(s.board(), &quiet_board());
    }

    #[test]
    fn test_matching_swap_scores() {
        let mut s = session(GameConfig::default());
        let mut board = quiet_board();
        // Row 7: _ Y Y ... with a Y dropped in from (6, 0) -> swap completes YYY
        board.set(Cell::new(7, 1), Tile::Yellow);
        board.set(Cell::new(7, 2), Tile::Yellow);
        board.set(Cell::new(6, 0), Tile::Yellow);
        board.set(Cell::new(7, 0), Tile::Red);
        board.set(Cell::new(5, 0), Tile::Blue);
        s.start_with_board(board);

        let report = s
            .request_swap(Cell::new(6, 0), Cell::new(7, 0))
            .unwrap()
            .unwrap();
        assert!(report.summary.clears >= 1);
        assert!(s.score() >= 30);
        assert_eq!(s.score(), report.summary.total_matched_cells as u64 * 10);
        assert_eq!(s.board().count_empty(), 0);

        let events = s.take_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::Cleared { .. })));
    }

    #[test]
    fn test_busy_blocks_swaps() {
        let mut s = session(GameConfig::default());
        s.start();
        s.set_busy(true);
        assert_eq!(s.click(Cell::new(1, 1)).unwrap(), ClickOutcome::Ignored);
        assert_eq!(s.request_swap(Cell::new(0, 0), Cell::new(0, 1)).unwrap(), None);
        assert_eq!(s.moves_left(), 20);
        s.set_busy(false);
        assert_eq!(
            s.click(Cell::new(1, 1)).unwrap(),
            ClickOutcome::Selected(Cell::new(1, 1))
        );
    }

    #[test]
    fn test_pause_gates_swaps_and_ticks() {
        let mut s = session(GameConfig::default());
        s.start();
        assert!(s.pause());
        assert_eq!(s.request_swap(Cell::new(0, 0), Cell::new(0, 1)).unwrap(), None);
        assert_eq!(s.tick(), None);
        assert_eq!(s.seconds_left(), 60);
        assert!(s.toggle_pause());
        assert_eq!(s.phase(), GamePhase::Playing);
        s.tick();
        assert_eq!(s.seconds_left(), 59);
    }

    #[test]
    fn test_objective_win_is_recorded() {
        let config = GameConfig {
            objective_color: Tile::Yellow,
            objective_target: 3,
            ..GameConfig::default()
        };
        let mut s = session(config);
        let mut board = quiet_board();
        board.set(Cell::new(7, 1), Tile::Yellow);
        board.set(Cell::new(7, 2), Tile::Yellow);
        board.set(Cell::new(6, 0), Tile::Yellow);
        board.set(Cell::new(7, 0), Tile::Red);
        board.set(Cell::new(5, 0), Tile::Blue);
        s.start_with_board(board);

        let report = s
            .request_swap(Cell::new(6, 0), Cell::new(7, 0))
            .unwrap()
            .unwrap();
        assert_eq!(report.ended, Some(EndReason::ObjectiveComplete));
        assert_eq!(s.phase(), GamePhase::Ended);
        assert_eq!(s.leaderboard().top_score(), Some(s.score()));
    }

    #[test]
    fn test_clock_cancelled_on_end_and_restart() {
        let config = GameConfig {
            starting_seconds: 1,
            ..GameConfig::default()
        };
        let mut s = session(config);
        s.start();
        s.attach_clock(Box::new(ManualClock::new()));
        assert!(s.clock_active());
        assert_eq!(s.tick(), Some(EndReason::TimeUp));
        assert!(!s.clock_active());
        assert_eq!(s.phase(), GamePhase::Ended);

        assert!(s.start());
        assert!(!s.clock_active());
        s.attach_clock(Box::new(ManualClock::new()));
        s.reset();
        assert!(!s.clock_active());
    }

    #[test]
    fn test_start_refused_while_playing() {
        let mut s = session(GameConfig::default());
        assert!(s.start());
        assert!(!s.start());
        assert!(s.pause());
        assert!(!s.start());
    }

    #[test]
    fn test_reset_does_not_record() {
        let mut s = session(GameConfig::default());
        s.start();
        s.reset();
        assert!(s.leaderboard().is_empty());
        assert_eq!(s.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut s = session(GameConfig::default());
        s.start();
        s.click(Cell::new(2, 2)).unwrap();
        let snap = s.snapshot();
        assert_eq!(snap.selected, Some(Cell::new(2, 2)));
        assert_eq!(snap.phase, GamePhase::Playing);
        assert_eq!(snap.objective_text, "Objective: Match 10 red tiles (0/10)");
        assert!(snap.leaderboard.is_empty());
    }
}
