//! End-to-end session behaviour

use tile_match::consts::BOARD_SIZE;
use tile_match::highscores::{KvLeaderboardStore, LeaderboardEntry, LeaderboardStore};
use tile_match::persistence::{KeyValueStore, MemoryStore};
use tile_match::sim::{
    Board, Cell, ClickOutcome, EndReason, GameEvent, GamePhase, GameSession, PALETTE, Tile,
};
use tile_match::GameConfig;

type Session = GameSession<KvLeaderboardStore<MemoryStore>>;

fn session_with(config: GameConfig) -> Session {
    GameSession::new(config, 2024, KvLeaderboardStore::new(MemoryStore::new()))
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

/// Two cells on `quiet_board` holding the same color
const SAME_COLOR: (Cell, Cell) = (Cell::new(0, 0), Cell::new(0, 5));

#[test]
fn last_move_without_match_ends_out_of_moves() {
    let config = GameConfig {
        starting_moves: 1,
        ..GameConfig::default()
    };
    let mut session = session_with(config);
    assert!(session.start_with_board(quiet_board()));

    let (a, b) = SAME_COLOR;
    assert_eq!(session.click(a).unwrap(), ClickOutcome::Selected(a));
    let outcome = session.click(b).unwrap();
    let ClickOutcome::Swapped(report) = outcome else {
        panic!("expected a swap, got {outcome:?}");
    };
    assert_eq!(report.summary.total_matched_cells, 0);
    assert_eq!(report.ended, Some(EndReason::OutOfMoves));

    assert_eq!(session.moves_left(), 0);
    assert_eq!(session.phase(), GamePhase::Ended);
    assert_eq!(session.end_reason(), Some(EndReason::OutOfMoves));

    // Exactly one entry, equal to the final score
    let stored = session.store().load();
    assert_eq!(stored, vec![LeaderboardEntry { score: session.score() }]);

    let events = session.take_events();
    assert!(events.contains(&GameEvent::GameOver {
        reason: EndReason::OutOfMoves,
        score: 0,
        rank: 1,
    }));
}

#[test]
fn paused_clock_does_not_count_down() {
    let config = GameConfig {
        starting_seconds: 1,
        ..GameConfig::default()
    };
    let mut session = session_with(config);
    session.start();
    assert!(session.pause());

    assert_eq!(session.tick(), None);
    assert_eq!(session.seconds_left(), 1);
    assert_eq!(session.phase(), GamePhase::Paused);

    assert!(session.resume());
    assert_eq!(session.tick(), Some(EndReason::TimeUp));
    assert_eq!(session.seconds_left(), 0);
    assert_eq!(session.phase(), GamePhase::Ended);
    assert_eq!(session.store().load().len(), 1);
}

#[test]
fn swaps_ignored_after_game_over() {
    let config = GameConfig {
        starting_seconds: 1,
        ..GameConfig::default()
    };
    let mut session = session_with(config);
    session.start();
    session.tick();
    assert_eq!(session.phase(), GamePhase::Ended);

    let board = session.board().clone();
    assert_eq!(session.click(Cell::new(0, 0)).unwrap(), ClickOutcome::Ignored);
    assert_eq!(session.request_swap(Cell::new(0, 0), Cell::new(0, 1)).unwrap(), None);
    assert_eq!(session.board(), &board);
    assert_eq!(session.tick(), None);
}

#[test]
fn three_cell_match_scores_thirty() {
    let mut session = session_with(GameConfig::default());
    let mut board = quiet_board();
    // Row 0 reads R B G Y P R B G; bring a third G next to (0, 2)
    board.set(Cell::new(0, 3), Tile::Green);
    board.set(Cell::new(0, 4), Tile::Red);
    board.set(Cell::new(1, 4), Tile::Green);
    board.set(Cell::new(0, 1), Tile::Purple);
    session.start_with_board(board);

    session.request_swap(Cell::new(0, 4), Cell::new(1, 4)).unwrap();
    let events = session.take_events();
    let first = events
        .iter()
        .find_map(|e| match e {
            GameEvent::Cleared { clear, points } if clear.cascade == 0 => {
                Some((clear.len(), *points))
            }
            _ => None,
        })
        .expect("initial clear");
    assert_eq!(first, (3, 30));
}

#[test]
fn objective_counts_only_target_color() {
    let config = GameConfig {
        objective_color: Tile::Red,
        objective_target: 100,
        ..GameConfig::default()
    };
    let mut session = session_with(config);
    // Row 0 becomes RRR + blue column run in one swap's first clear
    let mut board = quiet_board();
    for col in 0..3 {
        board.set(Cell::new(0, col), Tile::Red);
    }
    for row in 1..4 {
        board.set(Cell::new(row, 7), Tile::Blue);
    }
    session.start_with_board(board);

    // Any swap triggers resolution of the pre-placed runs
    let report = session
        .request_swap(Cell::new(7, 0), Cell::new(7, 0))
        .unwrap()
        .expect("playing");
    let events = session.take_events();
    let first = events
        .iter()
        .find_map(|e| match e {
            GameEvent::Cleared { clear, .. } if clear.cascade == 0 => Some(clear.clone()),
            _ => None,
        })
        .expect("initial clear");
    assert_eq!(first.count_of(Tile::Red), 3);
    assert_eq!(first.count_of(Tile::Blue), 3);
    assert_eq!(
        session.objective().progress as usize,
        report.summary.matched_of(Tile::Red)
    );
}

#[test]
fn leaderboard_survives_sessions() {
    let mut kv = MemoryStore::new();
    kv.set_item("leaderboard", r#"[{"score":500}]"#).unwrap();

    let config = GameConfig {
        starting_seconds: 1,
        ..GameConfig::default()
    };
    let mut session = GameSession::new(config, 7, KvLeaderboardStore::new(kv));
    assert_eq!(session.leaderboard().top_score(), Some(500));

    session.start();
    session.tick();
    let stored = session.store().load();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].score, 500);
    assert_eq!(session.snapshot().leaderboard.len(), 2);
}

#[test]
fn corrupt_leaderboard_starts_empty() {
    let kv = MemoryStore::with_item("leaderboard", "this is not json");
    let session = GameSession::new(GameConfig::default(), 1, KvLeaderboardStore::new(kv));
    assert!(session.leaderboard().is_empty());
}

#[test]
fn snapshot_shows_top_five() {
    let kv = MemoryStore::with_item(
        "leaderboard",
        r#"[{"score":1},{"score":7},{"score":3},{"score":9},{"score":5},{"score":2},{"score":8}]"#,
    );
    let session = GameSession::new(GameConfig::default(), 1, KvLeaderboardStore::new(kv));
    let scores: Vec<u64> = session.snapshot().leaderboard.iter().map(|e| e.score).collect();
    assert_eq!(scores, vec![9, 8, 7, 5, 3]);
    assert_eq!(session.leaderboard().len(), 7);
}
