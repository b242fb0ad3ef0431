//! Tile Match entry point
//!
//! Web: wires the DOM board, buttons, audio and the 1 Hz clock to a
//! `GameSession`. Native: plays a headless game using move hints.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element};

    use tile_match::audio::{AudioManager, AudioSink};
    use tile_match::consts::{BOARD_SIZE, CLOCK_PERIOD_MS};
    use tile_match::highscores::format_entry;
    use tile_match::persistence::{KeyValueStore, LocalStorage, MemoryStore};
    use tile_match::platform::IntervalClock;
    use tile_match::sim::{Cell, GameEvent, GamePhase, GameSession, find_hint};
    use tile_match::{GameConfig, KvLeaderboardStore, Settings};

    type Store = KvLeaderboardStore<Box<dyn KeyValueStore>>;

    /// Game instance holding all state
    struct Game {
        session: GameSession<Store>,
        settings: Settings,
        prefs: Box<dyn KeyValueStore>,
        audio: AudioManager,
        document: Document,
        tiles: Vec<Element>,
    }

    fn open_storage() -> Box<dyn KeyValueStore> {
        match LocalStorage::open() {
            Some(storage) => Box::new(storage),
            None => {
                log::warn!("LocalStorage unavailable - leaderboard will not persist");
                Box::new(MemoryStore::new())
            }
        }
    }

    impl Game {
        fn new(document: Document, seed: u64) -> Self {
            let prefs = open_storage();
            let settings = Settings::load(&prefs);
            let store = KvLeaderboardStore::new(open_storage());
            Self {
                session: GameSession::new(GameConfig::default(), seed, store),
                audio: AudioManager::new(&settings),
                settings,
                prefs,
                document,
                tiles: Vec::with_capacity(BOARD_SIZE * BOARD_SIZE),
            }
        }

        /// Flip mute, persist it, and push it into the audio manager
        fn toggle_mute(&mut self) {
            let muted = self.settings.toggle_mute();
            self.settings.save(&mut self.prefs);
            self.audio.apply_settings(&self.settings);
            log::info!("Sound {}", if muted { "muted" } else { "unmuted" });
        }

        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        /// Push the current snapshot into the DOM
        fn render(&self) {
            let snap = self.session.snapshot();
            let hint = if self.settings.show_hints && snap.phase == GamePhase::Playing {
                find_hint(&snap.board)
            } else {
                None
            };

            for (cell, tile) in snap.board.iter() {
                let Some(el) = self.tiles.get(cell.row * BOARD_SIZE + cell.col) else {
                    continue;
                };
                let mut class = format!("tile {}", tile);
                if snap.selected == Some(cell) {
                    class.push_str(" selected");
                }
                if hint.is_some_and(|(a, b)| a == cell || b == cell) {
                    class.push_str(" hint");
                }
                el.set_class_name(&class);
            }

            self.set_text("score", &snap.score.to_string());
            self.set_text("moves", &snap.moves_left.to_string());
            self.set_text("timer", &snap.seconds_left.to_string());
            self.set_text("objective", &snap.objective_text);
            self.set_text(
                "pause-game",
                if snap.phase == GamePhase::Paused { "Resume" } else { "Pause" },
            );
            self.set_text(
                "mute-sound",
                if self.settings.muted { "Unmute" } else { "Mute" },
            );

            if let Some(list) = self.document.get_element_by_id("leaderboard-list") {
                let html: String = snap
                    .leaderboard
                    .iter()
                    .map(|e| format!("<li>{}</li>", format_entry(e)))
                    .collect();
                list.set_inner_html(&html);
            }
        }

        /// Play sounds and surface messages for queued events.
        /// Returns the number of clear phases seen.
        fn flush_events(&mut self) -> u32 {
            let mut clears = 0;
            for event in self.session.take_events() {
                if let Some(effect) = event.sound() {
                    self.audio.play(effect);
                }
                match event {
                    GameEvent::Cleared { .. } => clears += 1,
                    GameEvent::GameOver { reason, score, rank } => {
                        log::info!("{} score {} (#{})", reason.message(), score, rank);
                        if let Some(window) = web_sys::window() {
                            let _ = window.alert_with_message(reason.message());
                        }
                    }
                    _ => {}
                }
            }
            clears
        }
    }

    /// Process queued events, render, and hold the board busy while cascades "fall"
    fn settle(game: &Rc<RefCell<Game>>) {
        let delay = {
            let mut g = game.borrow_mut();
            let clears = g.flush_events();
            let playing = g.session.phase() == GamePhase::Playing;
            g.audio.set_music(playing);
            g.render();
            if clears == 0 || !g.settings.animate_cascades {
                return;
            }
            g.session.set_busy(true);
            g.settings.cascade_delay_for(clears)
        };

        let weak = Rc::downgrade(game);
        let done = Closure::once_into_js(move || {
            if let Some(game) = weak.upgrade() {
                let mut g = game.borrow_mut();
                g.session.set_busy(false);
                g.render();
            }
        });
        if let Some(window) = web_sys::window() {
            let _ = window
                .set_timeout_with_callback_and_timeout_and_arguments_0(done.unchecked_ref(), delay);
        }
    }

    fn start_clock(game: &Rc<RefCell<Game>>) {
        let weak: Weak<RefCell<Game>> = Rc::downgrade(game);
        let callback = Closure::<dyn FnMut()>::new(move || {
            if let Some(game) = weak.upgrade() {
                game.borrow_mut().session.tick();
                settle(&game);
            }
        });
        match IntervalClock::start(CLOCK_PERIOD_MS, callback) {
            Some(clock) => game.borrow_mut().session.attach_clock(Box::new(clock)),
            None => log::error!("Failed to start game clock"),
        }
    }

    fn build_board(game: &Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let document = game.borrow().document.clone();
        let container = document
            .get_element_by_id("game-board")
            .ok_or_else(|| JsValue::from_str("missing #game-board"))?;
        container.set_inner_html("");

        let mut tiles = Vec::with_capacity(BOARD_SIZE * BOARD_SIZE);
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let tile = document.create_element("div")?;
                tile.set_attribute("data-row", &row.to_string())?;
                tile.set_attribute("data-col", &col.to_string())?;

                let game_ref = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                    let result = game_ref.borrow_mut().session.click(Cell::new(row, col));
                    if let Err(e) = result {
                        log::error!("{}", e);
                    }
                    settle(&game_ref);
                });
                tile.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
                closure.forget();

                container.append_child(&tile)?;
                tiles.push(tile);
            }
        }
        game.borrow_mut().tiles = tiles;
        Ok(())
    }

    fn on_click(document: &Document, id: &str, mut handler: impl FnMut() + 'static) {
        if let Some(btn) = document.get_element_by_id(id) {
            let closure =
                Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| handler());
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(game: &Rc<RefCell<Game>>) {
        let document = game.borrow().document.clone();

        let g = game.clone();
        on_click(&document, "start-game", move || {
            let started = g.borrow_mut().session.start();
            if started {
                start_clock(&g);
            }
            settle(&g);
        });

        let g = game.clone();
        on_click(&document, "reset-game", move || {
            g.borrow_mut().session.reset();
            start_clock(&g);
            settle(&g);
        });

        let g = game.clone();
        on_click(&document, "pause-game", move || {
            g.borrow_mut().session.toggle_pause();
            settle(&g);
        });

        let g = game.clone();
        on_click(&document, "mute-sound", move || {
            g.borrow_mut().toggle_mute();
            settle(&g);
        });
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).ok();

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let seed = js_sys::Date::now() as u64;
        log::info!("Tile Match starting with seed {}", seed);

        let game = Rc::new(RefCell::new(Game::new(document, seed)));
        build_board(&game)?;
        setup_buttons(&game);

        game.borrow_mut().session.start();
        start_clock(&game);
        settle(&game);
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use tile_match::audio::{AudioSink, SilentAudio};
    use tile_match::persistence::FileStore;
    use tile_match::platform::ManualClock;
    use tile_match::sim::{Cell, GameEvent, GamePhase, GameSession, find_hint};
    use tile_match::{GameConfig, KvLeaderboardStore};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0)
        });
    let data_dir = std::env::var("TILE_MATCH_DATA").unwrap_or_else(|_| ".tile-match".to_string());
    log::info!("Tile Match (native autoplay) seed {} data {}", seed, data_dir);

    let config = match std::env::var("TILE_MATCH_CONFIG") {
        Ok(path) => load_config(&path),
        Err(_) => GameConfig::default(),
    };

    let store = KvLeaderboardStore::new(FileStore::new(data_dir));
    let mut session = GameSession::new(config, seed, store);
    let audio = SilentAudio;

    session.start();
    session.attach_clock(Box::new(ManualClock::new()));

    while session.phase() == GamePhase::Playing {
        let (a, b) = find_hint(session.board()).unwrap_or((Cell::new(0, 0), Cell::new(0, 1)));
        for cell in [a, b] {
            if let Err(e) = session.click(cell) {
                log::error!("{}", e);
            }
        }
        // Each move takes the bot two seconds
        session.tick();
        session.tick();

        for event in session.take_events() {
            if let Some(effect) = event.sound() {
                audio.play(effect);
            }
            match event {
                GameEvent::Cleared { clear, points } => {
                    log::info!("cascade {}: {} tiles, +{}", clear.cascade, clear.len(), points)
                }
                GameEvent::GameOver { reason, score, rank } => {
                    println!("{} Final score {} (rank #{})", reason.message(), score, rank)
                }
                _ => {}
            }
        }
    }

    let snap = session.snapshot();
    println!("\n{}", snap.board);
    println!("{}", snap.objective_text);
    println!("Leaderboard:");
    for (i, entry) in snap.leaderboard.iter().enumerate() {
        println!("  {}. {} points", i + 1, entry.score);
    }
}

/// Read rules from a JSON file, keeping defaults when it cannot be used
#[cfg(not(target_arch = "wasm32"))]
fn load_config(path: &str) -> tile_match::GameConfig {
    use tile_match::GameConfig;

    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|json| GameConfig::from_json(&json).map_err(|e| e.to_string()));
    match parsed {
        Ok(config) => {
            log::info!("Loaded rules from {}", path);
            config
        }
        Err(e) => {
            log::warn!("Ignoring config {}: {}", path, e);
            GameConfig::default()
        }
    }
}
