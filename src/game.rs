//! Top-level screen state machine
//!
//! `Game` owns the live `Session` and the in-memory `SaveRecord`. The
//! presentation layer feeds it `Command`s and frame deltas and reads back
//! `Snapshot`s; it never mutates game state directly.

use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use serde::Serialize;

use crate::consts::MAX_FRAME_DT;
use crate::persistence::{SaveRecord, SaveStore};
use crate::settings::Settings;
use crate::sim::{self, GameEvent, Inventory, Item, Session};

/// How-to-play text shown on the tutorial screen
pub const TUTORIAL_LINES: &[&str] = &[
    "Solve the falling math problems before they reach the bottom!",
    "Pick the correct answer from the three on the right.",
    "You start with 3 lives; lose one for each wrong or missed tile.",
    "Earn 1 coin for each correct answer.",
    "Open the shop to spend coins:",
    "  - Skip removes the current problem.",
    "  - Shield blocks one mistake.",
    "",
    "Controls:",
    "  shop    open/close the shop",
    "  skip    use a Skip item",
    "  quit    save and exit",
];

/// Screens of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Screen {
    Menu,
    Tutorial,
    /// Active play; the session may be over and waiting for a restart
    Playing,
    /// Shop overlay on top of a paused play
    Shop,
    Terminated,
}

/// Main menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MenuOption {
    Play,
    Tutorial,
    Quit,
}

/// Input commands from the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Command {
    SubmitAnswer(i32),
    UseSkip,
    ToggleShop,
    Buy(Item),
    Restart,
    SelectMenu(MenuOption),
    Back,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim().to_lowercase();
        let words: Vec<&str> = line.split_whitespace().collect();
        let command = match words.as_slice() {
            ["play"] => Command::SelectMenu(MenuOption::Play),
            ["tutorial" | "help"] => Command::SelectMenu(MenuOption::Tutorial),
            ["back" | "menu"] => Command::Back,
            ["quit" | "exit" | "q"] => Command::Quit,
            ["shop" | "s"] => Command::ToggleShop,
            ["skip" | "k"] => Command::UseSkip,
            ["buy", item] => Command::Buy(item.parse()?),
            ["restart" | "r"] => Command::Restart,
            [value] => value
                .parse()
                .map(Command::SubmitAnswer)
                .map_err(|_| format!("unknown command '{value}'"))?,
            _ => return Err(format!("unknown command '{}'", s.trim())),
        };
        Ok(command)
    }
}

/// A command that is not allowed on the current screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidCommand {
    pub command: Command,
    pub screen: Screen,
    pub game_over: bool,
}

impl fmt::Display for InvalidCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} is not valid on {:?}", self.command, self.screen)?;
        if self.game_over {
            write!(f, " after game over")?;
        }
        Ok(())
    }
}

impl std::error::Error for InvalidCommand {}

/// Transition table. `None` means the command is rejected on this screen.
pub fn next_screen(screen: Screen, command: &Command, game_over: bool) -> Option<Screen> {
    match (screen, command) {
        (Screen::Terminated, _) => None,
        (_, Command::Quit) => Some(Screen::Terminated),

        (Screen::Menu, Command::SelectMenu(MenuOption::Play)) => Some(Screen::Playing),
        (Screen::Menu, Command::SelectMenu(MenuOption::Tutorial)) => Some(Screen::Tutorial),
        (Screen::Menu, Command::SelectMenu(MenuOption::Quit)) => Some(Screen::Terminated),

        (Screen::Tutorial, Command::Back) => Some(Screen::Menu),

        (Screen::Playing, Command::ToggleShop) if !game_over => Some(Screen::Shop),
        (Screen::Playing, Command::SubmitAnswer(_) | Command::UseSkip) if !game_over => {
            Some(Screen::Playing)
        }
        (Screen::Playing, Command::Restart) if game_over => Some(Screen::Playing),

        (Screen::Shop, Command::ToggleShop) => Some(Screen::Playing),
        (Screen::Shop, Command::Buy(_)) => Some(Screen::Shop),

        _ => None,
    }
}

/// The active tile as the answer panel shows it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveTileView {
    pub id: u32,
    pub problem: String,
    pub choices: [i32; 3],
}

/// A queued tile's placement in the play area
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileView {
    pub id: u32,
    pub problem: String,
    pub pos: Vec2,
    pub fall_speed: f32,
    /// 0 at spawn, 1 at the bottom line
    pub progress: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceTag {
    pub item: Item,
    pub price: u32,
}

/// Read-only view of everything the presentation layer draws
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub screen: Screen,
    pub score: u32,
    pub lives: u32,
    pub coins: u32,
    pub items: Inventory,
    pub high_score: u32,
    pub game_over: bool,
    pub active: Option<ActiveTileView>,
    pub tiles: Vec<TileView>,
    pub prices: Vec<PriceTag>,
    pub spawn_interval: f32,
    pub tutorial: Option<&'static [&'static str]>,
}

/// Owns the session, the save record, and the store for one process run.
///
/// Dropping a `Game` that was not quit still writes the final save.
pub struct Game<S: SaveStore> {
    screen: Screen,
    session: Session,
    record: SaveRecord,
    store: S,
    base_seed: u64,
    sessions_started: u64,
    starting_lives: u32,
    events: Vec<GameEvent>,
}

impl<S: SaveStore> Game<S> {
    pub fn new(store: S, settings: &Settings) -> Self {
        let record = store.load();
        let base_seed = settings.resolve_seed();
        log::info!(
            "Starting with seed {} (high score {}, {} coins)",
            base_seed,
            record.high_score,
            record.coins
        );
        let starting_lives = settings.starting_lives.max(1);
        if settings.starting_lives == 0 {
            log::warn!("starting_lives must be at least 1, using 1");
        }
        let session = Session::new(
            session_seed(base_seed, 0),
            starting_lives,
            record.high_score,
            record.economy(),
        );

        let mut game = Self {
            screen: Screen::Menu,
            session,
            record,
            store,
            base_seed,
            sessions_started: 1,
            starting_lives,
            events: Vec::new(),
        };
        game.collect_events();
        game
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn is_running(&self) -> bool {
        self.screen != Screen::Terminated
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// In-memory save record; authoritative even if a disk write failed
    pub fn record(&self) -> &SaveRecord {
        &self.record
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Take the session events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Apply one command. Rejected commands change nothing.
    pub fn handle(&mut self, command: Command) -> Result<(), InvalidCommand> {
        let game_over = self.session.is_game_over();
        let next = next_screen(self.screen, &command, game_over).ok_or(InvalidCommand {
            command,
            screen: self.screen,
            game_over,
        })?;

        match command {
            Command::SubmitAnswer(value) => {
                self.session.evaluate_answer(value);
            }
            Command::UseSkip => {
                if !self.session.use_skip() {
                    log::debug!("no skip available");
                }
            }
            Command::Buy(item) => {
                if !self.session.buy(item) {
                    log::debug!("cannot afford {} ({} coins)", item, self.session.coins());
                }
            }
            Command::Restart => self.start_new_session(),
            Command::Quit | Command::SelectMenu(MenuOption::Quit) => self.flush("quit"),
            Command::ToggleShop | Command::SelectMenu(_) | Command::Back => {}
        }

        if self.screen != next {
            log::debug!("{:?} -> {:?}", self.screen, next);
        }
        self.screen = next;
        self.after_update(game_over);
        Ok(())
    }

    /// Advance play by `dt` seconds. Only the Playing screen runs the clock.
    pub fn tick(&mut self, dt: f32) {
        if self.screen != Screen::Playing {
            return;
        }
        let game_over = self.session.is_game_over();
        sim::tick(&mut self.session, dt.max(0.0));
        self.after_update(game_over);
    }

    /// One logical frame: commands in arrival order, then the clock, then a snapshot
    pub fn frame(&mut self, commands: impl IntoIterator<Item = Command>, dt: f32) -> Snapshot {
        for command in commands {
            if let Err(e) = self.handle(command) {
                log::debug!("ignored: {}", e);
            }
        }
        self.tick(dt.min(MAX_FRAME_DT));
        self.snapshot()
    }

    pub fn submit_answer(&mut self, value: i32) -> Result<(), InvalidCommand> {
        self.handle(Command::SubmitAnswer(value))
    }

    pub fn use_skip(&mut self) -> Result<(), InvalidCommand> {
        self.handle(Command::UseSkip)
    }

    pub fn toggle_shop(&mut self) -> Result<(), InvalidCommand> {
        self.handle(Command::ToggleShop)
    }

    pub fn buy(&mut self, item: Item) -> Result<(), InvalidCommand> {
        self.handle(Command::Buy(item))
    }

    pub fn restart_session(&mut self) -> Result<(), InvalidCommand> {
        self.handle(Command::Restart)
    }

    pub fn select_menu_option(&mut self, option: MenuOption) -> Result<(), InvalidCommand> {
        self.handle(Command::SelectMenu(option))
    }

    pub fn back(&mut self) -> Result<(), InvalidCommand> {
        self.handle(Command::Back)
    }

    pub fn quit(&mut self) -> Result<(), InvalidCommand> {
        self.handle(Command::Quit)
    }

    pub fn snapshot(&self) -> Snapshot {
        let session = &self.session;
        Snapshot {
            screen: self.screen,
            score: session.score(),
            lives: session.lives(),
            coins: session.coins(),
            items: session.items(),
            high_score: session.high_score(),
            game_over: session.is_game_over(),
            active: session.active_tile().map(|t| ActiveTileView {
                id: t.id,
                problem: t.problem.display(),
                choices: t.choices,
            }),
            tiles: session
                .tiles()
                .iter()
                .map(|t| TileView {
                    id: t.id,
                    problem: t.problem.display(),
                    pos: t.pos,
                    fall_speed: t.fall_speed,
                    progress: t.progress(),
                })
                .collect(),
            prices: Item::ALL
                .iter()
                .map(|&item| PriceTag {
                    item,
                    price: item.price(),
                })
                .collect(),
            spawn_interval: session.spawn_interval(),
            tutorial: (self.screen == Screen::Tutorial).then_some(TUTORIAL_LINES),
        }
    }

    fn after_update(&mut self, was_game_over: bool) {
        self.collect_events();
        if !was_game_over && self.session.is_game_over() {
            self.flush("game over");
        }
    }

    fn collect_events(&mut self) {
        self.events.extend(self.session.drain_events());
    }

    /// Fresh session seeded from the save record: score and lives reset,
    /// high score, coins, and items carried over
    fn start_new_session(&mut self) {
        let seed = session_seed(self.base_seed, self.sessions_started);
        self.sessions_started += 1;
        self.session = Session::new(
            seed,
            self.starting_lives,
            self.record.high_score,
            self.record.economy(),
        );
        log::info!("Session {} started", self.sessions_started);
    }

    /// Fold the session into the record and write it out. A failed write is
    /// logged; the in-memory record stays authoritative.
    fn flush(&mut self, reason: &str) {
        self.record.absorb(&self.session);
        if let Err(e) = self.store.save(&self.record) {
            log::warn!("Save failed on {}: {:#}", reason, e);
        }
    }
}

impl<S: SaveStore> Drop for Game<S> {
    fn drop(&mut self) {
        if self.screen != Screen::Terminated {
            self.flush("shutdown");
        }
    }
}

/// Per-session seed: distinct sessions of one run get distinct sequences
fn session_seed(base_seed: u64, index: u64) -> u64 {
    base_seed.wrapping_add(index.wrapping_mul(2654435761))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn settings() -> Settings {
        Settings {
            seed: Some(12345),
            ..Default::default()
        }
    }

    fn wrong_answer(game: &Game<MemoryStore>) -> i32 {
        let tile = game.session().active_tile().unwrap();
        *tile.choices.iter().find(|&&c| c != tile.answer()).unwrap()
    }

    #[test]
    fn test_transition_table() {
        use Screen::*;
        assert_eq!(next_screen(Menu, &Command::SelectMenu(MenuOption::Play), false), Some(Playing));
        assert_eq!(next_screen(Menu, &Command::SelectMenu(MenuOption::Tutorial), false), Some(Tutorial));
        assert_eq!(next_screen(Tutorial, &Command::Back, false), Some(Menu));
        assert_eq!(next_screen(Playing, &Command::ToggleShop, false), Some(Shop));
        assert_eq!(next_screen(Shop, &Command::ToggleShop, false), Some(Playing));
        assert_eq!(next_screen(Shop, &Command::Quit, false), Some(Terminated));

        assert_eq!(next_screen(Playing, &Command::ToggleShop, true), None);
        assert_eq!(next_screen(Playing, &Command::Restart, false), None);
        assert_eq!(next_screen(Playing, &Command::SubmitAnswer(3), true), None);
        assert_eq!(next_screen(Menu, &Command::Buy(Item::Skip), false), None);
        assert_eq!(next_screen(Playing, &Command::Buy(Item::Skip), false), None);
        assert_eq!(next_screen(Tutorial, &Command::SelectMenu(MenuOption::Play), false), None);
        assert_eq!(next_screen(Terminated, &Command::Quit, false), None);
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!("play".parse(), Ok(Command::SelectMenu(MenuOption::Play)));
        assert_eq!(" Buy Shield ".parse(), Ok(Command::Buy(Item::Shield)));
        assert_eq!("-7".parse(), Ok(Command::SubmitAnswer(-7)));
        assert_eq!("s".parse(), Ok(Command::ToggleShop));
        assert!("buy potion".parse::<Command>().is_err());
        assert!("jump".parse::<Command>().is_err());
        assert!("".parse::<Command>().is_err());
    }

    #[test]
    fn test_menu_does_not_tick() {
        let mut game = Game::new(MemoryStore::new(), &settings());
        let y = game.session().active_tile().unwrap().pos.y;
        game.tick(1.0);
        assert_eq!(game.session().active_tile().unwrap().pos.y, y);

        game.select_menu_option(MenuOption::Play).unwrap();
        game.tick(1.0);
        assert!(game.session().active_tile().unwrap().pos.y > y);
    }

    #[test]
    fn test_shop_pauses_play() {
        let mut game = Game::new(MemoryStore::new(), &settings());
        game.select_menu_option(MenuOption::Play).unwrap();
        game.toggle_shop().unwrap();
        assert_eq!(game.screen(), Screen::Shop);

        let y = game.session().active_tile().unwrap().pos.y;
        game.tick(1.0);
        assert_eq!(game.session().active_tile().unwrap().pos.y, y);

        // Answering is a Playing-only command
        let err = game.submit_answer(1).unwrap_err();
        assert_eq!(err.screen, Screen::Shop);
    }

    #[test]
    fn test_rejected_command_changes_nothing() {
        let mut game = Game::new(MemoryStore::new(), &settings());
        let before = game.snapshot();
        assert!(game.buy(Item::Skip).is_err());
        assert!(game.restart_session().is_err());
        assert!(game.back().is_err());
        assert_eq!(game.snapshot(), before);
    }

    #[test]
    fn test_tutorial_lines_only_on_tutorial() {
        let mut game = Game::new(MemoryStore::new(), &settings());
        assert!(game.snapshot().tutorial.is_none());
        game.select_menu_option(MenuOption::Tutorial).unwrap();
        assert_eq!(game.snapshot().tutorial, Some(TUTORIAL_LINES));
        game.back().unwrap();
        assert_eq!(game.screen(), Screen::Menu);
    }

    #[test]
    fn test_game_over_flushes_and_blocks_shop() {
        let store = MemoryStore::new();
        let mut game = Game::new(store.clone(), &settings());
        game.select_menu_option(MenuOption::Play).unwrap();
        for _ in 0..3 {
            let wrong = wrong_answer(&game);
            game.submit_answer(wrong).unwrap();
        }
        assert!(game.session().is_game_over());
        assert_eq!(store.writes().len(), 1);
        assert!(game.toggle_shop().is_err());
        assert!(game.use_skip().is_err());
        assert!(game.drain_events().iter().any(|e| matches!(e, GameEvent::GameOver { .. })));
    }

    #[test]
    fn test_frame_applies_commands_then_ticks() {
        let mut game = Game::new(MemoryStore::new(), &settings());
        let snap = game.frame([Command::SelectMenu(MenuOption::Play)], 0.05);
        assert_eq!(snap.screen, Screen::Playing);
        // Clock ran after the transition
        let tile = &snap.tiles[0];
        assert!(tile.pos.y > crate::consts::TILE_SPAWN_Y);

        // Oversized deltas are clamped
        let y = tile.pos.y;
        let snap = game.frame(Vec::<Command>::new(), 30.0);
        let moved = snap.tiles[0].pos.y - y;
        assert!(moved <= crate::consts::BASE_FALL_SPEED * MAX_FRAME_DT + 1e-3);
        assert_eq!(snap.lives, crate::consts::STARTING_LIVES);
    }

    #[test]
    fn test_snapshot_lists_prices() {
        let game = Game::new(MemoryStore::new(), &settings());
        let snap = game.snapshot();
        assert_eq!(
            snap.prices,
            vec![
                PriceTag { item: Item::Skip, price: 8 },
                PriceTag { item: Item::Shield, price: 15 },
            ]
        );
        let active = snap.active.unwrap();
        assert!(active.choices.contains(&game.session().active_tile().unwrap().answer()));
    }

    #[test]
    fn test_zero_starting_lives_clamped() {
        let settings = Settings {
            starting_lives: 0,
            ..settings()
        };
        let mut game = Game::new(MemoryStore::new(), &settings);
        game.select_menu_option(MenuOption::Play).unwrap();
        assert_eq!(game.session().lives(), 1);
        assert!(!game.session().is_game_over());

        let value = wrong_answer(&game);
        game.submit_answer(value).unwrap();
        assert!(game.session().is_game_over());

        // Restarted sessions use the clamped count too
        game.restart_session().unwrap();
        assert_eq!(game.session().lives(), 1);
    }

    #[test]
    fn test_session_seeds_differ() {
        assert_ne!(session_seed(7, 0), session_seed(7, 1));
        assert_eq!(session_seed(7, 0), 7);
    }
}
