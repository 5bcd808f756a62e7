//! Session state and the per-answer rules
//!
//! A `Session` is one continuous play attempt. Once it is over, score,
//! lives, and tiles are frozen until a new session replaces it.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty::spawn_interval;
use super::economy::{Economy, Inventory, Item};
use super::lives::{LifeTracker, Penalty};
use super::problem::{generate_problem, make_choices};
use super::tiles::{Tile, TileQueue};

/// Something that happened during an update, for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    TileSpawned { id: u32 },
    Correct { id: u32, score: u32 },
    Wrong { id: u32, selected: i32 },
    Missed { id: u32 },
    ShieldAbsorbed,
    LifeLost { remaining: u32 },
    GameOver { score: u32, high_score: u32 },
    Skipped { id: u32 },
    Purchased { item: Item },
}

/// Outcome of submitting an answer for the active tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Wrong(Penalty),
}

/// One play attempt: score, lives, falling tiles, and the wallet it started with
#[derive(Debug, Clone)]
pub struct Session {
    /// Seed the session RNG was created from
    pub seed: u64,
    pub(super) rng: Pcg32,
    pub(super) score: u32,
    pub(super) lives: LifeTracker,
    pub(super) high_score: u32,
    pub(super) economy: Economy,
    pub(super) tiles: TileQueue,
    pub(super) spawn_timer: f32,
    pub(super) spawn_interval: f32,
    pub(super) game_over: bool,
    pub(super) events: Vec<GameEvent>,
    next_id: u32,
}

impl Session {
    /// Start a session with at least one life. The first tile is spawned immediately.
    pub fn new(seed: u64, lives: u32, high_score: u32, economy: Economy) -> Self {
        let mut session = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            score: 0,
            lives: LifeTracker::new(lives.max(1)),
            high_score,
            economy,
            tiles: TileQueue::new(),
            spawn_timer: 0.0,
            spawn_interval: spawn_interval(0),
            game_over: false,
            events: Vec::new(),
            next_id: 1,
        };
        session.spawn_tile();
        session
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives.lives()
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn coins(&self) -> u32 {
        self.economy.coins
    }

    pub fn items(&self) -> Inventory {
        self.economy.items
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn tiles(&self) -> &TileQueue {
        &self.tiles
    }

    pub fn active_tile(&self) -> Option<&Tile> {
        self.tiles.active()
    }

    pub fn spawn_interval(&self) -> f32 {
        self.spawn_interval
    }

    pub fn spawn_timer(&self) -> f32 {
        self.spawn_timer
    }

    /// Take the events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Append a fresh tile at the tail of the queue
    pub fn spawn_tile(&mut self) {
        let problem = generate_problem(&mut self.rng);
        let choices = make_choices(&mut self.rng, problem.answer);
        let id = self.next_id;
        self.next_id += 1;

        log::debug!("spawn tile {}: {} (score {})", id, problem, self.score);
        self.tiles.push(Tile::new(id, problem, choices, self.score));
        self.events.push(GameEvent::TileSpawned { id });
    }

    /// Check `selected` against the active tile.
    ///
    /// Returns `None` when there is nothing to answer or the session is over.
    pub fn evaluate_answer(&mut self, selected: i32) -> Option<AnswerOutcome> {
        if self.game_over {
            return None;
        }
        let (id, answer) = self.tiles.active().map(|t| (t.id, t.answer()))?;

        if selected == answer {
            self.tiles.pop_active();
            self.score += 1;
            self.economy.earn(1);
            self.spawn_interval = spawn_interval(self.score);
            self.events.push(GameEvent::Correct {
                id,
                score: self.score,
            });
            Some(AnswerOutcome::Correct)
        } else {
            self.events.push(GameEvent::Wrong { id, selected });
            Some(AnswerOutcome::Wrong(self.apply_penalty()))
        }
    }

    /// Wrong answer or miss: spend a shield, else a life. Losing the last
    /// life ends the session and folds the score into the high score.
    pub fn apply_penalty(&mut self) -> Penalty {
        let penalty = self.lives.apply_penalty(&mut self.economy.items);
        match penalty {
            Penalty::Shielded => self.events.push(GameEvent::ShieldAbsorbed),
            Penalty::LifeLost { remaining } => {
                self.events.push(GameEvent::LifeLost { remaining });
            }
            Penalty::Fatal => {
                self.game_over = true;
                self.high_score = self.high_score.max(self.score);
                self.events.push(GameEvent::LifeLost { remaining: 0 });
                self.events.push(GameEvent::GameOver {
                    score: self.score,
                    high_score: self.high_score,
                });
                log::info!(
                    "game over: score {}, high score {}",
                    self.score,
                    self.high_score
                );
            }
        }
        penalty
    }

    /// Spend a skip to discard the active tile. No score, no coins, no penalty.
    pub fn use_skip(&mut self) -> bool {
        if self.game_over || self.tiles.is_empty() {
            return false;
        }
        if !self.economy.items.take(Item::Skip) {
            return false;
        }
        if let Some(tile) = self.tiles.pop_active() {
            self.events.push(GameEvent::Skipped { id: tile.id });
        }
        true
    }

    /// Shop purchase; unaffordable purchases change nothing
    pub fn buy(&mut self, item: Item) -> bool {
        let bought = self.economy.buy(item);
        if bought {
            self.events.push(GameEvent::Purchased { item });
        }
        bought
    }
}
