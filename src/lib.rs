//! Math Tiles - a timed arithmetic arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (problems, falling tiles, economy, lives)
//! - `game`: Top-level screen state machine and command surface
//! - `persistence`: Save record load/store
//! - `settings`: Player configuration
//! - `input`: Raw-mode keyboard input for the terminal driver

pub mod game;
pub mod input;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use game::{Command, Game, InvalidCommand, MenuOption, Screen, Snapshot};
pub use persistence::{JsonFileStore, MemoryStore, SaveRecord, SaveStore};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Display refresh rate the driver aims for
    pub const FPS: u32 = 60;
    /// Largest delta a single frame may advance (stalled terminals, debuggers)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Lives at the start of every session
    pub const STARTING_LIVES: u32 = 3;

    /// Fall speed at score 0 (pixels/s)
    pub const BASE_FALL_SPEED: f32 = 60.0;
    /// Extra fall speed per point of score
    pub const SPEED_PER_SCORE: f32 = 3.0;

    /// Seconds between spawns at score 0
    pub const SPAWN_INTERVAL_BASE: f32 = 2.0;
    /// Spawn interval floor
    pub const SPAWN_INTERVAL_MIN: f32 = 0.5;
    /// Spawn interval reduction per point of score
    pub const SPAWN_ACCEL_PER_SCORE: f32 = 0.03;

    /// Shop prices (coins)
    pub const COST_SKIP: u32 = 8;
    pub const COST_SHIELD: u32 = 15;

    /// Play area: a tile whose top edge passes this line is missed
    pub const PLAY_AREA_BOTTOM: f32 = 600.0;
    /// Tiles enter above the visible area at a fixed column
    pub const TILE_SPAWN_X: f32 = 40.0;
    pub const TILE_SPAWN_Y: f32 = -80.0;
    pub const TILE_WIDTH: f32 = 300.0;
    pub const TILE_HEIGHT: f32 = 70.0;

    /// Operand range for +, -, ×, and the divisor of ÷
    pub const OPERAND_MIN: i32 = 1;
    pub const OPERAND_MAX: i32 = 12;
    /// Largest quotient of a division problem
    pub const QUOTIENT_MAX: i32 = 6;

    /// Number of answer candidates shown per tile
    pub const CHOICE_COUNT: usize = 3;
    /// Wrong answers are drawn within ± this of the correct one
    pub const CHOICE_SPREAD: i32 = 10;
    /// Wrong answers stay inside [-CHOICE_BOUND, CHOICE_BOUND] when possible
    pub const CHOICE_BOUND: i32 = 100;
    /// Random draws before falling back to fixed offsets
    pub const MAX_CHOICE_ATTEMPTS: u32 = 64;
}
