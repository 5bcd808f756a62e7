//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Strict FIFO tile order
//! - No rendering, platform, or storage dependencies

pub mod difficulty;
pub mod economy;
pub mod lives;
pub mod problem;
pub mod state;
pub mod tick;
pub mod tiles;

pub use difficulty::{fall_speed, spawn_interval};
pub use economy::{Economy, Inventory, Item};
pub use lives::{LifeTracker, Penalty};
pub use problem::{Operator, Problem, generate_problem, make_choices};
pub use state::{AnswerOutcome, GameEvent, Session};
pub use tick::tick;
pub use tiles::{Tile, TileQueue};
