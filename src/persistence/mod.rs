//! Save/load persistence
//!
//! Features:
//! - JSON save record (high score, coins, items)
//! - Atomic replace (tmp → save)
//! - Corrupt or missing saves degrade to the default record

pub mod memory;
pub mod record;
pub mod store;

pub use memory::MemoryStore;
pub use record::SaveRecord;
pub use store::{JsonFileStore, SaveStore, data_dir};
