//! The durable save record
//!
//! Persisted as JSON:
//! `{"high_score": n, "coins": n, "items": {"skip": n, "shield": n}}`.
//! Missing keys fall back to zero.

use serde::{Deserialize, Serialize};

use crate::sim::{Economy, Inventory, Session};

/// Progress that survives across sessions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRecord {
    #[serde(default)]
    pub high_score: u32,
    #[serde(default)]
    pub coins: u32,
    #[serde(default)]
    pub items: Inventory,
}

impl SaveRecord {
    /// Wallet a new session starts with
    pub fn economy(&self) -> Economy {
        Economy::new(self.coins, self.items)
    }

    /// Fold a session's outcome into the record. The high score only ever
    /// grows: it becomes the max of every prior value and the session score.
    pub fn absorb(&mut self, session: &Session) {
        self.high_score = self
            .high_score
            .max(session.high_score())
            .max(session.score());
        self.coins = session.coins();
        self.items = session.items();
    }
}
