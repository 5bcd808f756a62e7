//! Lives and shield consumption

use serde::{Deserialize, Serialize};

use super::economy::{Inventory, Item};

/// Result of a wrong answer or a missed tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Penalty {
    /// A shield absorbed the hit
    Shielded,
    /// A life was lost, some remain
    LifeLost { remaining: u32 },
    /// The last life was lost
    Fatal,
}

/// Remaining lives for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifeTracker {
    lives: u32,
}

impl LifeTracker {
    pub fn new(lives: u32) -> Self {
        Self { lives }
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn is_depleted(&self) -> bool {
        self.lives == 0
    }

    /// Take a hit: a held shield is consumed first, otherwise one life
    pub fn apply_penalty(&mut self, items: &mut Inventory) -> Penalty {
        if items.take(Item::Shield) {
            return Penalty::Shielded;
        }
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            Penalty::Fatal
        } else {
            Penalty::LifeLost {
                remaining: self.lives,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_hits_without_shield() {
        let mut lives = LifeTracker::new(3);
        let mut items = Inventory::default();
        assert_eq!(lives.apply_penalty(&mut items), Penalty::LifeLost { remaining: 2 });
        assert_eq!(lives.apply_penalty(&mut items), Penalty::LifeLost { remaining: 1 });
        assert_eq!(lives.apply_penalty(&mut items), Penalty::Fatal);
        assert!(lives.is_depleted());
    }

    #[test]
    fn test_shield_absorbs_one_hit() {
        let mut lives = LifeTracker::new(3);
        let mut items = Inventory { skip: 0, shield: 1 };
        assert_eq!(lives.apply_penalty(&mut items), Penalty::Shielded);
        assert_eq!(items.shield, 0);
        assert_eq!(lives.lives(), 3);

        assert_eq!(lives.apply_penalty(&mut items), Penalty::LifeLost { remaining: 2 });
    }
}
