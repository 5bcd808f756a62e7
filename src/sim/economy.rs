//! Coins, consumable items, and the shop

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Consumable items sold in the shop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Item {
    /// Removes the active tile with no score or penalty
    Skip,
    /// Cancels the next life loss
    Shield,
}

impl Item {
    pub const ALL: [Item; 2] = [Item::Skip, Item::Shield];

    pub fn price(&self) -> u32 {
        match self {
            Item::Skip => COST_SKIP,
            Item::Shield => COST_SHIELD,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Item::Skip => "skip",
            Item::Shield => "shield",
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Item {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(Item::Skip),
            "shield" => Ok(Item::Shield),
            other => Err(format!("unknown item '{other}'")),
        }
    }
}

/// Item counts, persisted as `{"skip": n, "shield": n}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub skip: u32,
    #[serde(default)]
    pub shield: u32,
}

impl Inventory {
    pub fn count(&self, item: Item) -> u32 {
        match item {
            Item::Skip => self.skip,
            Item::Shield => self.shield,
        }
    }

    fn count_mut(&mut self, item: Item) -> &mut u32 {
        match item {
            Item::Skip => &mut self.skip,
            Item::Shield => &mut self.shield,
        }
    }

    pub fn add(&mut self, item: Item) {
        *self.count_mut(item) += 1;
    }

    /// Consume one of `item`; false (and no change) when none are held
    pub fn take(&mut self, item: Item) -> bool {
        let count = self.count_mut(item);
        if *count == 0 {
            return false;
        }
        *count -= 1;
        true
    }
}

/// Coin balance and item inventory for a play
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Economy {
    pub coins: u32,
    pub items: Inventory,
}

impl Economy {
    pub fn new(coins: u32, items: Inventory) -> Self {
        Self { coins, items }
    }

    pub fn earn(&mut self, coins: u32) {
        self.coins = self.coins.saturating_add(coins);
    }

    /// Buy one `item` if affordable. Returns whether the purchase happened;
    /// an unaffordable purchase leaves everything untouched.
    pub fn buy(&mut self, item: Item) -> bool {
        let price = item.price();
        if self.coins < price {
            return false;
        }
        self.coins -= price;
        self.items.add(item);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_buy_skip_with_enough_coins() {
        let mut eco = Economy::new(10, Inventory::default());
        assert!(eco.buy(Item::Skip));
        assert_eq!(eco.coins, 2);
        assert_eq!(eco.items.skip, 1);
    }

    #[test]
    fn test_buy_shield_too_expensive() {
        let mut eco = Economy::new(5, Inventory::default());
        assert!(!eco.buy(Item::Shield));
        assert_eq!(eco.coins, 5);
        assert_eq!(eco.items.shield, 0);
    }

    #[test]
    fn test_take_empty_is_noop() {
        let mut inv = Inventory::default();
        assert!(!inv.take(Item::Skip));
        assert_eq!(inv.skip, 0);
        inv.add(Item::Skip);
        assert!(inv.take(Item::Skip));
        assert_eq!(inv.skip, 0);
    }

    #[test]
    fn test_item_parse() {
        assert_eq!("Shield".parse::<Item>(), Ok(Item::Shield));
        assert!("potion".parse::<Item>().is_err());
    }

    proptest! {
        #[test]
        fn prop_buy_is_exact(coins in 0u32..100, skip in 0u32..5, shield in 0u32..5, pick_shield in any::<bool>()) {
            let item = if pick_shield { Item::Shield } else { Item::Skip };
            let before = Economy::new(coins, Inventory { skip, shield });
            let mut after = before.clone();
            let bought = after.buy(item);

            if coins >= item.price() {
                prop_assert!(bought);
                prop_assert_eq!(after.coins, coins - item.price());
                prop_assert_eq!(after.items.count(item), before.items.count(item) + 1);
            } else {
                prop_assert!(!bought);
                prop_assert_eq!(after, before);
            }
        }
    }
}
