//! Deck compositions implementing [`combat_core::DeckOracle`].
use std::collections::HashMap;

use combat_core::{Card, DeckOracle, UnitId};

/// DeckOracle implementation with a fixed composition per unit
#[derive(Debug, Clone, Default)]
pub struct StaticDeckOracle {
    compositions: HashMap<UnitId, Vec<Card>>,
}

impl StaticDeckOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, unit: UnitId, cards: Vec<Card>) {
        self.compositions.insert(unit, cards);
    }

    pub fn with(mut self, unit: UnitId, cards: Vec<Card>) -> Self {
        self.insert(unit, cards);
        self
    }
}

impl DeckOracle for StaticDeckOracle {
    fn composition(&self, unit: UnitId) -> Option<Vec<Card>> {
        self.compositions.get(&unit).cloned()
    }
}
