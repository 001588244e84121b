//! Enemy tuning implementing [`combat_core::EnemyTuningOracle`].
use std::collections::HashMap;

use combat_core::{EnemyTuning, EnemyTuningOracle, UnitId};

/// EnemyTuningOracle implementation with tuning registered per spawned enemy
#[derive(Debug, Clone, Default)]
pub struct StaticTuningOracle {
    tunings: HashMap<UnitId, EnemyTuning>,
}

impl StaticTuningOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the tuning of one enemy
    pub fn insert(&mut self, enemy: UnitId, tuning: EnemyTuning) {
        self.tunings.insert(enemy, tuning);
    }

    pub fn with(mut self, enemy: UnitId, tuning: EnemyTuning) -> Self {
        self.insert(enemy, tuning);
        self
    }
}

impl EnemyTuningOracle for StaticTuningOracle {
    fn tuning(&self, enemy: UnitId) -> EnemyTuning {
        self.tunings.get(&enemy).copied().unwrap_or_default()
    }
}
