//! Enemy tuning oracle.

use crate::state::{PhaseKind, Threshold, UnitId};

/// Inclusive target range an enemy tries to land its total in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Band {
    pub min: u32,
    pub max: u32,
}

impl Band {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Threshold-relative fallback: `[threshold * 2/3, threshold - 3]`.
    pub const fn fallback(threshold: Threshold) -> Self {
        let t = threshold.get();
        Self {
            min: t * 2 / 3,
            max: t.saturating_sub(3),
        }
    }

    pub const fn contains(&self, total: u32) -> bool {
        self.min <= total && total <= self.max
    }

    pub const fn is_valid(&self) -> bool {
        self.min <= self.max
    }
}

/// Per-enemy draw policy tuning.
///
/// Missing bands fall back to [`Band::fallback`]; missing caps leave the
/// phase threshold as the only hard cap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyTuning {
    #[cfg_attr(feature = "serde", serde(default))]
    pub attack_band: Option<Band>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub defense_band: Option<Band>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub attack_cap: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub defense_cap: Option<u32>,
}

impl EnemyTuning {
    pub fn band(&self, phase: PhaseKind) -> Option<Band> {
        match phase {
            PhaseKind::Defense => self.defense_band,
            PhaseKind::Attack => self.attack_band,
        }
    }

    pub fn cap(&self, phase: PhaseKind) -> Option<u32> {
        match phase {
            PhaseKind::Defense => self.defense_cap,
            PhaseKind::Attack => self.attack_cap,
        }
    }
}

/// Provides draw policy tuning for enemies.
pub trait EnemyTuningOracle: Send + Sync {
    /// Tuning for `enemy`. Unknown enemies get the defaults.
    fn tuning(&self, enemy: UnitId) -> EnemyTuning;
}
