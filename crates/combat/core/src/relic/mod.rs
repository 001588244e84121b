//! Relic modifier pipeline.
//!
//! Relics are persistent, stacking modifiers owned by the player for the
//! length of a run. They participate in two ways:
//!
//! - **Value pipeline**: an ordered fold. For a base value the manager walks
//!   every enabled relic in acquisition order and every effect of that relic,
//!   handing each hook the running value and keeping the result when the hook
//!   reports `applied`. Hooks see nothing but the running value.
//! - **Lifecycle notifications**: side-effecting callbacks (acquire, lose,
//!   turn start/end, shuffle, card drawn/played) fired to every enabled relic.
//!
//! Effects are trait objects ([`RelicEffect`]); built-in ones are described as
//! data by [`EffectSpec`] and constructed through [`EffectRegistry`].

mod bonus;
mod definition;
mod effects;
mod manager;
mod registry;

pub use bonus::{Bonus, BonusStack};
pub use definition::{RelicDefinition, RelicRuntime, RelicSpec, StackingRule};
pub use effects::{
    HealOnCardPlayed, HealOnJoker, HealOnShuffle, HealOnTurnStart, MaxHpBonus, NamedStat,
    StatBonus, ThresholdBonus,
};
pub use manager::{AcquireOutcome, RelicError, RelicManager};
pub use registry::{EffectFactory, EffectRegistry, EffectSpec};

use strum::Display;

use crate::card::Card;
use crate::state::{Actor, CombatContext, PhaseKind, UnitId};

/// Value-returning hook result: the possibly-changed value and whether the
/// hook considered itself applicable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Modification<T> {
    pub value: T,
    pub applied: bool,
}

impl<T> Modification<T> {
    pub fn unchanged(value: T) -> Self {
        Self {
            value,
            applied: false,
        }
    }

    pub fn applied(value: T) -> Self {
        Self {
            value,
            applied: true,
        }
    }
}

/// Which integer value a [`StatBonus`] rewrites.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatTarget {
    Attack,
    Defense,
    DrawCount,
}

/// Lifecycle notifications delivered to every enabled relic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LifecycleHook {
    Acquire { relic: String },
    Lose { relic: String },
    TurnStart { turn: u32 },
    TurnEnd { turn: u32 },
    Shuffle { unit: UnitId },
    CardDrawn { actor: Actor, phase: PhaseKind, card: Card },
    CardPlayed { actor: Actor, phase: PhaseKind, card: Card },
}

/// Generic stat name used when a threshold falls through to `modify_stat`.
pub const fn threshold_stat_name(actor: Actor, phase: PhaseKind) -> &'static str {
    match (actor, phase) {
        (Actor::Player, PhaseKind::Defense) => "player_defense_threshold",
        (Actor::Player, PhaseKind::Attack) => "player_attack_threshold",
        (Actor::Enemy, PhaseKind::Defense) => "enemy_defense_threshold",
        (Actor::Enemy, PhaseKind::Attack) => "enemy_attack_threshold",
    }
}

/// A pluggable relic effect.
///
/// Every hook has a pass-through default, so an effect only overrides what it
/// cares about. `stacks` is the owning relic's current stack count.
pub trait RelicEffect: Send + Sync + core::fmt::Debug {
    /// Type id, matching the registry key the effect was built from.
    fn kind(&self) -> &'static str;

    fn modify_attack(&self, value: i64, _stacks: u32) -> Modification<i64> {
        Modification::unchanged(value)
    }

    fn modify_defense(&self, value: i64, _stacks: u32) -> Modification<i64> {
        Modification::unchanged(value)
    }

    fn modify_draw_count(&self, value: i64, _stacks: u32) -> Modification<i64> {
        Modification::unchanged(value)
    }

    fn modify_threshold(
        &self,
        _actor: Actor,
        _phase: PhaseKind,
        value: i64,
        _stacks: u32,
    ) -> Modification<i64> {
        Modification::unchanged(value)
    }

    fn modify_stat(&self, _stat: &str, value: f64, _stacks: u32) -> Modification<f64> {
        Modification::unchanged(value)
    }

    fn on_lifecycle(
        &self,
        _hook: &LifecycleHook,
        _owner: &RelicRuntime,
        _combat: Option<&mut CombatContext>,
    ) {
    }
}
