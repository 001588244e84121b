use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{CombatError, ErrorSeverity};
use crate::event::CombatEvent;
use crate::state::{Actor, CombatContext, PhaseKind, Threshold};

use super::{LifecycleHook, Modification, RelicDefinition, RelicEffect, RelicRuntime, StackingRule};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RelicError {
    #[error("relic family '{family}' is already held")]
    AlreadyOwned { family: String },

    #[error("relic '{relic}' is already at its maximum of {max} stacks")]
    MaxStacks { relic: String, max: u32 },

    #[error("relic '{relic}' (tier {tier}) does not replace held '{held}' (tier {held_tier})")]
    NotReplaced {
        relic: String,
        tier: u32,
        held: String,
        held_tier: u32,
    },

    #[error("relic '{relic}' is not held")]
    NotFound { relic: String },

    #[error("unknown relic effect kind '{kind}'")]
    UnknownEffect { kind: String },

    #[error("invalid relic definition '{relic}': {reason}")]
    InvalidDefinition { relic: String, reason: String },
}

impl CombatError for RelicError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::AlreadyOwned { .. }
            | Self::MaxStacks { .. }
            | Self::NotReplaced { .. }
            | Self::NotFound { .. } => ErrorSeverity::Validation,
            Self::UnknownEffect { .. } | Self::InvalidDefinition { .. } => {
                ErrorSeverity::Configuration
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyOwned { .. } => "RELIC_ALREADY_OWNED",
            Self::MaxStacks { .. } => "RELIC_MAX_STACKS",
            Self::NotReplaced { .. } => "RELIC_NOT_REPLACED",
            Self::NotFound { .. } => "RELIC_NOT_FOUND",
            Self::UnknownEffect { .. } => "RELIC_UNKNOWN_EFFECT",
            Self::InvalidDefinition { .. } => "RELIC_INVALID_DEFINITION",
        }
    }
}

/// Result of a successful [`RelicManager::acquire`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AcquireOutcome {
    Added,
    Stacked { stacks: u32 },
    Replaced { previous: String },
}

/// The player's held relics, in acquisition order.
///
/// All folds skip disabled relics. A fold whose result is out of range is
/// logged and the base value is kept.
#[derive(Clone, Debug, Default)]
pub struct RelicManager {
    relics: Vec<RelicRuntime>,
}

impl RelicManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.relics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RelicRuntime> {
        self.relics.iter()
    }

    pub fn get(&self, id: &str) -> Option<&RelicRuntime> {
        self.relics.iter().find(|relic| relic.id() == id)
    }

    // ===== ownership =====

    /// Adds `definition`, applying its stacking rule against any held relic
    /// of the same family.
    ///
    /// A replacement keeps the held relic's slot; `Lose` fires for the old
    /// relic before `Acquire` fires for the new one.
    pub fn acquire(
        &mut self,
        definition: Arc<RelicDefinition>,
        mut combat: Option<&mut CombatContext>,
    ) -> Result<AcquireOutcome, RelicError> {
        let Some(index) = self
            .relics
            .iter()
            .position(|held| held.family() == definition.family)
        else {
            let id = definition.id.clone();
            self.relics.push(RelicRuntime::new(definition));
            self.announce_acquire(&id, combat);
            return Ok(AcquireOutcome::Added);
        };

        let held = &self.relics[index];
        match definition.stacking {
            StackingRule::Unique => Err(RelicError::AlreadyOwned {
                family: definition.family.clone(),
            }),
            StackingRule::Stackable => {
                if held.id() != definition.id {
                    return Err(RelicError::AlreadyOwned {
                        family: definition.family.clone(),
                    });
                }
                if held.stacks >= definition.max_stacks {
                    return Err(RelicError::MaxStacks {
                        relic: definition.id.clone(),
                        max: definition.max_stacks,
                    });
                }
                let stacks = held.stacks + 1;
                self.relics[index].stacks = stacks;
                self.announce_acquire(&definition.id, combat);
                Ok(AcquireOutcome::Stacked { stacks })
            }
            StackingRule::ReplaceLower | StackingRule::ReplaceHigher => {
                let replaces = match definition.stacking {
                    StackingRule::ReplaceLower => held.definition.tier < definition.tier,
                    _ => held.definition.tier > definition.tier,
                };
                if !replaces {
                    return Err(RelicError::NotReplaced {
                        relic: definition.id.clone(),
                        tier: definition.tier,
                        held: held.id().to_owned(),
                        held_tier: held.definition.tier,
                    });
                }

                let previous = held.id().to_owned();
                self.announce_lose(&previous, combat.as_deref_mut());
                let id = definition.id.clone();
                self.relics[index] = RelicRuntime::new(definition);
                self.announce_acquire(&id, combat);
                Ok(AcquireOutcome::Replaced { previous })
            }
        }
    }

    /// Removes a held relic after firing its `Lose` notification.
    pub fn lose(
        &mut self,
        id: &str,
        combat: Option<&mut CombatContext>,
    ) -> Result<RelicRuntime, RelicError> {
        let index = self.index_of(id)?;
        self.announce_lose(id, combat);
        Ok(self.relics.remove(index))
    }

    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<(), RelicError> {
        let index = self.index_of(id)?;
        self.relics[index].enabled = enabled;
        debug!(relic = id, enabled, "relic toggled");
        Ok(())
    }

    fn index_of(&self, id: &str) -> Result<usize, RelicError> {
        self.relics
            .iter()
            .position(|relic| relic.id() == id)
            .ok_or_else(|| RelicError::NotFound {
                relic: id.to_owned(),
            })
    }

    fn announce_acquire(&self, id: &str, mut combat: Option<&mut CombatContext>) {
        let stacks = self.get(id).map_or(1, |relic| relic.stacks);
        debug!(relic = id, stacks, "relic acquired");
        self.notify_ownership(
            &LifecycleHook::Acquire {
                relic: id.to_owned(),
            },
            id,
            combat.as_deref_mut(),
        );
        if let Some(combat) = combat {
            combat.emit(CombatEvent::RelicAcquired {
                relic: id.to_owned(),
                stacks,
            });
        }
    }

    fn announce_lose(&self, id: &str, mut combat: Option<&mut CombatContext>) {
        debug!(relic = id, "relic lost");
        self.notify_ownership(
            &LifecycleHook::Lose {
                relic: id.to_owned(),
            },
            id,
            combat.as_deref_mut(),
        );
        if let Some(combat) = combat {
            combat.emit(CombatEvent::RelicLost {
                relic: id.to_owned(),
            });
        }
    }

    // ===== lifecycle =====

    /// Fires `hook` to every effect of every enabled relic, in order.
    pub fn notify(&self, hook: &LifecycleHook, mut combat: Option<&mut CombatContext>) {
        for relic in self.enabled() {
            for effect in &relic.definition.effects {
                effect.on_lifecycle(hook, relic, combat.as_deref_mut());
            }
        }
    }

    /// Like [`notify`](Self::notify), but the relic `id` hears its own
    /// acquire or lose even while disabled.
    fn notify_ownership(
        &self,
        hook: &LifecycleHook,
        id: &str,
        mut combat: Option<&mut CombatContext>,
    ) {
        let listeners = self
            .relics
            .iter()
            .filter(|relic| relic.enabled || relic.id() == id);
        for relic in listeners {
            for effect in &relic.definition.effects {
                effect.on_lifecycle(hook, relic, combat.as_deref_mut());
            }
        }
    }

    // ===== value pipeline =====

    fn enabled(&self) -> impl Iterator<Item = &RelicRuntime> {
        self.relics.iter().filter(|relic| relic.enabled)
    }

    fn fold<F>(&self, base: i64, hook: F) -> i64
    where
        F: Fn(&dyn RelicEffect, i64, u32) -> Modification<i64>,
    {
        let mut value = base;
        for relic in self.enabled() {
            for effect in &relic.definition.effects {
                let result = hook(effect.as_ref(), value, relic.stacks);
                if result.applied {
                    value = result.value;
                }
            }
        }
        value
    }

    /// Final attack value for a locked attack total. Zero stays valid.
    pub fn attack_value(&self, base: u32) -> u32 {
        let folded = self.fold(i64::from(base), |effect, value, stacks| {
            effect.modify_attack(value, stacks)
        });
        non_negative("attack", base, folded)
    }

    /// Final defense value for a locked defense total. Zero stays valid.
    pub fn defense_value(&self, base: u32) -> u32 {
        let folded = self.fold(i64::from(base), |effect, value, stacks| {
            effect.modify_defense(value, stacks)
        });
        non_negative("defense", base, folded)
    }

    /// Cards drawn per draw request. Must stay at least one.
    pub fn draw_count(&self, base: u32) -> u32 {
        let folded = self.fold(i64::from(base), |effect, value, stacks| {
            effect.modify_draw_count(value, stacks)
        });
        match u32::try_from(folded) {
            Ok(count) if count >= 1 => count,
            _ => {
                warn!(base, folded, "relic draw count is not positive, keeping base");
                base
            }
        }
    }

    /// Threshold after relic modification.
    ///
    /// Per relic, effects are first asked through `modify_threshold`. When no
    /// effect of that relic applied, the generic named stat for the slot is
    /// tried instead (see [`super::threshold_stat_name`]).
    pub fn threshold(&self, actor: Actor, phase: PhaseKind, base: Threshold) -> Threshold {
        let stat = super::threshold_stat_name(actor, phase);
        let mut value = i64::from(base.get());

        for relic in self.enabled() {
            let mut specific = false;
            for effect in &relic.definition.effects {
                let result = effect.modify_threshold(actor, phase, value, relic.stacks);
                if result.applied {
                    value = result.value;
                    specific = true;
                }
            }
            if specific {
                continue;
            }
            for effect in &relic.definition.effects {
                let result = effect.modify_stat(stat, value as f64, relic.stacks);
                if result.applied && result.value.is_finite() {
                    value = result.value.round() as i64;
                }
            }
        }

        Threshold::from_signed(value).unwrap_or_else(|e| {
            warn!(%actor, %phase, base = base.get(), folded = value, error = %e,
                "relic threshold is invalid, keeping base");
            base
        })
    }

    /// Arbitrary named stat.
    pub fn stat(&self, name: &str, base: f64) -> f64 {
        let mut value = base;
        for relic in self.enabled() {
            for effect in &relic.definition.effects {
                let result = effect.modify_stat(name, value, relic.stacks);
                if result.applied {
                    value = result.value;
                }
            }
        }
        if value.is_finite() {
            value
        } else {
            warn!(stat = name, base, "relic stat is not finite, keeping base");
            base
        }
    }
}

fn non_negative(what: &'static str, base: u32, folded: i64) -> u32 {
    u32::try_from(folded).unwrap_or_else(|_| {
        warn!(value = what, base, folded, "relic value is negative, keeping base");
        base
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relic::{Bonus, MaxHpBonus, NamedStat, StatBonus, StatTarget, ThresholdBonus};
    use crate::state::{Unit, UnitId};

    fn whetstone(id: &str, tier: u32, stacking: StackingRule) -> Arc<RelicDefinition> {
        Arc::new(
            RelicDefinition::new(id, id)
                .with_family("whetstone")
                .with_tier(tier)
                .with_stacking(stacking, 3)
                .with_effect(Arc::new(StatBonus {
                    target: StatTarget::Attack,
                    bonus: Bonus::flat(tier as i64),
                })),
        )
    }

    #[test]
    fn unique_relic_rejects_second_copy() {
        let mut relics = RelicManager::new();
        let charm = Arc::new(RelicDefinition::new("charm", "Charm"));
        relics.acquire(charm.clone(), None).unwrap();
        assert_eq!(
            relics.acquire(charm, None),
            Err(RelicError::AlreadyOwned {
                family: "charm".into()
            })
        );
        assert_eq!(relics.len(), 1);
    }

    #[test]
    fn stackable_relic_stops_at_max() {
        let mut relics = RelicManager::new();
        let stone = whetstone("stone", 2, StackingRule::Stackable);
        assert_eq!(relics.acquire(stone.clone(), None), Ok(AcquireOutcome::Added));
        assert_eq!(
            relics.acquire(stone.clone(), None),
            Ok(AcquireOutcome::Stacked { stacks: 2 })
        );
        relics.acquire(stone.clone(), None).unwrap();
        assert!(matches!(
            relics.acquire(stone, None),
            Err(RelicError::MaxStacks { max: 3, .. })
        ));
        // Three stacks of +2 flat.
        assert_eq!(relics.attack_value(10), 16);
    }

    #[test]
    fn replace_lower_swaps_in_place() {
        let mut relics = RelicManager::new();
        relics
            .acquire(Arc::new(RelicDefinition::new("first", "First")), None)
            .unwrap();
        relics
            .acquire(whetstone("stone", 1, StackingRule::ReplaceLower), None)
            .unwrap();
        relics
            .acquire(Arc::new(RelicDefinition::new("last", "Last")), None)
            .unwrap();

        assert_eq!(
            relics.acquire(whetstone("great-stone", 3, StackingRule::ReplaceLower), None),
            Ok(AcquireOutcome::Replaced {
                previous: "stone".into()
            })
        );
        let order: Vec<_> = relics.iter().map(RelicRuntime::id).collect();
        assert_eq!(order, vec!["first", "great-stone", "last"]);

        assert!(matches!(
            relics.acquire(whetstone("pebble", 1, StackingRule::ReplaceLower), None),
            Err(RelicError::NotReplaced { held_tier: 3, .. })
        ));
    }

    #[test]
    fn replace_higher_accepts_lower_tier() {
        let mut relics = RelicManager::new();
        relics
            .acquire(whetstone("stone", 3, StackingRule::ReplaceHigher), None)
            .unwrap();
        assert!(
            relics
                .acquire(whetstone("pebble", 1, StackingRule::ReplaceHigher), None)
                .is_ok()
        );
        assert_eq!(relics.attack_value(10), 11);
    }

    #[test]
    fn replacement_fires_lose_before_acquire() {
        let mut ctx = CombatContext::new(Unit::new(UnitId::PLAYER, "Hero", 30), Threshold::DEFAULT);
        let mut relics = RelicManager::new();
        let heart = |id: &str, tier: u32, amount: u32| {
            Arc::new(
                RelicDefinition::new(id, id)
                    .with_family("heart")
                    .with_tier(tier)
                    .with_stacking(StackingRule::ReplaceLower, 1)
                    .with_effect(Arc::new(MaxHpBonus { amount })),
            )
        };

        relics.acquire(heart("small", 1, 5), Some(&mut ctx)).unwrap();
        assert_eq!(ctx.player().max_hp, 35);
        relics.acquire(heart("large", 2, 10), Some(&mut ctx)).unwrap();
        assert_eq!(ctx.player().max_hp, 40);

        let events = ctx.drain_events();
        let relic_events: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, CombatEvent::RelicAcquired { .. } | CombatEvent::RelicLost { .. }))
            .collect();
        assert_eq!(
            relic_events,
            vec![
                &CombatEvent::RelicAcquired {
                    relic: "small".into(),
                    stacks: 1
                },
                &CombatEvent::RelicLost {
                    relic: "small".into()
                },
                &CombatEvent::RelicAcquired {
                    relic: "large".into(),
                    stacks: 1
                },
            ]
        );
    }

    #[test]
    fn disabled_relics_are_skipped() {
        let mut relics = RelicManager::new();
        relics
            .acquire(whetstone("stone", 4, StackingRule::Unique), None)
            .unwrap();
        relics.set_enabled("stone", false).unwrap();
        assert_eq!(relics.attack_value(10), 10);
        assert_eq!(
            relics.set_enabled("missing", true),
            Err(RelicError::NotFound {
                relic: "missing".into()
            })
        );
    }

    #[test]
    fn negative_attack_keeps_base() {
        let mut relics = RelicManager::new();
        let cursed = Arc::new(RelicDefinition::new("cursed", "Cursed").with_effect(Arc::new(
            StatBonus {
                target: StatTarget::Attack,
                bonus: Bonus::flat(-50),
            },
        )));
        relics.acquire(cursed, None).unwrap();
        assert_eq!(relics.attack_value(10), 10);
        assert_eq!(relics.attack_value(0), 0);
    }

    #[test]
    fn threshold_below_minimum_keeps_base() {
        let mut relics = RelicManager::new();
        let shrink = Arc::new(RelicDefinition::new("shrink", "Shrink").with_effect(Arc::new(
            ThresholdBonus {
                actor: Actor::Player,
                phase: None,
                amount: -20,
            },
        )));
        relics.acquire(shrink, None).unwrap();
        assert_eq!(
            relics.threshold(Actor::Player, PhaseKind::Attack, Threshold::DEFAULT),
            Threshold::DEFAULT
        );
    }

    #[test]
    fn named_stat_is_fallback_for_threshold() {
        let mut relics = RelicManager::new();
        let lens = Arc::new(RelicDefinition::new("lens", "Lens").with_effect(Arc::new(NamedStat {
            stat: "enemy_attack_threshold".into(),
            amount: -2.0,
        })));
        relics.acquire(lens, None).unwrap();
        assert_eq!(
            relics
                .threshold(Actor::Enemy, PhaseKind::Attack, Threshold::DEFAULT)
                .get(),
            19
        );
        assert_eq!(relics.stat("enemy_attack_threshold", 10.0), 8.0);
        assert_eq!(relics.stat("unrelated", 10.0), 10.0);
    }

    #[test]
    fn draw_count_must_stay_positive() {
        let mut relics = RelicManager::new();
        let heavy = Arc::new(RelicDefinition::new("heavy", "Heavy").with_effect(Arc::new(
            StatBonus {
                target: StatTarget::DrawCount,
                bonus: Bonus::flat(-1),
            },
        )));
        relics.acquire(heavy, None).unwrap();
        assert_eq!(relics.draw_count(1), 1);
        assert_eq!(relics.draw_count(3), 2);
    }

    #[test]
    fn disabled_relic_still_reverts_its_max_hp_on_lose() {
        let mut combat =
            CombatContext::new(Unit::new(UnitId::PLAYER, "Hero", 30), Threshold::DEFAULT);
        let mut relics = RelicManager::new();
        let heart = RelicDefinition::new("heart", "Heart")
            .with_effect(Arc::new(MaxHpBonus { amount: 5 }));
        relics.acquire(Arc::new(heart), Some(&mut combat)).unwrap();
        assert_eq!(combat.player().max_hp, 35);

        relics.set_enabled("heart", false).unwrap();
        relics.lose("heart", Some(&mut combat)).unwrap();
        assert_eq!(combat.player().max_hp, 30);
        assert_eq!(combat.player().hp, 30);
    }

    #[test]
    fn lose_removes_relic() {
        let mut relics = RelicManager::new();
        relics
            .acquire(Arc::new(RelicDefinition::new("charm", "Charm")), None)
            .unwrap();
        let removed = relics.lose("charm", None).unwrap();
        assert_eq!(removed.id(), "charm");
        assert!(relics.is_empty());
        assert!(relics.lose("charm", None).is_err());
    }
}
