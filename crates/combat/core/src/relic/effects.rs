//! Built-in relic effects.

use crate::card::Rank;
use crate::event::CombatEvent;
use crate::state::{Actor, CombatContext, PhaseKind, UnitId};

use super::{Bonus, BonusStack, LifecycleHook, Modification, RelicEffect, RelicRuntime, StatTarget};

fn heal_player(combat: Option<&mut CombatContext>, amount: u32) {
    let Some(combat) = combat else {
        return;
    };
    let gained = combat.player_mut().heal(amount);
    if gained > 0 {
        combat.emit(CombatEvent::UnitHealed {
            unit: UnitId::PLAYER,
            amount: gained,
        });
    }
}

/// Applies a [`Bonus`] once per stack to attack, defense or draw count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatBonus {
    pub target: StatTarget,
    pub bonus: Bonus,
}

impl StatBonus {
    pub const KIND: &'static str = "stat_bonus";

    fn apply(&self, target: StatTarget, value: i64, stacks: u32) -> Modification<i64> {
        if self.target != target {
            return Modification::unchanged(value);
        }
        Modification::applied(BonusStack::repeated(&self.bonus, stacks).apply(value))
    }
}

impl RelicEffect for StatBonus {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn modify_attack(&self, value: i64, stacks: u32) -> Modification<i64> {
        self.apply(StatTarget::Attack, value, stacks)
    }

    fn modify_defense(&self, value: i64, stacks: u32) -> Modification<i64> {
        self.apply(StatTarget::Defense, value, stacks)
    }

    fn modify_draw_count(&self, value: i64, stacks: u32) -> Modification<i64> {
        self.apply(StatTarget::DrawCount, value, stacks)
    }
}

/// Shifts the threshold of one actor, optionally for one phase only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThresholdBonus {
    pub actor: Actor,
    pub phase: Option<PhaseKind>,
    pub amount: i64,
}

impl ThresholdBonus {
    pub const KIND: &'static str = "threshold_bonus";
}

impl RelicEffect for ThresholdBonus {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn modify_threshold(
        &self,
        actor: Actor,
        phase: PhaseKind,
        value: i64,
        stacks: u32,
    ) -> Modification<i64> {
        if actor != self.actor || self.phase.is_some_and(|p| p != phase) {
            return Modification::unchanged(value);
        }
        Modification::applied(value + self.amount * i64::from(stacks))
    }
}

/// Adds `amount` per stack to a named stat.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedStat {
    pub stat: String,
    pub amount: f64,
}

impl NamedStat {
    pub const KIND: &'static str = "named_stat";
}

impl RelicEffect for NamedStat {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn modify_stat(&self, stat: &str, value: f64, stacks: u32) -> Modification<f64> {
        if stat != self.stat {
            return Modification::unchanged(value);
        }
        Modification::applied(value + self.amount * f64::from(stacks))
    }
}

/// Heals the player at the start of every turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HealOnTurnStart {
    pub amount: u32,
}

impl HealOnTurnStart {
    pub const KIND: &'static str = "heal_on_turn_start";
}

impl RelicEffect for HealOnTurnStart {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn on_lifecycle(
        &self,
        hook: &LifecycleHook,
        owner: &RelicRuntime,
        combat: Option<&mut CombatContext>,
    ) {
        if matches!(hook, LifecycleHook::TurnStart { .. }) {
            heal_player(combat, self.amount.saturating_mul(owner.stacks));
        }
    }
}

/// Heals the player whenever their deck is rebuilt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HealOnShuffle {
    pub amount: u32,
}

impl HealOnShuffle {
    pub const KIND: &'static str = "heal_on_shuffle";
}

impl RelicEffect for HealOnShuffle {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn on_lifecycle(
        &self,
        hook: &LifecycleHook,
        owner: &RelicRuntime,
        combat: Option<&mut CombatContext>,
    ) {
        if let LifecycleHook::Shuffle { unit } = hook
            && unit.is_player()
        {
            heal_player(combat, self.amount.saturating_mul(owner.stacks));
        }
    }
}

/// Heals the player when they draw a Joker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HealOnJoker {
    pub amount: u32,
}

impl HealOnJoker {
    pub const KIND: &'static str = "heal_on_joker";
}

impl RelicEffect for HealOnJoker {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn on_lifecycle(
        &self,
        hook: &LifecycleHook,
        owner: &RelicRuntime,
        combat: Option<&mut CombatContext>,
    ) {
        if let LifecycleHook::CardDrawn {
            actor: Actor::Player,
            card,
            ..
        } = hook
            && card.is_joker()
        {
            heal_player(combat, self.amount.saturating_mul(owner.stacks));
        }
    }
}

/// Heals the player for each locked card of the given rank.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HealOnCardPlayed {
    pub rank: Option<Rank>,
    pub amount: u32,
}

impl HealOnCardPlayed {
    pub const KIND: &'static str = "heal_on_card_played";
}

impl RelicEffect for HealOnCardPlayed {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn on_lifecycle(
        &self,
        hook: &LifecycleHook,
        owner: &RelicRuntime,
        combat: Option<&mut CombatContext>,
    ) {
        if let LifecycleHook::CardPlayed {
            actor: Actor::Player,
            card,
            ..
        } = hook
            && self.rank.is_none_or(|rank| rank == card.rank)
        {
            heal_player(combat, self.amount.saturating_mul(owner.stacks));
        }
    }
}

/// Raises the player's max HP while held.
///
/// Each acquisition of the owning relic adds `amount` (and heals by it);
/// losing the relic removes `amount` per stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaxHpBonus {
    pub amount: u32,
}

impl MaxHpBonus {
    pub const KIND: &'static str = "max_hp_bonus";
}

impl RelicEffect for MaxHpBonus {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn on_lifecycle(
        &self,
        hook: &LifecycleHook,
        owner: &RelicRuntime,
        combat: Option<&mut CombatContext>,
    ) {
        let Some(combat) = combat else {
            return;
        };
        match hook {
            LifecycleHook::Acquire { relic } if relic == owner.id() => {
                let player = combat.player_mut();
                player.max_hp = player.max_hp.saturating_add(self.amount);
                heal_player(Some(combat), self.amount);
            }
            LifecycleHook::Lose { relic } if relic == owner.id() => {
                let removed = self.amount.saturating_mul(owner.stacks);
                let player = combat.player_mut();
                player.max_hp = player.max_hp.saturating_sub(removed).max(1);
                player.hp = player.hp.min(player.max_hp);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::card::{Card, Suit};
    use crate::relic::RelicDefinition;
    use crate::state::{Threshold, Unit};

    fn runtime(stacks: u32) -> RelicRuntime {
        let mut held = RelicRuntime::new(Arc::new(RelicDefinition::new("charm", "Charm")));
        held.stacks = stacks;
        held
    }

    fn wounded_context() -> CombatContext {
        let mut player = Unit::new(UnitId::PLAYER, "Hero", 30);
        player.hp = 10;
        CombatContext::new(player, Threshold::DEFAULT)
    }

    #[test]
    fn stat_bonus_applies_once_per_stack() {
        let effect = StatBonus {
            target: StatTarget::Attack,
            bonus: Bonus::flat(2),
        };
        assert_eq!(effect.modify_attack(10, 3), Modification::applied(16));
        assert_eq!(effect.modify_defense(10, 3), Modification::unchanged(10));
    }

    #[test]
    fn threshold_bonus_matches_actor_and_phase() {
        let effect = ThresholdBonus {
            actor: Actor::Player,
            phase: Some(PhaseKind::Attack),
            amount: 2,
        };
        assert_eq!(
            effect.modify_threshold(Actor::Player, PhaseKind::Attack, 21, 1),
            Modification::applied(23)
        );
        assert!(!effect.modify_threshold(Actor::Player, PhaseKind::Defense, 21, 1).applied);
        assert!(!effect.modify_threshold(Actor::Enemy, PhaseKind::Attack, 21, 1).applied);
    }

    #[test]
    fn joker_heal_ignores_enemy_draws() {
        let effect = HealOnJoker { amount: 4 };
        let mut ctx = wounded_context();
        let hook = LifecycleHook::CardDrawn {
            actor: Actor::Enemy,
            phase: PhaseKind::Attack,
            card: Card::joker(),
        };
        effect.on_lifecycle(&hook, &runtime(1), Some(&mut ctx));
        assert_eq!(ctx.player().hp, 10);

        let hook = LifecycleHook::CardDrawn {
            actor: Actor::Player,
            phase: PhaseKind::Attack,
            card: Card::joker(),
        };
        effect.on_lifecycle(&hook, &runtime(2), Some(&mut ctx));
        assert_eq!(ctx.player().hp, 18);
    }

    #[test]
    fn card_played_heal_filters_rank() {
        let effect = HealOnCardPlayed {
            rank: Some(Rank::Ace),
            amount: 1,
        };
        let mut ctx = wounded_context();
        for rank in [Rank::Ace, Rank::King, Rank::Ace] {
            let hook = LifecycleHook::CardPlayed {
                actor: Actor::Player,
                phase: PhaseKind::Defense,
                card: Card::new(rank, Suit::Hearts),
            };
            effect.on_lifecycle(&hook, &runtime(1), Some(&mut ctx));
        }
        assert_eq!(ctx.player().hp, 12);
    }

    #[test]
    fn max_hp_bonus_is_reverted_on_lose() {
        let effect = MaxHpBonus { amount: 5 };
        let mut ctx = wounded_context();
        let held = runtime(1);

        effect.on_lifecycle(
            &LifecycleHook::Acquire {
                relic: "charm".into(),
            },
            &held,
            Some(&mut ctx),
        );
        assert_eq!((ctx.player().hp, ctx.player().max_hp), (15, 35));

        effect.on_lifecycle(
            &LifecycleHook::Lose {
                relic: "charm".into(),
            },
            &held,
            Some(&mut ctx),
        );
        assert_eq!((ctx.player().hp, ctx.player().max_hp), (15, 30));
    }

    #[test]
    fn hooks_without_context_are_noops() {
        let effect = HealOnTurnStart { amount: 3 };
        effect.on_lifecycle(&LifecycleHook::TurnStart { turn: 1 }, &runtime(1), None);
    }
}
