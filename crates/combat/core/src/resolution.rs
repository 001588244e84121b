//! Damage resolution planning.
//!
//! Resolution order is fixed: the player's strike on the selected target goes
//! first, then every living enemy attacks in registry order against a shared,
//! depleting block pool seeded with the player's locked defense. The plan is
//! computed up front from the locked totals; applying it (and pacing it with
//! animations) is up to the caller.

use strum::Display;
use tracing::warn;

use crate::event::CombatEvent;
use crate::state::{BattleState, CombatContext, PhaseKind, UnitId};

/// Terminal result of an encounter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    Victory,
    Defeat,
    /// Both sides died in the same round.
    Draw,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerStrike {
    pub target: UnitId,
    pub attack: u32,
    pub defense: u32,
    pub damage: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyStrike {
    pub enemy: UnitId,
    pub attack: u32,
    /// Player block left when this enemy attacked.
    pub block_before: u32,
    pub damage: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolutionPlan {
    pub player_strike: Option<PlayerStrike>,
    pub enemy_strikes: Vec<EnemyStrike>,
}

impl ResolutionPlan {
    /// Builds the plan for the current round.
    ///
    /// An enemy the player strike would kill does not attack back.
    pub fn compute(combat: &CombatContext, battle: &BattleState) -> Self {
        let player_strike = battle
            .current_target
            .and_then(|target| combat.enemy(target))
            .filter(|enemy| enemy.is_alive())
            .map(|enemy| {
                let attack = battle.player_atk_total.unwrap_or(0);
                let defense = battle.enemy_total(enemy.id, PhaseKind::Defense).unwrap_or(0);
                PlayerStrike {
                    target: enemy.id,
                    attack,
                    defense,
                    damage: attack.saturating_sub(defense),
                }
            });

        let killed = player_strike.and_then(|strike| {
            combat
                .enemy(strike.target)
                .filter(|enemy| enemy.hp <= strike.damage)
                .map(|enemy| enemy.id)
        });

        let attackers: Vec<(UnitId, u32)> = combat
            .living_enemies()
            .filter(|enemy| Some(enemy.id) != killed)
            .map(|enemy| {
                let attack = battle
                    .enemy_total(enemy.id, PhaseKind::Attack)
                    .unwrap_or_else(|| {
                        warn!(enemy = %enemy.id, "enemy has no locked attack, using 0");
                        0
                    });
                (enemy.id, attack)
            })
            .collect();

        let defense = battle.player_def_total.unwrap_or(0);
        let attacks: Vec<u32> = attackers.iter().map(|&(_, attack)| attack).collect();
        let enemy_strikes = deplete_block(defense, &attacks)
            .into_iter()
            .zip(attackers)
            .map(|((block_before, damage), (enemy, attack))| EnemyStrike {
                enemy,
                attack,
                block_before,
                damage,
            })
            .collect();

        Self {
            player_strike,
            enemy_strikes,
        }
    }

    /// Total damage the player takes if the plan runs to completion.
    pub fn damage_to_player(&self) -> u32 {
        self.enemy_strikes.iter().map(|strike| strike.damage).sum()
    }
}

/// Runs `attacks` in order against a shared block pool of `defense`.
///
/// Returns `(block_before, damage)` per attack. Block is never replenished.
pub fn deplete_block(defense: u32, attacks: &[u32]) -> Vec<(u32, u32)> {
    let mut remaining = defense;
    attacks
        .iter()
        .map(|&attack| {
            let before = remaining;
            remaining = remaining.saturating_sub(attack);
            (before, attack.saturating_sub(before))
        })
        .collect()
}

/// Applies one hit, emitting `DamageApplied` or `Blocked`.
///
/// Returns the HP actually lost, or `None` when `defender` is unknown.
pub fn apply_strike(
    combat: &mut CombatContext,
    attacker: UnitId,
    defender: UnitId,
    damage: u32,
) -> Option<u32> {
    let unit = combat.unit_mut(defender)?;
    if damage == 0 {
        combat.emit(CombatEvent::Blocked { attacker, defender });
        return Some(0);
    }
    let lost = unit.take_damage(damage);
    let remaining_hp = unit.hp;
    combat.emit(CombatEvent::DamageApplied {
        attacker,
        defender,
        amount: lost,
        remaining_hp,
    });
    Some(lost)
}

/// Win/lose check after all damage for the round is applied.
pub fn evaluate_outcome(combat: &CombatContext) -> Option<Outcome> {
    let player_alive = combat.player().is_alive();
    let enemies_alive = combat.living_enemies().next().is_some();
    match (player_alive, enemies_alive) {
        (true, true) => None,
        (true, false) => Some(Outcome::Victory),
        (false, true) => Some(Outcome::Defeat),
        (false, false) => Some(Outcome::Draw),
    }
}
