use serde::{Deserialize, Serialize};

use combat_core::{Actor, Outcome, PhaseAccumulator, PhaseKind, Step, Unit, UnitId};

use super::SessionState;

/// Read-only view of an encounter for presentation layers and tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleSnapshot {
    pub turn: u32,
    pub step: Step,
    pub busy: bool,
    pub outcome: Option<Outcome>,
    pub waiting_for_target: bool,
    pub current_target: Option<UnitId>,
    pub player: Unit,
    pub player_defense: PhaseAccumulator,
    pub player_attack: PhaseAccumulator,
    /// Effective (relic-adjusted) player thresholds.
    pub defense_threshold: u32,
    pub attack_threshold: u32,
    pub player_def_total: Option<u32>,
    pub player_atk_total: Option<u32>,
    pub player_deck_count: usize,
    /// Enemies in spawn order, dead ones included.
    pub enemies: Vec<EnemyView>,
    pub relics: Vec<RelicView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyView {
    pub unit: Unit,
    pub defense: Option<u32>,
    pub attack: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelicView {
    pub id: String,
    pub name: String,
    pub stacks: u32,
    pub enabled: bool,
}

impl BattleSnapshot {
    pub(crate) fn capture(state: &SessionState) -> Self {
        let combat = &state.combat;
        let battle = &state.battle;

        let enemies = combat
            .enemies()
            .iter()
            .map(|unit| EnemyView {
                unit: unit.clone(),
                defense: battle.enemy_total(unit.id, PhaseKind::Defense),
                attack: battle.enemy_total(unit.id, PhaseKind::Attack),
            })
            .collect();
        let relics = state
            .relics
            .iter()
            .map(|relic| RelicView {
                id: relic.id().to_owned(),
                name: relic.definition.name.clone(),
                stacks: relic.stacks,
                enabled: relic.enabled,
            })
            .collect();

        Self {
            turn: battle.turn,
            step: battle.step,
            busy: battle.busy,
            outcome: battle.outcome,
            waiting_for_target: battle.waiting_for_target,
            current_target: battle.current_target,
            player: combat.player().clone(),
            player_defense: combat.accumulator(Actor::Player, PhaseKind::Defense).clone(),
            player_attack: combat.accumulator(Actor::Player, PhaseKind::Attack).clone(),
            defense_threshold: combat
                .effective_threshold(Actor::Player, PhaseKind::Defense, &state.relics)
                .get(),
            attack_threshold: combat
                .effective_threshold(Actor::Player, PhaseKind::Attack, &state.relics)
                .get(),
            player_def_total: battle.player_def_total,
            player_atk_total: battle.player_atk_total,
            player_deck_count: combat.deck(UnitId::PLAYER).map_or(0, |deck| deck.count()),
            enemies,
            relics,
        }
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// The player phase currently accepting Draw/Accept, if any.
    pub fn open_phase(&self) -> Option<PhaseKind> {
        if self.is_over() || self.turn == 0 {
            return None;
        }
        self.step.player_phase()
    }

    pub fn accumulator(&self, phase: PhaseKind) -> &PhaseAccumulator {
        match phase {
            PhaseKind::Defense => &self.player_defense,
            PhaseKind::Attack => &self.player_attack,
        }
    }

    pub fn threshold(&self, phase: PhaseKind) -> u32 {
        match phase {
            PhaseKind::Defense => self.defense_threshold,
            PhaseKind::Attack => self.attack_threshold,
        }
    }

    pub fn living_enemies(&self) -> impl Iterator<Item = &EnemyView> {
        self.enemies.iter().filter(|enemy| enemy.unit.is_alive())
    }

    pub fn enemy(&self, id: UnitId) -> Option<&EnemyView> {
        self.enemies.iter().find(|enemy| enemy.unit.id == id)
    }
}
