use std::collections::BTreeMap;

use strum::Display;

use crate::resolution::Outcome;

use super::{PhaseKind, UnitId};

/// Turn step machine. Steps advance cyclically, `Resolve` wraps to `PlayerDef`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Step {
    #[default]
    PlayerDef,
    PlayerAtk,
    SelectTarget,
    EnemyDef,
    EnemyAtk,
    Resolve,
}

impl Step {
    pub const fn next(self) -> Step {
        match self {
            Step::PlayerDef => Step::PlayerAtk,
            Step::PlayerAtk => Step::SelectTarget,
            Step::SelectTarget => Step::EnemyDef,
            Step::EnemyDef => Step::EnemyAtk,
            Step::EnemyAtk => Step::Resolve,
            Step::Resolve => Step::PlayerDef,
        }
    }

    /// The player phase open during this step, if any.
    pub const fn player_phase(self) -> Option<PhaseKind> {
        match self {
            Step::PlayerDef => Some(PhaseKind::Defense),
            Step::PlayerAtk => Some(PhaseKind::Attack),
            _ => None,
        }
    }
}

/// Locked totals of one enemy for the current round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyTotals {
    pub defense: Option<u32>,
    pub attack: Option<u32>,
}

impl EnemyTotals {
    pub fn get(&self, phase: PhaseKind) -> Option<u32> {
        match phase {
            PhaseKind::Defense => self.defense,
            PhaseKind::Attack => self.attack,
        }
    }

    pub fn set(&mut self, phase: PhaseKind, total: u32) {
        match phase {
            PhaseKind::Defense => self.defense = Some(total),
            PhaseKind::Attack => self.attack = Some(total),
        }
    }
}

/// Per-round transient state plus the step machine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleState {
    pub step: Step,
    pub turn: u32,
    pub waiting_for_target: bool,
    pub current_target: Option<UnitId>,
    pub player_def_total: Option<u32>,
    pub player_atk_total: Option<u32>,
    pub enemy_totals: BTreeMap<UnitId, EnemyTotals>,
    /// Set while the queue or resolution is running; commands are rejected.
    pub busy: bool,
    pub outcome: Option<Outcome>,
}

impl BattleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears everything except the turn counter and terminal outcome,
    /// then moves to the next turn at `PlayerDef`.
    pub fn reset_for_new_turn(&mut self) {
        self.step = Step::PlayerDef;
        self.turn += 1;
        self.waiting_for_target = false;
        self.current_target = None;
        self.player_def_total = None;
        self.player_atk_total = None;
        self.enemy_totals.clear();
        self.busy = false;
    }

    pub fn advance(&mut self) -> Step {
        self.step = self.step.next();
        self.step
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn player_total(&self, phase: PhaseKind) -> Option<u32> {
        match phase {
            PhaseKind::Defense => self.player_def_total,
            PhaseKind::Attack => self.player_atk_total,
        }
    }

    pub fn lock_player_total(&mut self, phase: PhaseKind, total: u32) {
        match phase {
            PhaseKind::Defense => self.player_def_total = Some(total),
            PhaseKind::Attack => self.player_atk_total = Some(total),
        }
    }

    pub fn lock_enemy_total(&mut self, enemy: UnitId, phase: PhaseKind, total: u32) {
        self.enemy_totals.entry(enemy).or_default().set(phase, total);
    }

    pub fn enemy_total(&self, enemy: UnitId, phase: PhaseKind) -> Option<u32> {
        self.enemy_totals.get(&enemy).and_then(|totals| totals.get(phase))
    }

    /// Drops the attack values of both sides once damage has been applied.
    pub fn clear_attack_values(&mut self) {
        self.player_atk_total = None;
        for totals in self.enemy_totals.values_mut() {
            totals.attack = None;
        }
    }
}
